/// The value validator: raw text plus a schema in, typed value or validation
/// messages out.
///
/// Validation never fails with an error. Every outcome is a
/// [`ValueValidationResult`].
///
/// # Order of checks
///
/// 1. Parse the text into the schema's value type. A parse failure returns
///    immediately with one message.
/// 2. Type-native checks: length, then value range (decimals after rounding),
///    then the regex.
/// 3. Date window checks (`maxPastDays` / `maxFutureDays`).
/// 4. The schema's custom `validationFn`, if registered in the context.
///
/// Steps 2 to 4 all run; every failed check contributes one message so that
/// several violations are reported together.
///
/// An invalid result always carries the type's null sentinel
/// ([`Value::null_for`]) as its value, whichever step failed. Only a valid
/// result carries the parsed value.
///
/// Date windows are evaluated in UTC: "today" defaults to the current UTC
/// date and a timestamp is compared on its UTC date.
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeDelta, Utc};
use regex::Regex;

use crate::messages::SystemMessage;
use crate::schema::{
    CompiledSchema, Constraints, DateWindow, DecimalConstraints, IntegerConstraints,
    TextConstraints, ValueSchema, ValueSchemas, ValueType,
};
use crate::validation::{ValidationMessage, ValueValidationResult};
use crate::value::{Value, boolean_from_json, boolean_from_text};

/// Text form of a date value.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Matches `yyyy-mm-dd` exactly; chrono alone accepts unpadded fields.
static DATE_SHAPE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok());

/// Matches an optionally signed run of decimal digits.
static INTEGER_SHAPE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+$").ok());

// ---------------------------------------------------------------------------
// Custom validation functions
// ---------------------------------------------------------------------------

/// A host-supplied check run after the built-in checks, referred to by a
/// schema's `validationFn`.
///
/// Returns the messages for every violation found; an empty vector means the
/// value is acceptable. Closures `Fn(&Value) -> Vec<ValidationMessage>`
/// implement this trait.
pub trait ValueValidationFn: Send + Sync {
    /// Checks an already parsed value.
    fn check(&self, value: &Value) -> Vec<ValidationMessage>;
}

impl<F> ValueValidationFn for F
where
    F: Fn(&Value) -> Vec<ValidationMessage> + Send + Sync,
{
    fn check(&self, value: &Value) -> Vec<ValidationMessage> {
        self(value)
    }
}

/// Everything a validation depends on besides the schema and the input:
/// the current date and the registered custom validation functions.
pub struct ValidationContext {
    today: NaiveDate,
    functions: HashMap<String, Box<dyn ValueValidationFn>>,
}

impl ValidationContext {
    /// A context whose "today" is the UTC date at the time of the call.
    pub fn new() -> Self {
        Self::with_today(Utc::now().date_naive())
    }

    /// A context with a fixed "today".
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            today,
            functions: HashMap::new(),
        }
    }

    /// The date the date windows are relative to.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Registers a custom validation function under `name`, replacing any
    /// function already registered under that name.
    pub fn register(&mut self, name: impl Into<String>, f: impl ValueValidationFn + 'static) {
        self.functions.insert(name.into(), Box::new(f));
    }

    /// Builder-style [`register`][Self::register].
    #[must_use]
    pub fn with_function(mut self, name: impl Into<String>, f: impl ValueValidationFn + 'static) -> Self {
        self.register(name, f);
        self
    }

    /// Looks up a registered function.
    pub fn function(&self, name: &str) -> Option<&dyn ValueValidationFn> {
        self.functions.get(name).map(Box::as_ref)
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ValidationContext")
            .field("today", &self.today)
            .field("functions", &names)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// Messages collected for one value. When the schema names a `messageName`
/// that id replaces the canonical one.
struct Findings<'s> {
    message_name: Option<&'s str>,
    value_type: ValueType,
    messages: Vec<ValidationMessage>,
}

impl<'s> Findings<'s> {
    fn new(schema: &'s ValueSchema) -> Self {
        Self {
            message_name: schema.message_name.as_deref(),
            value_type: schema.value_type(),
            messages: Vec::new(),
        }
    }

    fn fail(&mut self, message: SystemMessage, params: Vec<String>) {
        let id = self.message_name.unwrap_or(message.id());
        self.messages.push(ValidationMessage::error(id, params));
    }

    /// `value` when nothing failed, otherwise the null sentinel with the
    /// messages.
    fn into_result(self, value: Value) -> ValueValidationResult {
        if self.messages.is_empty() {
            ValueValidationResult::Valid { value }
        } else {
            ValueValidationResult::from_parts(Value::null_for(self.value_type), self.messages)
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validates `text` against `schema`.
///
/// `text` is expected to be non-empty: callers check "required" separately.
/// Empty text is nevertheless answered with `_valueRequired` rather than
/// being parsed.
pub fn validate_value(
    schema: &CompiledSchema,
    text: &str,
    ctx: &ValidationContext,
) -> ValueValidationResult {
    let value_type = schema.value_type();
    if text.is_empty() {
        return ValueValidationResult::invalid(
            Value::null_for(value_type),
            ValidationMessage::system(SystemMessage::ValueRequired, Vec::new()),
        );
    }

    let def = schema.schema();
    let mut findings = Findings::new(def);

    let parsed = match &def.constraints {
        Constraints::Text(c) => Some(check_text(text, c, schema.pattern(), &mut findings)),
        Constraints::Integer(c) => parse_integer(text).map(|i| check_integer(i, c, &mut findings)),
        Constraints::Decimal(c) => parse_decimal(text).map(|d| check_decimal(d, c, &mut findings)),
        Constraints::Boolean => boolean_from_text(text).map(Value::Boolean),
        Constraints::Date(w) => {
            parse_date(text).map(|d| check_window(d, w, ctx.today(), &mut findings, date_text(d)))
        }
        Constraints::Timestamp(w) => parse_timestamp(text).map(|ts| {
            let canonical = ts.to_rfc3339_opts(SecondsFormat::Millis, true);
            check_window(ts.date_naive(), w, ctx.today(), &mut findings, canonical)
        }),
    };

    let Some(value) = parsed else {
        tracing::debug!(schema = schema.name(), %value_type, "value does not parse");
        findings.fail(value_type.invalid_message(), Vec::new());
        return findings.into_result(Value::null_for(value_type));
    };

    if let Some(fn_name) = def.validation_fn.as_deref() {
        match ctx.function(fn_name) {
            Some(f) => findings.messages.extend(f.check(&value)),
            None => tracing::warn!(
                schema = schema.name(),
                validation_fn = fn_name,
                "validation function is not registered; skipping it"
            ),
        }
    }

    findings.into_result(value)
}

/// Resolves `schema_name` in `schemas` and validates `text` against it.
///
/// An unknown schema yields `_missingSchema` with the schema name as its
/// parameter, and the empty text sentinel as the value.
pub fn validate_named(
    schemas: &ValueSchemas,
    schema_name: &str,
    text: &str,
    ctx: &ValidationContext,
) -> ValueValidationResult {
    match schemas.get(schema_name) {
        Some(schema) => validate_value(schema, text, ctx),
        None => missing_schema(schema_name),
    }
}

/// Validates a JSON payload value against `schema`.
///
/// - Boolean schemas map the value through the canonical boolean sets, so
///   `null`, `0` and `""` are `false`.
/// - For other schemas `null` and `""` are `_valueRequired`; strings are
///   validated as-is, and numbers and booleans as their JSON text.
/// - Integer schemas accept a number written with a zero fraction or an
///   exponent (`5.0`, `1e2`) when it is a whole value in `i64` range.
/// - Arrays and objects fail to parse.
pub fn validate_json(
    schema: &CompiledSchema,
    value: &serde_json::Value,
    ctx: &ValidationContext,
) -> ValueValidationResult {
    let value_type = schema.value_type();
    if value_type == ValueType::Boolean {
        return match boolean_from_json(value) {
            Some(b) => validate_value(schema, if b { "true" } else { "false" }, ctx),
            None => not_parsed(schema),
        };
    }
    match value {
        serde_json::Value::Null => validate_value(schema, "", ctx),
        serde_json::Value::String(s) => validate_value(schema, s, ctx),
        serde_json::Value::Number(n) => validate_value(schema, &number_text(n, value_type), ctx),
        serde_json::Value::Bool(b) => validate_value(schema, &b.to_string(), ctx),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => not_parsed(schema),
    }
}

/// 2^63, the first whole `f64` past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn number_text(n: &serde_json::Number, value_type: ValueType) -> String {
    if value_type == ValueType::Integer && !n.is_i64() {
        let whole = n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(f));
        if let Some(f) = whole {
            #[allow(clippy::cast_possible_truncation)]
            return (f as i64).to_string();
        }
    }
    n.to_string()
}

fn not_parsed(schema: &CompiledSchema) -> ValueValidationResult {
    let mut findings = Findings::new(schema.schema());
    findings.fail(schema.value_type().invalid_message(), Vec::new());
    findings.into_result(Value::null_for(schema.value_type()))
}

fn missing_schema(schema_name: &str) -> ValueValidationResult {
    tracing::warn!(schema = schema_name, "value schema is missing");
    ValueValidationResult::invalid(
        Value::Text(String::new()),
        ValidationMessage::system(SystemMessage::MissingSchema, vec![schema_name.to_owned()]),
    )
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

fn check_text(
    text: &str,
    c: &TextConstraints,
    pattern: Option<&Regex>,
    findings: &mut Findings<'_>,
) -> Value {
    let len = text.chars().count();
    if len < to_usize(c.min_length) {
        findings.fail(SystemMessage::MinLength, vec![c.min_length.to_string()]);
    } else if len > to_usize(c.max_length) {
        findings.fail(SystemMessage::MaxLength, vec![c.max_length.to_string()]);
    }
    if let Some(re) = pattern {
        if !re.is_match(text) {
            findings.fail(SystemMessage::InvalidText, Vec::new());
        }
    }
    Value::Text(text.to_owned())
}

fn to_usize(n: u32) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let shape_ok = INTEGER_SHAPE_RE
        .as_ref()
        .is_none_or(|re| re.is_match(trimmed));
    if !shape_ok {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

fn check_integer(i: i64, c: &IntegerConstraints, findings: &mut Findings<'_>) -> Value {
    if i < c.min_value {
        findings.fail(SystemMessage::MinValue, vec![c.min_value.to_string()]);
    } else if i > c.max_value {
        findings.fail(SystemMessage::MaxValue, vec![c.max_value.to_string()]);
    }
    Value::Integer(i)
}

fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    // Rust accepts "inf" and "NaN"; neither is a number here.
    if !trimmed
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|d| d.is_finite())
}

/// Rounds half away from zero to `places` decimal places.
pub fn round_to_places(d: f64, places: u32) -> f64 {
    let Ok(exp) = i32::try_from(places.min(15)) else {
        return d;
    };
    let factor = 10f64.powi(exp);
    let scaled = d * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        d
    }
}

fn check_decimal(d: f64, c: &DecimalConstraints, findings: &mut Findings<'_>) -> Value {
    let rounded = round_to_places(d, c.nbr_decimal_places);
    if rounded < c.min_value {
        findings.fail(SystemMessage::MinValue, vec![c.min_value.to_string()]);
    } else if rounded > c.max_value {
        findings.fail(SystemMessage::MaxValue, vec![c.max_value.to_string()]);
    }
    Value::Decimal(rounded)
}

// ---------------------------------------------------------------------------
// Dates and timestamps
// ---------------------------------------------------------------------------

fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let shape_ok = DATE_SHAPE_RE
        .as_ref()
        .is_none_or(|re| re.is_match(trimmed));
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn date_text(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// The inclusive `(earliest, latest)` bounds of `window` relative to `today`.
/// A bound that falls outside chrono's calendar is `None` (unbounded).
pub fn window_bounds(window: &DateWindow, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let shift = |days: i64| {
        TimeDelta::try_days(days).and_then(|delta| today.checked_add_signed(delta))
    };
    let earliest = window.max_past_days.checked_neg().and_then(shift);
    let latest = shift(window.max_future_days);
    (earliest, latest)
}

fn check_window(
    date: NaiveDate,
    window: &DateWindow,
    today: NaiveDate,
    findings: &mut Findings<'_>,
    value_text: String,
) -> Value {
    let (earliest, latest) = window_bounds(window, today);
    if let Some(earliest) = earliest.filter(|e| date < *e) {
        findings.fail(SystemMessage::EarliestDate, vec![date_text(earliest)]);
    }
    if let Some(latest) = latest.filter(|l| date > *l) {
        findings.fail(SystemMessage::LatestDate, vec![date_text(latest)]);
    }
    Value::Text(value_text)
}
