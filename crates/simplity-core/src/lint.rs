/// Design-time lint for value schema catalogs.
///
/// The validator trusts its schemas: constraint keys that do not belong to a
/// schema's `valueType` are silently ignored and an inverted range simply
/// rejects every value. This module inspects the raw catalog JSON and reports
/// such mistakes as [`Diagnostic`]s. Like the validator it never fails fast;
/// every finding for every schema is collected.
///
/// The catalog is a JSON object mapping schema names to schema objects, the
/// same shape [`ValueSchemas::from_json_str`][crate::schema::ValueSchemas::from_json_str]
/// loads.
use std::fmt;

use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use crate::messages::MessageCatalog;
use crate::schema::{
    COMMON_KEYS, DEFAULT_MAX_FUTURE_DAYS, DEFAULT_MAX_LENGTH, DEFAULT_MAX_PAST_DAYS,
    DEFAULT_MIN_LENGTH, MAX_SAFE_INTEGER, ValueSchema, ValueType,
};

#[cfg(test)]
mod tests;

/// How serious a lint finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The schema is broken; loading or using it misbehaves.
    Error,
    /// The schema works but is suspect.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("Error"),
            Self::Warning => f.write_str("Warning"),
        }
    }
}

/// Identifier of a lint rule. [`LintRuleId::code`] is the form used in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LintRuleId {
    /// SCH-01: `name` is present, a string, and equal to the catalog key.
    Sch01,
    /// SCH-02: `valueType` is present and one of the known value types.
    Sch02,
    /// SCH-03: every key is a common key or a constraint of the `valueType`.
    Sch03,
    /// SCH-04: lower bounds do not exceed upper bounds.
    Sch04,
    /// SCH-05: `regex` is a string that compiles.
    Sch05,
    /// SCH-06: `messageName` resolves in the message catalog.
    Sch06,
    /// SCH-07: the date window admits at least one day.
    Sch07,
    /// SCH-08: the catalog and each schema have the expected JSON shape.
    Sch08,
}

impl LintRuleId {
    /// Returns the hyphenated rule code, e.g. `"SCH-03"`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Sch01 => "SCH-01",
            Self::Sch02 => "SCH-02",
            Self::Sch03 => "SCH-03",
            Self::Sch04 => "SCH-04",
            Self::Sch05 => "SCH-05",
            Self::Sch06 => "SCH-06",
            Self::Sch07 => "SCH-07",
            Self::Sch08 => "SCH-08",
        }
    }
}

impl fmt::Display for LintRuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Where in the catalog a finding was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// The catalog as a whole.
    Catalog,
    /// A schema, identified by its catalog key.
    Schema {
        /// Catalog key of the schema.
        key: String,
        /// The offending attribute, if the finding concerns one.
        field: Option<String>,
    },
}

impl Location {
    fn field(key: &str, field: &str) -> Self {
        Self::Schema {
            key: key.to_owned(),
            field: Some(field.to_owned()),
        }
    }

    fn schema(key: &str) -> Self {
        Self::Schema {
            key: key.to_owned(),
            field: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => f.write_str("(catalog)"),
            Self::Schema { key, field: None } => write!(f, "schema \"{key}\""),
            Self::Schema {
                key,
                field: Some(field),
            } => write!(f, "schema \"{key}\" field \"{field}\""),
        }
    }
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The rule that produced this finding.
    pub rule_id: LintRuleId,
    /// The severity of this finding.
    pub severity: Severity,
    /// Where the problem was detected.
    pub location: Location,
    /// A human-readable explanation.
    pub message: String,
}

impl Diagnostic {
    /// Constructs a new [`Diagnostic`].
    pub fn new(
        rule_id: LintRuleId,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            severity,
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_char = match self.severity {
            Severity::Error => 'E',
            Severity::Warning => 'W',
        };
        write!(
            f,
            "[{level_char}] {} {}: {}",
            self.rule_id, self.location, self.message
        )
    }
}

/// Every finding of a lint pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LintResult {
    /// All diagnostics, in catalog key order.
    pub diagnostics: Vec<Diagnostic>,
}

impl LintResult {
    /// Returns `true` if any diagnostic has [`Severity::Error`].
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns an iterator over the errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Returns an iterator over the warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Returns an iterator over the diagnostics produced by `rule`.
    pub fn by_rule(&self, rule: LintRuleId) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.rule_id == rule)
    }

    /// Returns the total number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if there are no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// One schema of the catalog as the rules see it.
pub struct SchemaEntry<'a> {
    /// Catalog key.
    pub key: &'a str,
    /// The schema object, unparsed.
    pub raw: &'a Map<String, JsonValue>,
    /// The `valueType`, if present and known.
    pub value_type: Option<ValueType>,
}

impl SchemaEntry<'_> {
    fn f64_or(&self, field: &str, default: f64) -> f64 {
        self.raw
            .get(field)
            .and_then(JsonValue::as_f64)
            .unwrap_or(default)
    }

    fn i64_or(&self, field: &str, default: i64) -> i64 {
        self.raw
            .get(field)
            .and_then(JsonValue::as_i64)
            .unwrap_or(default)
    }
}

/// A stateless check applied to every schema of a catalog.
///
/// Rules push zero or more diagnostics into `diags`. The registry stores
/// rules as `Vec<Box<dyn LintRule>>`.
pub trait LintRule {
    /// The rule's identifier.
    fn id(&self) -> LintRuleId;

    /// The severity of the diagnostics this rule produces.
    fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Inspects one schema.
    fn check(&self, entry: &SchemaEntry<'_>, messages: &MessageCatalog, diags: &mut Vec<Diagnostic>);
}

/// Selects the optional rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    /// Run SCH-06 against the message catalog. Default `true`.
    pub check_message_names: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            check_message_names: true,
        }
    }
}

/// Builds the ordered rule registry for `config`.
pub fn build_registry(config: &LintConfig) -> Vec<Box<dyn LintRule>> {
    let mut registry: Vec<Box<dyn LintRule>> = vec![
        Box::new(NameMatchesKey),
        Box::new(KnownValueType),
        Box::new(NoStrayKeys),
        Box::new(BoundsOrdered),
        Box::new(RegexCompiles),
    ];
    if config.check_message_names {
        registry.push(Box::new(MessageNameResolves));
    }
    registry.push(Box::new(DateWindowNotEmpty));
    registry.push(Box::new(SchemaShape));
    registry
}

/// SCH-01.
pub struct NameMatchesKey;

impl LintRule for NameMatchesKey {
    fn id(&self) -> LintRuleId {
        LintRuleId::Sch01
    }

    fn check(&self, entry: &SchemaEntry<'_>, _: &MessageCatalog, diags: &mut Vec<Diagnostic>) {
        let message = match entry.raw.get("name") {
            None => "schema has no name".to_owned(),
            Some(JsonValue::String(name)) if name == entry.key => return,
            Some(JsonValue::String(name)) => {
                format!("name \"{name}\" differs from its catalog key")
            }
            Some(other) => format!("name must be a string, found {other}"),
        };
        diags.push(Diagnostic::new(
            self.id(),
            self.severity(),
            Location::field(entry.key, "name"),
            message,
        ));
    }
}

/// SCH-02.
pub struct KnownValueType;

impl LintRule for KnownValueType {
    fn id(&self) -> LintRuleId {
        LintRuleId::Sch02
    }

    fn check(&self, entry: &SchemaEntry<'_>, _: &MessageCatalog, diags: &mut Vec<Diagnostic>) {
        if entry.value_type.is_some() {
            return;
        }
        let message = match entry.raw.get("valueType") {
            None => "valueType is missing".to_owned(),
            Some(vt) => format!(
                "unknown valueType {vt}; expected one of {}",
                ValueType::ALL.map(ValueType::as_str).join(", ")
            ),
        };
        diags.push(Diagnostic::new(
            self.id(),
            self.severity(),
            Location::field(entry.key, "valueType"),
            message,
        ));
    }
}

/// SCH-03.
pub struct NoStrayKeys;

impl LintRule for NoStrayKeys {
    fn id(&self) -> LintRuleId {
        LintRuleId::Sch03
    }

    fn check(&self, entry: &SchemaEntry<'_>, _: &MessageCatalog, diags: &mut Vec<Diagnostic>) {
        let Some(vt) = entry.value_type else {
            return;
        };
        let legal = vt.constraint_keys();
        for field in entry.raw.keys() {
            let field = field.as_str();
            if COMMON_KEYS.contains(&field) || legal.contains(&field) {
                continue;
            }
            diags.push(Diagnostic::new(
                self.id(),
                self.severity(),
                Location::field(entry.key, field),
                format!("\"{field}\" does not apply to valueType {vt} and is ignored"),
            ));
        }
    }
}

/// SCH-04.
pub struct BoundsOrdered;

impl BoundsOrdered {
    fn compare(
        &self,
        entry: &SchemaEntry<'_>,
        (min_key, min): (&str, f64),
        (max_key, max): (&str, f64),
        diags: &mut Vec<Diagnostic>,
    ) {
        if min > max {
            diags.push(Diagnostic::new(
                self.id(),
                self.severity(),
                Location::field(entry.key, min_key),
                format!("{min_key} {min} exceeds {max_key} {max}; no value can pass"),
            ));
        }
    }
}

impl LintRule for BoundsOrdered {
    fn id(&self) -> LintRuleId {
        LintRuleId::Sch04
    }

    #[allow(clippy::cast_precision_loss)]
    fn check(&self, entry: &SchemaEntry<'_>, _: &MessageCatalog, diags: &mut Vec<Diagnostic>) {
        let max_safe = MAX_SAFE_INTEGER as f64;
        match entry.value_type {
            Some(ValueType::Text) => self.compare(
                entry,
                (
                    "minLength",
                    entry.f64_or("minLength", f64::from(DEFAULT_MIN_LENGTH)),
                ),
                (
                    "maxLength",
                    entry.f64_or("maxLength", f64::from(DEFAULT_MAX_LENGTH)),
                ),
                diags,
            ),
            Some(ValueType::Integer | ValueType::Decimal) => self.compare(
                entry,
                ("minValue", entry.f64_or("minValue", 0.0)),
                ("maxValue", entry.f64_or("maxValue", max_safe)),
                diags,
            ),
            Some(ValueType::Boolean | ValueType::Date | ValueType::Timestamp) | None => {}
        }
    }
}

/// SCH-05.
pub struct RegexCompiles;

impl LintRule for RegexCompiles {
    fn id(&self) -> LintRuleId {
        LintRuleId::Sch05
    }

    fn check(&self, entry: &SchemaEntry<'_>, _: &MessageCatalog, diags: &mut Vec<Diagnostic>) {
        let message = match entry.raw.get("regex") {
            None | Some(JsonValue::Null) => return,
            Some(JsonValue::String(src)) => match Regex::new(src) {
                Ok(_) => return,
                Err(e) => format!("regex does not compile: {e}"),
            },
            Some(other) => format!("regex must be a string, found {other}"),
        };
        diags.push(Diagnostic::new(
            self.id(),
            self.severity(),
            Location::field(entry.key, "regex"),
            message,
        ));
    }
}

/// SCH-06.
pub struct MessageNameResolves;

impl LintRule for MessageNameResolves {
    fn id(&self) -> LintRuleId {
        LintRuleId::Sch06
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, entry: &SchemaEntry<'_>, messages: &MessageCatalog, diags: &mut Vec<Diagnostic>) {
        let Some(JsonValue::String(id)) = entry.raw.get("messageName") else {
            return;
        };
        if !messages.contains(id) {
            diags.push(Diagnostic::new(
                self.id(),
                self.severity(),
                Location::field(entry.key, "messageName"),
                format!("message \"{id}\" is not in the message catalog; it will render as its id"),
            ));
        }
    }
}

/// SCH-07.
pub struct DateWindowNotEmpty;

impl LintRule for DateWindowNotEmpty {
    fn id(&self) -> LintRuleId {
        LintRuleId::Sch07
    }

    fn check(&self, entry: &SchemaEntry<'_>, _: &MessageCatalog, diags: &mut Vec<Diagnostic>) {
        if !matches!(
            entry.value_type,
            Some(ValueType::Date | ValueType::Timestamp)
        ) {
            return;
        }
        let past = entry.i64_or("maxPastDays", DEFAULT_MAX_PAST_DAYS);
        let future = entry.i64_or("maxFutureDays", DEFAULT_MAX_FUTURE_DAYS);
        // earliest = today - past, latest = today + future
        if i128::from(past) + i128::from(future) < 0 {
            diags.push(Diagnostic::new(
                self.id(),
                self.severity(),
                Location::schema(entry.key),
                format!(
                    "maxPastDays {past} and maxFutureDays {future} leave no acceptable date"
                ),
            ));
        }
    }
}

/// SCH-08. Only runs once the `valueType` is known, so a missing or unknown
/// tag is reported by SCH-02 alone.
pub struct SchemaShape;

impl LintRule for SchemaShape {
    fn id(&self) -> LintRuleId {
        LintRuleId::Sch08
    }

    fn check(&self, entry: &SchemaEntry<'_>, _: &MessageCatalog, diags: &mut Vec<Diagnostic>) {
        if entry.value_type.is_none() {
            return;
        }
        let raw = JsonValue::Object(entry.raw.clone());
        if let Err(e) = serde_json::from_value::<ValueSchema>(raw) {
            diags.push(Diagnostic::new(
                self.id(),
                self.severity(),
                Location::schema(entry.key),
                format!("schema does not load: {e}"),
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Lints a catalog given as parsed JSON.
pub fn lint_catalog(catalog: &JsonValue, messages: &MessageCatalog, config: &LintConfig) -> LintResult {
    let mut diags = Vec::new();
    let Some(schemas) = catalog.as_object() else {
        diags.push(Diagnostic::new(
            LintRuleId::Sch08,
            Severity::Error,
            Location::Catalog,
            "a schema catalog must be a JSON object mapping names to schemas",
        ));
        return LintResult { diagnostics: diags };
    };

    let registry = build_registry(config);
    let mut keys: Vec<&String> = schemas.keys().collect();
    keys.sort_unstable();
    for key in keys {
        let Some(raw) = schemas.get(key).and_then(JsonValue::as_object) else {
            diags.push(Diagnostic::new(
                LintRuleId::Sch08,
                Severity::Error,
                Location::schema(key),
                "schema must be a JSON object",
            ));
            continue;
        };
        let entry = SchemaEntry {
            key,
            raw,
            value_type: raw
                .get("valueType")
                .and_then(JsonValue::as_str)
                .and_then(ValueType::from_name),
        };
        for rule in &registry {
            rule.check(&entry, messages, &mut diags);
        }
    }
    tracing::debug!(
        schemas = schemas.len(),
        diagnostics = diags.len(),
        "linted schema catalog"
    );
    LintResult { diagnostics: diags }
}

/// Parses `json` and lints it.
///
/// # Errors
///
/// Returns the parse error if `json` is not valid JSON.
pub fn lint_catalog_str(
    json: &str,
    messages: &MessageCatalog,
    config: &LintConfig,
) -> Result<LintResult, serde_json::Error> {
    let catalog: JsonValue = serde_json::from_str(json)?;
    Ok(lint_catalog(&catalog, messages, config))
}
