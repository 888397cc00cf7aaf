/// Value schemas: reusable validation rule sets for primitive values.
///
/// A [`ValueSchema`] carries the attributes common to every schema plus one
/// [`Constraints`] variant selected by the `valueType` tag. Constraint keys
/// that do not belong to the active tag are ignored on deserialization; the
/// schema lint in [`crate::lint`] reports them.
///
/// [`ValueSchemas`] is the named catalog the validator resolves schema names
/// against. It compiles each schema's regex once on insertion.
use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::messages::SystemMessage;

/// Largest integer a double-precision number represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Default `minLength` for text.
pub const DEFAULT_MIN_LENGTH: u32 = 1;
/// Default `maxLength` for text.
pub const DEFAULT_MAX_LENGTH: u32 = 1000;
/// Default `nbrDecimalPlaces` for decimals.
pub const DEFAULT_NBR_DECIMAL_PLACES: u32 = 2;
/// Default `maxPastDays` for dates and timestamps: today, but nothing earlier.
pub const DEFAULT_MAX_PAST_DAYS: i64 = 0;
/// Default `maxFutureDays` for dates and timestamps: roughly a thousand years.
pub const DEFAULT_MAX_FUTURE_DAYS: i64 = 365_000;

/// Attribute names legal on every schema regardless of its `valueType`.
pub const COMMON_KEYS: &[&str] = &[
    "name",
    "description",
    "valueType",
    "messageName",
    "validationFn",
];

// ---------------------------------------------------------------------------
// ValueType
// ---------------------------------------------------------------------------

/// Primitive value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Free text, optionally constrained by length and a regex.
    Text,
    /// Whole number.
    Integer,
    /// Number rounded to a fixed count of decimal places.
    Decimal,
    /// `true` / `false`.
    Boolean,
    /// Calendar date, `yyyy-mm-dd`.
    Date,
    /// Instant in time, RFC 3339.
    Timestamp,
}

impl ValueType {
    /// Every value type, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Text,
        Self::Integer,
        Self::Decimal,
        Self::Boolean,
        Self::Date,
        Self::Timestamp,
    ];

    /// Returns the wire name of the value type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
        }
    }

    /// Parses a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|vt| vt.as_str() == name)
    }

    /// Constraint keys that are legal for this value type, on top of
    /// [`COMMON_KEYS`].
    pub fn constraint_keys(self) -> &'static [&'static str] {
        match self {
            Self::Text => &["minLength", "maxLength", "regex"],
            Self::Integer => &["minValue", "maxValue"],
            Self::Decimal => &["minValue", "maxValue", "nbrDecimalPlaces"],
            Self::Boolean => &[],
            Self::Date | Self::Timestamp => &["maxPastDays", "maxFutureDays"],
        }
    }

    /// The message reported when text cannot be parsed into this type.
    pub fn invalid_message(self) -> SystemMessage {
        match self {
            Self::Text => SystemMessage::InvalidText,
            Self::Integer | Self::Decimal => SystemMessage::InvalidNumber,
            Self::Boolean => SystemMessage::InvalidBoolean,
            Self::Date => SystemMessage::InvalidDate,
            Self::Timestamp => SystemMessage::InvalidTimestamp,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// Length and pattern constraints of a text schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextConstraints {
    /// Minimum number of characters (Unicode scalar values).
    pub min_length: u32,
    /// Maximum number of characters (Unicode scalar values).
    pub max_length: u32,
    /// Pattern the text must contain a match for. Rust `regex` syntax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl Default for TextConstraints {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            regex: None,
        }
    }
}

/// Range constraints of an integer schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntegerConstraints {
    /// Smallest acceptable value.
    pub min_value: i64,
    /// Largest acceptable value.
    pub max_value: i64,
}

impl Default for IntegerConstraints {
    fn default() -> Self {
        Self {
            min_value: 0,
            max_value: MAX_SAFE_INTEGER,
        }
    }
}

/// Range and precision constraints of a decimal schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecimalConstraints {
    /// Smallest acceptable value, compared after rounding.
    pub min_value: f64,
    /// Largest acceptable value, compared after rounding.
    pub max_value: f64,
    /// Values are rounded half away from zero to this many places.
    pub nbr_decimal_places: u32,
}

impl Default for DecimalConstraints {
    #[allow(clippy::cast_precision_loss)]
    fn default() -> Self {
        Self {
            min_value: 0.0,
            max_value: MAX_SAFE_INTEGER as f64,
            nbr_decimal_places: DEFAULT_NBR_DECIMAL_PLACES,
        }
    }
}

/// Acceptable window of a date or timestamp, relative to today.
///
/// The earliest acceptable date is `today - max_past_days` and the latest is
/// `today + max_future_days`. Negative values invert the direction: a
/// `max_past_days` of `-10` requires the date to be at least ten days ahead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DateWindow {
    /// How far into the past a date may lie.
    pub max_past_days: i64,
    /// How far into the future a date may lie.
    pub max_future_days: i64,
}

impl Default for DateWindow {
    fn default() -> Self {
        Self {
            max_past_days: DEFAULT_MAX_PAST_DAYS,
            max_future_days: DEFAULT_MAX_FUTURE_DAYS,
        }
    }
}

/// Type-specific constraints, tagged by `valueType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "valueType", rename_all = "lowercase")]
pub enum Constraints {
    /// `valueType: "text"`.
    Text(TextConstraints),
    /// `valueType: "integer"`.
    Integer(IntegerConstraints),
    /// `valueType: "decimal"`.
    Decimal(DecimalConstraints),
    /// `valueType: "boolean"`. No metadata; the canonical sets are fixed.
    Boolean,
    /// `valueType: "date"`.
    Date(DateWindow),
    /// `valueType: "timestamp"`. The window applies to the UTC date part.
    Timestamp(DateWindow),
}

impl Constraints {
    /// Returns the tag of the active variant.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Text(_) => ValueType::Text,
            Self::Integer(_) => ValueType::Integer,
            Self::Decimal(_) => ValueType::Decimal,
            Self::Boolean => ValueType::Boolean,
            Self::Date(_) => ValueType::Date,
            Self::Timestamp(_) => ValueType::Timestamp,
        }
    }

    /// Returns the default constraints for `value_type`.
    pub fn defaults_for(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Text => Self::Text(TextConstraints::default()),
            ValueType::Integer => Self::Integer(IntegerConstraints::default()),
            ValueType::Decimal => Self::Decimal(DecimalConstraints::default()),
            ValueType::Boolean => Self::Boolean,
            ValueType::Date => Self::Date(DateWindow::default()),
            ValueType::Timestamp => Self::Timestamp(DateWindow::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// ValueSchema
// ---------------------------------------------------------------------------

/// A named, reusable validation rule set for one primitive value type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSchema {
    /// Unique name of the schema within its catalog.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Id of the externalized message to report instead of the canonical
    /// message ids when validation fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_name: Option<String>,
    /// Name of a host-supplied validation function run after the built-in
    /// checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_fn: Option<String>,
    /// Type-specific constraints.
    #[serde(flatten)]
    pub constraints: Constraints,
}

impl ValueSchema {
    /// Creates a schema of the given type with default constraints.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::with_constraints(name, Constraints::defaults_for(value_type))
    }

    /// Creates a schema with explicit constraints.
    pub fn with_constraints(name: impl Into<String>, constraints: Constraints) -> Self {
        Self {
            name: name.into(),
            description: None,
            message_name: None,
            validation_fn: None,
            constraints,
        }
    }

    /// Sets `messageName`.
    #[must_use]
    pub fn message_name(mut self, message_name: impl Into<String>) -> Self {
        self.message_name = Some(message_name.into());
        self
    }

    /// Sets `validationFn`.
    #[must_use]
    pub fn validation_fn(mut self, validation_fn: impl Into<String>) -> Self {
        self.validation_fn = Some(validation_fn.into());
        self
    }

    /// Sets `description`.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The `valueType` tag of this schema.
    pub fn value_type(&self) -> ValueType {
        self.constraints.value_type()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building a schema catalog.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The catalog JSON could not be deserialized.
    #[error("invalid schema catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// A schema's `regex` does not compile.
    #[error("schema {schema:?}: invalid regex: {source}")]
    InvalidRegex {
        /// Name of the offending schema.
        schema: String,
        /// The compilation error.
        #[source]
        source: regex::Error,
    },

    /// A schema's `name` differs from the key it is filed under.
    #[error("schema filed under {key:?} is named {name:?}")]
    NameMismatch {
        /// Catalog key.
        key: String,
        /// The schema's own `name`.
        name: String,
    },
}

// ---------------------------------------------------------------------------
// CompiledSchema
// ---------------------------------------------------------------------------

/// A [`ValueSchema`] together with its compiled regex.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    schema: ValueSchema,
    pattern: Option<Regex>,
}

impl CompiledSchema {
    /// Compiles the schema's regex, if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidRegex`] when the pattern does not compile.
    pub fn compile(schema: ValueSchema) -> Result<Self, SchemaError> {
        let pattern = match &schema.constraints {
            Constraints::Text(TextConstraints {
                regex: Some(src), ..
            }) => Some(Regex::new(src).map_err(|source| SchemaError::InvalidRegex {
                schema: schema.name.clone(),
                source,
            })?),
            Constraints::Text(_)
            | Constraints::Integer(_)
            | Constraints::Decimal(_)
            | Constraints::Boolean
            | Constraints::Date(_)
            | Constraints::Timestamp(_) => None,
        };
        Ok(Self { schema, pattern })
    }

    /// The underlying schema.
    pub fn schema(&self) -> &ValueSchema {
        &self.schema
    }

    /// The compiled text pattern, if any.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Shorthand for `self.schema().name`.
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Shorthand for `self.schema().value_type()`.
    pub fn value_type(&self) -> ValueType {
        self.schema.value_type()
    }
}

// ---------------------------------------------------------------------------
// ValueSchemas
// ---------------------------------------------------------------------------

/// Built-in schemas every app can refer to.
pub fn system_value_schemas() -> Vec<ValueSchema> {
    vec![
        ValueSchema::with_constraints(
            "_name",
            Constraints::Text(TextConstraints {
                max_length: 50,
                ..TextConstraints::default()
            }),
        )
        .message_name(SystemMessage::InvalidName.id()),
    ]
}

/// Catalog of compiled value schemas, keyed by name.
///
/// App schemas replace system schemas of the same name.
#[derive(Debug, Clone, Default)]
pub struct ValueSchemas {
    schemas: HashMap<String, CompiledSchema>,
}

impl ValueSchemas {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the [`system_value_schemas`].
    pub fn with_system() -> Self {
        let mut catalog = Self::new();
        for schema in system_value_schemas() {
            // System schemas carry no regex, so compilation cannot fail.
            if let Ok(compiled) = CompiledSchema::compile(schema) {
                catalog
                    .schemas
                    .insert(compiled.name().to_owned(), compiled);
            }
        }
        catalog
    }

    /// Builds a catalog from a JSON object mapping names to schemas, on top of
    /// the system schemas.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the JSON is malformed, a key does not match
    /// its schema's name, or a regex does not compile.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let raw: HashMap<String, ValueSchema> = serde_json::from_str(json)?;
        let mut catalog = Self::with_system();
        let mut entries: Vec<(String, ValueSchema)> = raw.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, schema) in entries {
            if key != schema.name {
                return Err(SchemaError::NameMismatch {
                    key,
                    name: schema.name,
                });
            }
            catalog.insert(schema)?;
        }
        tracing::debug!(schemas = catalog.len(), "loaded value schema catalog");
        Ok(catalog)
    }

    /// Compiles and adds a schema, returning the one it replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidRegex`] if the schema's regex does not
    /// compile; the catalog is left unchanged.
    pub fn insert(&mut self, schema: ValueSchema) -> Result<Option<CompiledSchema>, SchemaError> {
        let compiled = CompiledSchema::compile(schema)?;
        Ok(self.schemas.insert(compiled.name().to_owned(), compiled))
    }

    /// Looks up a schema by name.
    pub fn get(&self, name: &str) -> Option<&CompiledSchema> {
        self.schemas.get(name)
    }

    /// Returns the schema names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of schemas in the catalog.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if the catalog holds no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests;
