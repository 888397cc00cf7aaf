/// The value-validation result contract.
///
/// A validator returns a [`ValueValidationResult`]: either a valid value, or
/// a value (possibly the null sentinel) together with at least one
/// [`ValidationMessage`]. An empty message list cannot be constructed, so
/// "invalid but no reason given" is unrepresentable.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::messages::{MessageCatalog, SystemMessage};
use crate::response::DetailedMessage;
use crate::value::Value;

/// Severity of a message shown to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    /// The operation succeeded.
    Success,
    /// Informational.
    Info,
    /// Suspicious, but not blocking.
    Warning,
    /// Blocking failure.
    Error,
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Info => f.write_str("info"),
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// An externalized validation finding: message id, severity and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessage {
    /// Id of the message template.
    pub message_id: String,
    /// Severity.
    pub alert_type: AlertType,
    /// Run-time parameters for the template's placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<String>>,
}

impl ValidationMessage {
    /// Creates an error message with the given id and parameters.
    pub fn error(message_id: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            message_id: message_id.into(),
            alert_type: AlertType::Error,
            params: if params.is_empty() { None } else { Some(params) },
        }
    }

    /// Creates an error message for a system message id.
    pub fn system(message: SystemMessage, params: Vec<String>) -> Self {
        Self::error(message.id(), params)
    }

    /// The parameters, or an empty slice.
    pub fn params(&self) -> &[String] {
        self.params.as_deref().unwrap_or_default()
    }

    /// Renders this message into a [`DetailedMessage`] attributed to
    /// `field_name`.
    pub fn to_detailed(&self, catalog: &MessageCatalog, field_name: Option<&str>) -> DetailedMessage {
        let text = catalog.render(&self.message_id, self.params());
        let mut msg = DetailedMessage::new(self.alert_type, self.message_id.clone(), text);
        if let Some(field) = field_name {
            msg = msg.with_field_name(field);
        }
        if let Some(params) = &self.params {
            msg = msg.with_params(params.clone());
        }
        msg
    }
}

// ---------------------------------------------------------------------------
// ValidationMessages
// ---------------------------------------------------------------------------

/// A list of validation messages that is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationMessages(Vec<ValidationMessage>);

impl ValidationMessages {
    /// Creates a list holding `first`.
    pub fn new(first: ValidationMessage) -> Self {
        Self(vec![first])
    }

    /// Wraps `messages`, or returns `None` if it is empty.
    pub fn from_vec(messages: Vec<ValidationMessage>) -> Option<Self> {
        if messages.is_empty() {
            None
        } else {
            Some(Self(messages))
        }
    }

    /// Appends a message.
    pub fn push(&mut self, message: ValidationMessage) {
        self.0.push(message);
    }

    /// The first message. Always `Some` for a list built through
    /// [`new`][Self::new] or [`from_vec`][Self::from_vec].
    pub fn first(&self) -> Option<&ValidationMessage> {
        self.0.first()
    }

    /// Number of messages; at least one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The messages as a slice.
    pub fn as_slice(&self) -> &[ValidationMessage] {
        &self.0
    }

    /// Iterates over the messages.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationMessage> {
        self.0.iter()
    }

    /// Unwraps into the inner vector.
    pub fn into_vec(self) -> Vec<ValidationMessage> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ValidationMessages {
    type Item = &'a ValidationMessage;
    type IntoIter = std::slice::Iter<'a, ValidationMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for ValidationMessages {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let messages = Vec::<ValidationMessage>::deserialize(d)?;
        Self::from_vec(messages)
            .ok_or_else(|| de::Error::custom("messages must be absent or non-empty"))
    }
}

// ---------------------------------------------------------------------------
// ValueValidationResult
// ---------------------------------------------------------------------------

/// Outcome of validating one value against its schema.
///
/// Serialized as `{"value": ..., "messages": [...]}` with `messages` absent
/// when the value is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ResultWire", from = "ResultWire")]
pub enum ValueValidationResult {
    /// The value passed every check.
    Valid {
        /// The parsed value.
        value: Value,
    },
    /// The value failed to parse or failed at least one check.
    Invalid {
        /// The null sentinel of the schema's type.
        value: Value,
        /// Why the value is invalid.
        messages: ValidationMessages,
    },
}

impl ValueValidationResult {
    /// Builds a result from a value and the messages collected for it.
    pub fn from_parts(value: Value, messages: Vec<ValidationMessage>) -> Self {
        match ValidationMessages::from_vec(messages) {
            Some(messages) => Self::Invalid { value, messages },
            None => Self::Valid { value },
        }
    }

    /// Builds an invalid result with a single message.
    pub fn invalid(value: Value, message: ValidationMessage) -> Self {
        Self::Invalid {
            value,
            messages: ValidationMessages::new(message),
        }
    }

    /// Returns `true` for [`ValueValidationResult::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// The value, valid or not.
    pub fn value(&self) -> &Value {
        match self {
            Self::Valid { value } | Self::Invalid { value, .. } => value,
        }
    }

    /// The messages; empty for a valid result.
    pub fn messages(&self) -> &[ValidationMessage] {
        match self {
            Self::Valid { .. } => &[],
            Self::Invalid { messages, .. } => messages.as_slice(),
        }
    }

    /// Converts into `Ok(value)` when valid, `Err(messages)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns the messages of an invalid result.
    pub fn into_result(self) -> Result<Value, ValidationMessages> {
        match self {
            Self::Valid { value } => Ok(value),
            Self::Invalid { messages, .. } => Err(messages),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ResultWire {
    value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    messages: Option<ValidationMessages>,
}

impl From<ValueValidationResult> for ResultWire {
    fn from(r: ValueValidationResult) -> Self {
        match r {
            ValueValidationResult::Valid { value } => Self {
                value,
                messages: None,
            },
            ValueValidationResult::Invalid { value, messages } => Self {
                value,
                messages: Some(messages),
            },
        }
    }
}

impl From<ResultWire> for ValueValidationResult {
    fn from(w: ResultWire) -> Self {
        match w.messages {
            None => Self::Valid { value: w.value },
            Some(messages) => Self::Invalid {
                value: w.value,
                messages,
            },
        }
    }
}
