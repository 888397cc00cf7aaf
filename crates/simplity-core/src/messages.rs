/// System message catalog and message formatting.
///
/// Message texts are externalized: validators and services refer to a
/// message by id, and the text is looked up and formatted when the message is
/// rendered. Templates use `${n}` for the n-th (1-based) run-time parameter.
///
/// The system texts below are reproduced verbatim; existing callers
/// substitute parameters into them positionally.
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Message ids reserved by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemMessage {
    /// `_internalError`
    InternalError,
    /// `_notAuthorized`
    NotAuthorized,
    /// `_concurrentUpdate`
    ConcurrentUpdate,
    /// `_invalidText`
    InvalidText,
    /// `_minLength`: parameter is the minimum length.
    MinLength,
    /// `_maxLength`: parameter is the maximum length.
    MaxLength,
    /// `_minValue`: parameter is the minimum value.
    MinValue,
    /// `_maxValue`: parameter is the maximum value.
    MaxValue,
    /// `_invalidTimestamp`
    InvalidTimestamp,
    /// `_invalidDate`
    InvalidDate,
    /// `_invalidNumber`
    InvalidNumber,
    /// `_earliestDate`: parameter is the earliest acceptable date.
    EarliestDate,
    /// `_latestDate`: parameter is the latest acceptable date.
    LatestDate,
    /// `_invalidBoolean`
    InvalidBoolean,
    /// `_invalidData`
    InvalidData,
    /// `_valueRequired`
    ValueRequired,
    /// `_listNameRequired`
    ListNameRequired,
    /// `_listNotConfigured`
    ListNotConfigured,
    /// `_dbOperationNoSuccess`
    DbOperationNoSuccess,
    /// `_invalidValue`
    InvalidValue,
    /// `_invalidName`
    InvalidName,
    /// `_missingSchema`: parameter is the name of the missing schema.
    MissingSchema,
}

impl SystemMessage {
    /// Every system message, in catalog order.
    pub const ALL: [Self; 22] = [
        Self::InternalError,
        Self::NotAuthorized,
        Self::ConcurrentUpdate,
        Self::InvalidText,
        Self::MinLength,
        Self::MaxLength,
        Self::MinValue,
        Self::MaxValue,
        Self::InvalidTimestamp,
        Self::InvalidDate,
        Self::InvalidNumber,
        Self::EarliestDate,
        Self::LatestDate,
        Self::InvalidBoolean,
        Self::InvalidData,
        Self::ValueRequired,
        Self::ListNameRequired,
        Self::ListNotConfigured,
        Self::DbOperationNoSuccess,
        Self::InvalidValue,
        Self::InvalidName,
        Self::MissingSchema,
    ];

    /// The message id, e.g. `"_minLength"`.
    pub fn id(self) -> &'static str {
        match self {
            Self::InternalError => "_internalError",
            Self::NotAuthorized => "_notAuthorized",
            Self::ConcurrentUpdate => "_concurrentUpdate",
            Self::InvalidText => "_invalidText",
            Self::MinLength => "_minLength",
            Self::MaxLength => "_maxLength",
            Self::MinValue => "_minValue",
            Self::MaxValue => "_maxValue",
            Self::InvalidTimestamp => "_invalidTimestamp",
            Self::InvalidDate => "_invalidDate",
            Self::InvalidNumber => "_invalidNumber",
            Self::EarliestDate => "_earliestDate",
            Self::LatestDate => "_latestDate",
            Self::InvalidBoolean => "_invalidBoolean",
            Self::InvalidData => "_invalidData",
            Self::ValueRequired => "_valueRequired",
            Self::ListNameRequired => "_listNameRequired",
            Self::ListNotConfigured => "_listNotConfigured",
            Self::DbOperationNoSuccess => "_dbOperationNoSuccess",
            Self::InvalidValue => "_invalidValue",
            Self::InvalidName => "_invalidName",
            Self::MissingSchema => "_missingSchema",
        }
    }

    /// The English template.
    pub fn text(self) -> &'static str {
        match self {
            Self::InternalError => {
                "An error was encountered while processing the request. An alert has been raised for the support team to look into this. You may try again to see if the error was due to some transient situations"
            }
            Self::NotAuthorized => "This operation requires proper credentials",
            Self::ConcurrentUpdate => {
                "This data was concurrently modified by some one else. Please review the revised data before modifying it again"
            }
            Self::InvalidText => "not a valid text",
            Self::MinLength => "should have at least ${1} characters",
            Self::MaxLength => "may have at most ${1} characters",
            Self::MinValue => "value should be a minimum of ${1}",
            Self::MaxValue => "value may be at most ${1}",
            Self::InvalidTimestamp => "a timestamp is of the form 2021-12-28T23:32:24.123Z",
            Self::InvalidDate => "a date value is expected in the form yyyy-mm-dd",
            Self::InvalidNumber => "not a valid number",
            Self::EarliestDate => "date can not be earlier than ${1}",
            Self::LatestDate => "date can not be later than ${1}",
            Self::InvalidBoolean => "should be either true or false",
            Self::InvalidData => "Input data has one or more errors",
            Self::ValueRequired => "A value is required",
            Self::ListNameRequired => "List service requested without a listName",
            Self::ListNotConfigured => "List service not configured for processing this list",
            Self::DbOperationNoSuccess => {
                "There was no error, but the transaction was not completed for unspecified reasons. Please try again, report this as an error"
            }
            Self::InvalidValue => "This value is not valid",
            Self::InvalidName => "Name may have a max of 50 characters",
            Self::MissingSchema => {
                "Unable to validate this field because a value schema by name ${1} is missing"
            }
        }
    }

    /// Looks up a system message by id.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }

    /// Formats the template with `params`.
    pub fn format<S: AsRef<str>>(self, params: &[S]) -> String {
        format_message(self.text(), params)
    }
}

impl fmt::Display for SystemMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Matches a `${n}` placeholder.
static PLACEHOLDER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$\{(\d+)\}").ok());

/// Substitutes `${n}` placeholders in `template` with `params[n - 1]`.
///
/// A placeholder without a matching parameter (including `${0}`) is replaced
/// by the empty string.
pub fn format_message<S: AsRef<str>>(template: &str, params: &[S]) -> String {
    let Some(re) = PLACEHOLDER_RE.as_ref() else {
        return template.to_owned();
    };
    re.replace_all(template, |caps: &Captures<'_>| {
        caps.get(1)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| params.get(idx))
            .map(|p| p.as_ref().to_owned())
            .unwrap_or_default()
    })
    .into_owned()
}

// ---------------------------------------------------------------------------
// MessageCatalog
// ---------------------------------------------------------------------------

/// App messages layered over the system messages.
///
/// An app message with the same id as a system message replaces it.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    app: HashMap<String, String>,
}

impl MessageCatalog {
    /// Creates a catalog holding only the system messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a JSON object mapping ids to templates.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if `json` is not such an object.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let app: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { app })
    }

    /// Adds or replaces a message template.
    pub fn insert(&mut self, id: impl Into<String>, template: impl Into<String>) {
        self.app.insert(id.into(), template.into());
    }

    /// Returns the template for `id`, app messages first.
    pub fn template(&self, id: &str) -> Option<&str> {
        self.app
            .get(id)
            .map(String::as_str)
            .or_else(|| SystemMessage::from_id(id).map(SystemMessage::text))
    }

    /// Returns `true` if `id` resolves to a template.
    pub fn contains(&self, id: &str) -> bool {
        self.template(id).is_some()
    }

    /// Formats the message `id` with `params`. Unknown ids render as the id.
    pub fn render<S: AsRef<str>>(&self, id: &str, params: &[S]) -> String {
        match self.template(id) {
            Some(template) => format_message(template, params),
            None => {
                tracing::debug!(message_id = id, "no template for message id");
                id.to_owned()
            }
        }
    }
}
