/// The service response envelope exchanged across the client/server boundary.
///
/// A [`ServiceResponse`] carries a [`ServiceStatus`], its human-readable
/// description, optional [`DetailedMessage`]s and an optional payload. Its
/// fields are private: the only ways to obtain one are the checked
/// [`ResponseBuilder`] and the canonical constructors, so every envelope in
/// circulation satisfies the envelope invariants:
///
/// - a status other than `completed` comes with at least one error message;
/// - a payload is only carried by `completed` and `completedWithErrors`.
///
/// Envelopes are never edited in place. A [`ResponseInterceptor`] receives the
/// envelope by value and hands back a new one.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::messages::SystemMessage;
use crate::validation::AlertType;
use crate::value::Vo;

// ---------------------------------------------------------------------------
// ServiceStatus
// ---------------------------------------------------------------------------

/// Outcome of processing a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceStatus {
    /// Successfully completed.
    Completed,
    /// Completed, but the input was invalid or the intended action could not
    /// be taken.
    CompletedWithErrors,
    /// The request carries no session id but the service needs one.
    SessionRequired,
    /// The session id is unknown or has expired.
    NoSuchSession,
    /// The input data does not have the shape the service expects.
    InvalidDataFormat,
    /// No server is set up.
    NoServer,
    /// The request names no service.
    ServiceNameRequired,
    /// No such service, or it is not accessible to this user.
    NoSuchService,
    /// Error while communicating with the server.
    CommunicationError,
    /// Internal error on the server.
    ServerError,
}

impl ServiceStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Completed,
        Self::CompletedWithErrors,
        Self::SessionRequired,
        Self::NoSuchSession,
        Self::InvalidDataFormat,
        Self::NoServer,
        Self::ServiceNameRequired,
        Self::NoSuchService,
        Self::CommunicationError,
        Self::ServerError,
    ];

    /// The wire name, e.g. `"completedWithErrors"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completedWithErrors",
            Self::SessionRequired => "sessionRequired",
            Self::NoSuchSession => "noSuchSession",
            Self::InvalidDataFormat => "invalidDataFormat",
            Self::NoServer => "noServer",
            Self::ServiceNameRequired => "serviceNameRequired",
            Self::NoSuchService => "noSuchService",
            Self::CommunicationError => "communicationError",
            Self::ServerError => "serverError",
        }
    }

    /// Parses a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// The canonical description. Reproduced verbatim for display and wire
    /// compatibility.
    pub fn description(self) -> &'static str {
        match self {
            Self::Completed => "Completed with success",
            Self::CompletedWithErrors => "Completed, but there were errors",
            Self::SessionRequired => {
                "this service request valid only in a conversational mode. Hence a session id is required"
            }
            Self::NoSuchSession => "Session id for this conversational mode is invalid",
            Self::InvalidDataFormat => "The input data was not appropriate for this service",
            Self::NoServer => "No server is set up",
            Self::ServiceNameRequired => "No service name was specified",
            Self::NoSuchService => {
                "Service name is invalid, or this server is configured not to respond to this service"
            }
            Self::CommunicationError => {
                "An error was encountered while communicating with the server"
            }
            Self::ServerError => {
                "The server could not invoke this service due to a general error on the server"
            }
        }
    }

    /// Returns `true` if a response with this status may carry a payload.
    pub fn allows_data(self) -> bool {
        match self {
            Self::Completed | Self::CompletedWithErrors => true,
            Self::SessionRequired
            | Self::NoSuchSession
            | Self::InvalidDataFormat
            | Self::NoServer
            | Self::ServiceNameRequired
            | Self::NoSuchService
            | Self::CommunicationError
            | Self::ServerError => false,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DetailedMessage
// ---------------------------------------------------------------------------

/// A rendered, localizable diagnostic, optionally attributed to a field.
///
/// Created when a condition is detected and never mutated afterwards: the
/// `with_*` methods consume the message and return a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedMessage {
    #[serde(rename = "type")]
    message_type: AlertType,
    id: String,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    idx: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Vec<String>>,
}

impl DetailedMessage {
    /// Creates a message with the given severity, id and rendered text.
    pub fn new(message_type: AlertType, id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            message_type,
            id: id.into(),
            text: text.into(),
            field_name: None,
            object_name: None,
            idx: None,
            params: None,
        }
    }

    /// Creates an error message.
    pub fn error(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(AlertType::Error, id, text)
    }

    /// Creates an error message from a system message, rendering its template.
    pub fn system(message: SystemMessage, params: Vec<String>) -> Self {
        let msg = Self::error(message.id(), message.format(&params));
        if params.is_empty() {
            msg
        } else {
            msg.with_params(params)
        }
    }

    /// Attributes the message to a field.
    #[must_use]
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    /// Names the table or object the field belongs to.
    #[must_use]
    pub fn with_object_name(mut self, object_name: impl Into<String>) -> Self {
        self.object_name = Some(object_name.into());
        self
    }

    /// Sets the 0-based row of the field within its table.
    #[must_use]
    pub fn with_idx(mut self, idx: usize) -> Self {
        self.idx = Some(idx);
        self
    }

    /// Records the run-time parameters used to compose the text.
    #[must_use]
    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = Some(params);
        self
    }

    /// Severity.
    pub fn message_type(&self) -> AlertType {
        self.message_type
    }

    /// Returns `true` for error severity.
    pub fn is_error(&self) -> bool {
        self.message_type == AlertType::Error
    }

    /// Message id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rendered text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Field the message is attributed to.
    pub fn field_name(&self) -> Option<&str> {
        self.field_name.as_deref()
    }

    /// Table or object the field belongs to.
    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }

    /// Row index within the table.
    pub fn idx(&self) -> Option<usize> {
        self.idx
    }

    /// Parameters, or an empty slice.
    pub fn params(&self) -> &[String] {
        self.params.as_deref().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// An envelope that would violate the envelope invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// A non-`completed` status without any error message.
    #[error("a {status} response requires at least one error message")]
    MissingError {
        /// The offending status.
        status: ServiceStatus,
    },
    /// A payload on a status that does not carry one.
    #[error("a {status} response can not carry data")]
    DataNotAllowed {
        /// The offending status.
        status: ServiceStatus,
    },
}

// ---------------------------------------------------------------------------
// ServiceResponse
// ---------------------------------------------------------------------------

/// The response envelope for a service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ResponseWire")]
pub struct ServiceResponse {
    status: ServiceStatus,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    messages: Option<Vec<DetailedMessage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Vo>,
}

impl ServiceResponse {
    /// Starts a checked envelope for `status`.
    pub fn builder(status: ServiceStatus) -> ResponseBuilder {
        ResponseBuilder {
            status,
            description: None,
            messages: Vec::new(),
            data: None,
        }
    }

    /// A `completed` envelope with an optional payload.
    pub fn completed(data: Option<Vo>) -> Self {
        Self::canonical(ServiceStatus::Completed, Vec::new(), data)
    }

    /// A `completedWithErrors` envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::MissingError`] if `messages` holds no error.
    pub fn completed_with_errors(
        messages: Vec<DetailedMessage>,
        data: Option<Vo>,
    ) -> Result<Self, ResponseError> {
        let mut builder = Self::builder(ServiceStatus::CompletedWithErrors).messages(messages);
        if let Some(data) = data {
            builder = builder.data(data);
        }
        builder.build()
    }

    /// A failure envelope for any status, with no payload.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::MissingError`] if `status` is not `completed`
    /// and `messages` holds no error.
    pub fn failure(
        status: ServiceStatus,
        messages: Vec<DetailedMessage>,
    ) -> Result<Self, ResponseError> {
        Self::builder(status).messages(messages).build()
    }

    /// `serviceNameRequired`, blaming the `serviceName` field.
    pub fn service_name_required() -> Self {
        Self::canonical(
            ServiceStatus::ServiceNameRequired,
            vec![
                DetailedMessage::system(SystemMessage::ValueRequired, Vec::new())
                    .with_field_name("serviceName"),
            ],
            None,
        )
    }

    /// `noSuchService` for the requested `service` name.
    pub fn no_such_service(service: &str) -> Self {
        Self::canonical(
            ServiceStatus::NoSuchService,
            vec![
                DetailedMessage::system(SystemMessage::InvalidValue, Vec::new())
                    .with_field_name("serviceName")
                    .with_params(vec![service.to_owned()]),
            ],
            None,
        )
    }

    /// `sessionRequired`, blaming the `sessionId` field.
    pub fn session_required() -> Self {
        Self::canonical(
            ServiceStatus::SessionRequired,
            vec![
                DetailedMessage::system(SystemMessage::ValueRequired, Vec::new())
                    .with_field_name("sessionId"),
            ],
            None,
        )
    }

    /// `noSuchSession`, blaming the `sessionId` field.
    pub fn no_such_session() -> Self {
        Self::canonical(
            ServiceStatus::NoSuchSession,
            vec![
                DetailedMessage::system(SystemMessage::InvalidValue, Vec::new())
                    .with_field_name("sessionId"),
            ],
            None,
        )
    }

    /// `invalidDataFormat` with the `_invalidData` message.
    pub fn invalid_data_format() -> Self {
        Self::canonical(
            ServiceStatus::InvalidDataFormat,
            vec![DetailedMessage::system(SystemMessage::InvalidData, Vec::new())],
            None,
        )
    }

    /// `serverError` with the `_internalError` message.
    pub fn server_error() -> Self {
        Self::internal(ServiceStatus::ServerError)
    }

    /// `noServer` with the `_internalError` message.
    pub fn no_server() -> Self {
        Self::internal(ServiceStatus::NoServer)
    }

    /// `communicationError` with the `_internalError` message.
    pub fn communication_error() -> Self {
        Self::internal(ServiceStatus::CommunicationError)
    }

    fn internal(status: ServiceStatus) -> Self {
        Self::canonical(
            status,
            vec![DetailedMessage::system(SystemMessage::InternalError, Vec::new())],
            None,
        )
    }

    /// Assembles an envelope whose invariants hold by construction.
    fn canonical(status: ServiceStatus, messages: Vec<DetailedMessage>, data: Option<Vo>) -> Self {
        Self {
            status,
            description: status.description().to_owned(),
            messages: if messages.is_empty() {
                None
            } else {
                Some(messages)
            },
            data,
        }
    }

    /// Status.
    pub fn status(&self) -> ServiceStatus {
        self.status
    }

    /// Description of the status.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Messages, or an empty slice.
    pub fn messages(&self) -> &[DetailedMessage] {
        self.messages.as_deref().unwrap_or_default()
    }

    /// Payload.
    pub fn data(&self) -> Option<&Vo> {
        self.data.as_ref()
    }

    /// Returns `true` if any message has error severity.
    pub fn has_errors(&self) -> bool {
        self.messages().iter().any(DetailedMessage::is_error)
    }

    /// Reopens the envelope as a builder holding the same parts, so that a
    /// transformed copy can be produced.
    pub fn into_builder(self) -> ResponseBuilder {
        ResponseBuilder {
            status: self.status,
            description: Some(self.description),
            messages: self.messages.unwrap_or_default(),
            data: self.data,
        }
    }
}

/// Checked construction of a [`ServiceResponse`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ResponseBuilder {
    status: ServiceStatus,
    description: Option<String>,
    messages: Vec<DetailedMessage>,
    data: Option<Vo>,
}

impl ResponseBuilder {
    /// Changes the status. The description follows the new status unless it
    /// was overridden explicitly.
    pub fn status(mut self, status: ServiceStatus) -> Self {
        if self.description.as_deref() == Some(self.status.description()) {
            self.description = None;
        }
        self.status = status;
        self
    }

    /// Overrides the canonical description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds one message.
    pub fn message(mut self, message: DetailedMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Adds several messages.
    pub fn messages(mut self, messages: impl IntoIterator<Item = DetailedMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Sets the payload.
    pub fn data(mut self, data: Vo) -> Self {
        self.data = Some(data);
        self
    }

    /// Removes the payload.
    pub fn without_data(mut self) -> Self {
        self.data = None;
        self
    }

    /// Validates and assembles the envelope.
    ///
    /// # Errors
    ///
    /// - [`ResponseError::MissingError`] when the status is not `completed`
    ///   and no message has error severity.
    /// - [`ResponseError::DataNotAllowed`] when a payload is set on a status
    ///   that does not carry one.
    pub fn build(self) -> Result<ServiceResponse, ResponseError> {
        let status = self.status;
        if status != ServiceStatus::Completed && !self.messages.iter().any(DetailedMessage::is_error)
        {
            return Err(ResponseError::MissingError { status });
        }
        if self.data.is_some() && !status.allows_data() {
            return Err(ResponseError::DataNotAllowed { status });
        }
        Ok(ServiceResponse {
            status,
            description: self
                .description
                .unwrap_or_else(|| status.description().to_owned()),
            messages: if self.messages.is_empty() {
                None
            } else {
                Some(self.messages)
            },
            data: self.data,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseWire {
    status: ServiceStatus,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    messages: Option<Vec<DetailedMessage>>,
    #[serde(default)]
    data: Option<Vo>,
}

impl TryFrom<ResponseWire> for ServiceResponse {
    type Error = ResponseError;

    fn try_from(w: ResponseWire) -> Result<Self, Self::Error> {
        let mut builder = ServiceResponse::builder(w.status).messages(w.messages.unwrap_or_default());
        if let Some(description) = w.description {
            builder = builder.description(description);
        }
        if let Some(data) = w.data {
            builder = builder.data(data);
        }
        builder.build()
    }
}

// ---------------------------------------------------------------------------
// Interception
// ---------------------------------------------------------------------------

/// A stage that transforms an envelope before it is handed on.
///
/// The envelope is taken by value; the stage returns a new one. Closures of
/// the matching signature implement this trait.
pub trait ResponseInterceptor {
    /// Produces the envelope handed to the next stage.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError`] if the transformed envelope is invalid.
    fn intercept(&self, response: ServiceResponse) -> Result<ServiceResponse, ResponseError>;
}

impl<F> ResponseInterceptor for F
where
    F: Fn(ServiceResponse) -> Result<ServiceResponse, ResponseError>,
{
    fn intercept(&self, response: ServiceResponse) -> Result<ServiceResponse, ResponseError> {
        self(response)
    }
}

/// Runs `response` through each interceptor in turn.
///
/// # Errors
///
/// Stops at and returns the first interceptor error.
pub fn intercept_all(
    response: ServiceResponse,
    interceptors: &[&dyn ResponseInterceptor],
) -> Result<ServiceResponse, ResponseError> {
    interceptors
        .iter()
        .try_fold(response, |resp, stage| stage.intercept(resp))
}

// ---------------------------------------------------------------------------
// Server request / response
// ---------------------------------------------------------------------------

/// A request for a server to serve a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRequest {
    /// Name of the requested service.
    #[serde(default)]
    pub service: String,
    /// Opaque session id, for conversational services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Input payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vo>,
}

impl ServerRequest {
    /// Creates a request for `service` without session or payload.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    /// Sets the session id.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_data(mut self, data: Vo) -> Self {
        self.data = Some(data);
        self
    }
}

/// A [`ServiceResponse`] as returned by a server, with the session id passed
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerResponse {
    /// The envelope.
    #[serde(flatten)]
    pub response: ServiceResponse,
    /// Opaque session id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ServerResponse {
    /// Wraps `response`, echoing `session_id`.
    pub fn new(response: ServiceResponse, session_id: Option<String>) -> Self {
        Self {
            response,
            session_id,
        }
    }
}
