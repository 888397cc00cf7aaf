/// Service dispatch: resolves a [`ServerRequest`] to a registered [`Service`]
/// and wraps its answer in a [`ServerResponse`].
///
/// Every failure that happens before the service runs (no service name, an
/// unknown service, a missing or rejected session) is answered with the
/// matching canonical envelope. The dispatcher itself never fails.
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::messages::{MessageCatalog, SystemMessage};
use crate::response::{DetailedMessage, ServerRequest, ServerResponse, ServiceResponse};
use crate::schema::ValueSchemas;
use crate::validation::{ValidationMessage, ValueValidationResult};
use crate::validator::{ValidationContext, validate_json};
use crate::value::{StringMap, Value, Vo};

#[cfg(test)]
mod tests;

/// Design-time description of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Name the service is requested by.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the service may be requested without a session.
    #[serde(default)]
    pub serve_guests: bool,
    /// Form describing the request payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_form: Option<String>,
    /// Form describing the response payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_form: Option<String>,
}

impl ServiceSpec {
    /// A spec for a service that requires a session.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter for `serveGuests`.
    #[must_use]
    pub fn serve_guests(mut self, serve_guests: bool) -> Self {
        self.serve_guests = serve_guests;
        self
    }

    /// Builder-style setter for `description`.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// What a service sees of the server while it runs.
#[derive(Debug, Clone, Copy)]
pub struct ServiceContext<'a> {
    session_id: Option<&'a str>,
    schemas: &'a ValueSchemas,
    validation: &'a ValidationContext,
    messages: &'a MessageCatalog,
}

impl<'a> ServiceContext<'a> {
    /// Assembles a context.
    pub fn new(
        session_id: Option<&'a str>,
        schemas: &'a ValueSchemas,
        validation: &'a ValidationContext,
        messages: &'a MessageCatalog,
    ) -> Self {
        Self {
            session_id,
            schemas,
            validation,
            messages,
        }
    }

    /// The session the request was made in, if any.
    pub fn session_id(&self) -> Option<&'a str> {
        self.session_id
    }

    /// The value schema catalog.
    pub fn schemas(&self) -> &'a ValueSchemas {
        self.schemas
    }

    /// The message catalog used to render messages.
    pub fn messages(&self) -> &'a MessageCatalog {
        self.messages
    }

    /// Validates one payload field against the schema named `schema_name`.
    ///
    /// An absent field is treated as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns the rendered messages, attributed to `field`, when the value
    /// is invalid or the schema does not exist.
    pub fn validate_field(
        &self,
        field: &str,
        schema_name: &str,
        value: Option<&JsonValue>,
    ) -> Result<Value, Vec<DetailedMessage>> {
        let result = match self.schemas.get(schema_name) {
            Some(schema) => validate_json(schema, value.unwrap_or(&JsonValue::Null), self.validation),
            None => ValueValidationResult::invalid(
                Value::Text(String::new()),
                ValidationMessage::system(
                    SystemMessage::MissingSchema,
                    vec![schema_name.to_owned()],
                ),
            ),
        };
        result.into_result().map_err(|messages| {
            messages
                .iter()
                .map(|m| m.to_detailed(self.messages, Some(field)))
                .collect()
        })
    }

    /// Validates every `(field, schema)` pair of `fields` in `data`,
    /// collecting the messages of all invalid fields.
    ///
    /// # Errors
    ///
    /// Returns the messages of every invalid field, in `fields` order.
    pub fn validate_fields(
        &self,
        data: Option<&Vo>,
        fields: &[(&str, &str)],
    ) -> Result<StringMap<Value>, Vec<DetailedMessage>> {
        let mut values = StringMap::new();
        let mut errors = Vec::new();
        for &(field, schema_name) in fields {
            match self.validate_field(field, schema_name, data.and_then(|d| d.get(field))) {
                Ok(value) => {
                    values.insert(field.to_owned(), value);
                }
                Err(mut msgs) => errors.append(&mut msgs),
            }
        }
        if errors.is_empty() {
            Ok(values)
        } else {
            Err(errors)
        }
    }
}

/// A unit of server-side logic that answers a request with an envelope.
pub trait Service: Send + Sync {
    /// The service's design-time description.
    fn spec(&self) -> &ServiceSpec;

    /// Serves one request. Failures are reported in the envelope.
    fn serve(&self, ctx: &ServiceContext<'_>, data: Option<&Vo>) -> ServiceResponse;
}

/// A [`Service`] backed by a closure.
pub struct FnService<F> {
    spec: ServiceSpec,
    f: F,
}

impl<F> FnService<F>
where
    F: Fn(&ServiceContext<'_>, Option<&Vo>) -> ServiceResponse + Send + Sync,
{
    /// Wraps `f` under `spec`.
    pub fn new(spec: ServiceSpec, f: F) -> Self {
        Self { spec, f }
    }
}

impl<F> Service for FnService<F>
where
    F: Fn(&ServiceContext<'_>, Option<&Vo>) -> ServiceResponse + Send + Sync,
{
    fn spec(&self) -> &ServiceSpec {
        &self.spec
    }

    fn serve(&self, ctx: &ServiceContext<'_>, data: Option<&Vo>) -> ServiceResponse {
        (self.f)(ctx, data)
    }
}

/// Decides whether a session id denotes a live session.
pub trait SessionValidator: Send + Sync {
    /// Returns `true` if `session_id` is valid.
    fn is_valid(&self, session_id: &str) -> bool;
}

impl<F> SessionValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, session_id: &str) -> bool {
        self(session_id)
    }
}

// ---------------------------------------------------------------------------
// ServiceRegistry
// ---------------------------------------------------------------------------

/// The services a server answers for, plus what they share.
///
/// Without a [`SessionValidator`] every non-empty session id is accepted.
pub struct ServiceRegistry {
    services: HashMap<String, Box<dyn Service>>,
    schemas: ValueSchemas,
    messages: MessageCatalog,
    validation: ValidationContext,
    sessions: Option<Box<dyn SessionValidator>>,
}

impl ServiceRegistry {
    /// An empty registry with the system schemas and messages.
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            schemas: ValueSchemas::with_system(),
            messages: MessageCatalog::new(),
            validation: ValidationContext::new(),
            sessions: None,
        }
    }

    /// Replaces the value schema catalog.
    #[must_use]
    pub fn with_schemas(mut self, schemas: ValueSchemas) -> Self {
        self.schemas = schemas;
        self
    }

    /// Replaces the message catalog.
    #[must_use]
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }

    /// Replaces the validation context.
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationContext) -> Self {
        self.validation = validation;
        self
    }

    /// Installs the session validator.
    #[must_use]
    pub fn with_session_validator(mut self, sessions: impl SessionValidator + 'static) -> Self {
        self.sessions = Some(Box::new(sessions));
        self
    }

    /// Registers `service` under its spec name, returning the service it
    /// replaced.
    pub fn register(&mut self, service: impl Service + 'static) -> Option<Box<dyn Service>> {
        let name = service.spec().name.clone();
        self.services.insert(name, Box::new(service))
    }

    /// Builder-style [`register`][Self::register].
    #[must_use]
    pub fn with_service(mut self, service: impl Service + 'static) -> Self {
        let _replaced = self.register(service);
        self
    }

    /// Looks up the spec of a registered service.
    pub fn spec(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.get(name).map(|s| s.spec())
    }

    /// Names of the registered services, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Serves `request`, echoing its session id in the response.
    pub fn serve(&self, request: &ServerRequest) -> ServerResponse {
        let session_id = request.session_id.as_deref().filter(|s| !s.is_empty());
        let response = self.dispatch(&request.service, session_id, request.data.as_ref());
        tracing::debug!(
            service = request.service.as_str(),
            status = %response.status(),
            "served request"
        );
        ServerResponse::new(response, request.session_id.clone())
    }

    fn dispatch(&self, name: &str, session_id: Option<&str>, data: Option<&Vo>) -> ServiceResponse {
        if name.is_empty() {
            return ServiceResponse::service_name_required();
        }
        let Some(service) = self.services.get(name) else {
            return ServiceResponse::no_such_service(name);
        };
        if !service.spec().serve_guests {
            let Some(id) = session_id else {
                return ServiceResponse::session_required();
            };
            if self.sessions.as_ref().is_some_and(|v| !v.is_valid(id)) {
                return ServiceResponse::no_such_session();
            }
        }
        let ctx = ServiceContext::new(session_id, &self.schemas, &self.validation, &self.messages);
        service.serve(&ctx, data)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.names())
            .field("schemas", &self.schemas.len())
            .field("sessions", &self.sessions.is_some())
            .finish()
    }
}
