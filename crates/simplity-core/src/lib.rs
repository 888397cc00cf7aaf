#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod lint;
pub mod messages;
pub mod response;
pub mod schema;
pub mod service;
pub mod validation;
pub mod validator;
pub mod value;

pub use lint::{
    Diagnostic, LintConfig, LintResult, LintRule, LintRuleId, Location, Severity, build_registry,
    lint_catalog, lint_catalog_str,
};
pub use messages::{MessageCatalog, SystemMessage, format_message};
pub use response::{
    DetailedMessage, ResponseBuilder, ResponseError, ResponseInterceptor, ServerRequest,
    ServerResponse, ServiceResponse, ServiceStatus, intercept_all,
};
pub use schema::{
    CompiledSchema, Constraints, DateWindow, DecimalConstraints, IntegerConstraints, SchemaError,
    TextConstraints, ValueSchema, ValueSchemas, ValueType, system_value_schemas,
};
pub use service::{
    FnService, Service, ServiceContext, ServiceRegistry, ServiceSpec, SessionValidator,
};
pub use validation::{AlertType, ValidationMessage, ValidationMessages, ValueValidationResult};
pub use validator::{
    ValidationContext, ValueValidationFn, validate_json, validate_named, validate_value,
};
pub use value::{StringMap, Value, Vo, boolean_from_json, boolean_from_text};

/// Returns the current version of the simplity-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "version should have 3 parts: {v}");
        for part in parts {
            part.parse::<u32>().expect("each part should be a number");
        }
    }
}
