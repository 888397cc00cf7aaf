#![allow(clippy::expect_used)]

use chrono::NaiveDate;
use serde_json::json;

use super::*;
use crate::response::ServiceStatus;
use crate::schema::{Constraints, IntegerConstraints, ValueSchema};

fn echo(ctx: &ServiceContext<'_>, data: Option<&Vo>) -> ServiceResponse {
    let mut out = data.cloned().unwrap_or_default();
    if let Some(session) = ctx.session_id() {
        out.insert("session".to_owned(), json!(session));
    }
    ServiceResponse::completed(Some(out))
}

fn registry() -> ServiceRegistry {
    let mut schemas = ValueSchemas::with_system();
    schemas
        .insert(ValueSchema::with_constraints(
            "qty",
            Constraints::Integer(IntegerConstraints {
                min_value: 1,
                max_value: 10,
            }),
        ))
        .expect("schema compiles");
    let today = NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date");

    ServiceRegistry::new()
        .with_schemas(schemas)
        .with_validation(ValidationContext::with_today(today))
        .with_session_validator(|id: &str| id.starts_with("live-"))
        .with_service(FnService::new(ServiceSpec::new("echo"), echo))
        .with_service(FnService::new(
            ServiceSpec::new("ping").serve_guests(true),
            |_: &ServiceContext<'_>, _: Option<&Vo>| ServiceResponse::completed(None),
        ))
        .with_service(FnService::new(
            ServiceSpec::new("order"),
            |ctx: &ServiceContext<'_>, data: Option<&Vo>| {
                match ctx.validate_fields(data, &[("qty", "qty"), ("name", "_name")]) {
                    Ok(values) => {
                        let mut out = Vo::new();
                        for (k, v) in values {
                            out.insert(k, v.to_json());
                        }
                        ServiceResponse::completed(Some(out))
                    }
                    Err(messages) => ServiceResponse::completed_with_errors(messages, None)
                        .expect("messages are errors"),
                }
            },
        ))
}

#[test]
fn missing_service_name_is_rejected_first() {
    let resp = registry().serve(&ServerRequest::new(""));
    assert_eq!(resp.response.status(), ServiceStatus::ServiceNameRequired);
    assert_eq!(resp.response.messages()[0].field_name(), Some("serviceName"));
}

#[test]
fn unknown_service_names_the_service() {
    let resp = registry().serve(&ServerRequest::new("getOrders").with_session_id("live-1"));
    assert_eq!(resp.response.status(), ServiceStatus::NoSuchService);
    assert_eq!(resp.response.messages()[0].params(), &["getOrders".to_owned()]);
    assert_eq!(resp.session_id.as_deref(), Some("live-1"));
}

#[test]
fn guest_services_need_no_session() {
    let resp = registry().serve(&ServerRequest::new("ping"));
    assert_eq!(resp.response.status(), ServiceStatus::Completed);
    assert!(resp.session_id.is_none());
}

#[test]
fn member_services_require_a_session() {
    let reg = registry();
    let resp = reg.serve(&ServerRequest::new("echo"));
    assert_eq!(resp.response.status(), ServiceStatus::SessionRequired);

    let resp = reg.serve(&ServerRequest::new("echo").with_session_id(""));
    assert_eq!(resp.response.status(), ServiceStatus::SessionRequired);

    let resp = reg.serve(&ServerRequest::new("echo").with_session_id("stale-9"));
    assert_eq!(resp.response.status(), ServiceStatus::NoSuchSession);
    assert_eq!(resp.session_id.as_deref(), Some("stale-9"));
}

#[test]
fn without_a_validator_any_session_is_accepted() {
    let reg = ServiceRegistry::new().with_service(FnService::new(ServiceSpec::new("echo"), echo));
    let resp = reg.serve(&ServerRequest::new("echo").with_session_id("anything"));
    assert_eq!(resp.response.status(), ServiceStatus::Completed);
}

#[test]
fn service_sees_session_and_payload() {
    let mut data = Vo::new();
    data.insert("x".to_owned(), json!(1));
    let resp = registry().serve(
        &ServerRequest::new("echo")
            .with_session_id("live-7")
            .with_data(data),
    );
    assert_eq!(resp.response.status(), ServiceStatus::Completed);
    let out = resp.response.data().expect("payload");
    assert_eq!(out["x"], json!(1));
    assert_eq!(out["session"], json!("live-7"));
    assert_eq!(resp.session_id.as_deref(), Some("live-7"));
}

#[test]
fn field_validation_reports_every_invalid_field() {
    let mut data = Vo::new();
    data.insert("qty".to_owned(), json!(11));
    let resp = registry().serve(
        &ServerRequest::new("order")
            .with_session_id("live-1")
            .with_data(data),
    );
    assert_eq!(resp.response.status(), ServiceStatus::CompletedWithErrors);
    let msgs = resp.response.messages();
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].field_name(), Some("qty"));
    assert_eq!(msgs[0].id(), "_maxValue");
    assert_eq!(msgs[0].text(), "value may be at most 10");
    assert_eq!(msgs[1].field_name(), Some("name"));
    assert_eq!(msgs[1].id(), "_valueRequired");
}

#[test]
fn valid_fields_come_back_typed() {
    let mut data = Vo::new();
    data.insert("qty".to_owned(), json!("4"));
    data.insert("name".to_owned(), json!("Ada"));
    let resp = registry().serve(
        &ServerRequest::new("order")
            .with_session_id("live-1")
            .with_data(data),
    );
    assert_eq!(resp.response.status(), ServiceStatus::Completed);
    let out = resp.response.data().expect("payload");
    assert_eq!(out["qty"], json!(4));
    assert_eq!(out["name"], json!("Ada"));
}

#[test]
fn unknown_schema_is_reported_per_field() {
    let reg = registry();
    let schemas = ValueSchemas::new();
    let validation = ValidationContext::new();
    let messages = MessageCatalog::new();
    let ctx = ServiceContext::new(None, &schemas, &validation, &messages);
    let err = ctx
        .validate_field("zip", "zipCode", Some(&json!("560001")))
        .expect_err("no such schema");
    assert_eq!(err[0].id(), "_missingSchema");
    assert_eq!(err[0].text(), "Unable to validate this field because a value schema by name zipCode is missing");
    assert_eq!(err[0].field_name(), Some("zip"));
    assert_eq!(reg.names(), ["echo", "order", "ping"]);
}

#[test]
fn register_replaces_by_name() {
    let mut reg = ServiceRegistry::new();
    assert!(reg.register(FnService::new(ServiceSpec::new("a"), echo)).is_none());
    let old = reg.register(FnService::new(
        ServiceSpec::new("a").serve_guests(true),
        echo,
    ));
    assert!(old.is_some());
    assert!(reg.spec("a").expect("registered").serve_guests);
}

#[test]
fn spec_wire_names_are_camel_case() {
    let spec: ServiceSpec = serde_json::from_value(json!({
        "name": "getOrders",
        "serveGuests": true,
        "requestForm": "orderFilter",
        "responseForm": "order"
    }))
    .expect("parse");
    assert!(spec.serve_guests);
    assert_eq!(spec.request_form.as_deref(), Some("orderFilter"));
    let back = serde_json::to_value(&spec).expect("serialize");
    assert_eq!(back["responseForm"], "order");
    assert!(back.get("description").is_none());
}
