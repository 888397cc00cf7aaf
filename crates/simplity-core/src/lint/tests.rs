#![allow(clippy::expect_used)]

use serde_json::json;

use super::*;

fn lint(catalog: &JsonValue) -> LintResult {
    lint_catalog(catalog, &MessageCatalog::new(), &LintConfig::default())
}

fn codes(result: &LintResult) -> Vec<&'static str> {
    result.diagnostics.iter().map(|d| d.rule_id.code()).collect()
}

#[test]
fn clean_catalog_has_no_diagnostics() {
    let result = lint(&json!({
        "pin": {"name": "pin", "valueType": "text", "minLength": 6, "maxLength": 6, "regex": "^[0-9]+$"},
        "qty": {"name": "qty", "valueType": "integer", "minValue": 1, "maxValue": 99},
        "flag": {"name": "flag", "valueType": "boolean", "description": "yes or no"},
        "dob": {"name": "dob", "valueType": "date", "maxPastDays": 36500, "maxFutureDays": 0}
    }));
    assert!(result.is_empty(), "{:?}", result.diagnostics);
    assert!(!result.has_errors());
}

#[test]
fn name_must_match_key() {
    let result = lint(&json!({
        "a": {"name": "b", "valueType": "text"},
        "c": {"valueType": "text"},
        "d": {"name": 4, "valueType": "text"}
    }));
    assert_eq!(result.by_rule(LintRuleId::Sch01).count(), 3);
    assert_eq!(
        result.diagnostics[0].location,
        Location::Schema {
            key: "a".to_owned(),
            field: Some("name".to_owned())
        }
    );
}

#[test]
fn value_type_must_be_known() {
    let result = lint(&json!({
        "a": {"name": "a"},
        "b": {"name": "b", "valueType": "money", "minValue": 3}
    }));
    assert_eq!(codes(&result), ["SCH-02", "SCH-02"]);
    assert!(result.diagnostics[1].message.contains("timestamp"));
}

#[test]
fn stray_constraint_keys_are_reported() {
    let result = lint(&json!({
        "qty": {"name": "qty", "valueType": "integer", "maxLength": 5, "regex": "x"}
    }));
    assert_eq!(codes(&result), ["SCH-03", "SCH-03"]);
    let fields: Vec<String> = result
        .diagnostics
        .iter()
        .map(|d| d.location.to_string())
        .collect();
    assert!(fields.contains(&"schema \"qty\" field \"maxLength\"".to_owned()));
    assert!(fields.contains(&"schema \"qty\" field \"regex\"".to_owned()));
}

#[test]
fn boolean_accepts_only_common_keys() {
    let result = lint(&json!({
        "b": {"name": "b", "valueType": "boolean", "messageName": "_invalidBoolean", "minValue": 0}
    }));
    assert_eq!(codes(&result), ["SCH-03"]);
}

#[test]
fn inverted_bounds_are_reported_against_defaults_too() {
    let result = lint(&json!({
        "t": {"name": "t", "valueType": "text", "minLength": 10, "maxLength": 2},
        "u": {"name": "u", "valueType": "text", "minLength": 2000},
        "d": {"name": "d", "valueType": "decimal", "maxValue": -1.5}
    }));
    assert_eq!(codes(&result), ["SCH-04", "SCH-04", "SCH-04"]);
}

#[test]
fn regex_must_compile() {
    let result = lint(&json!({
        "a": {"name": "a", "valueType": "text", "regex": "(unclosed"},
        "b": {"name": "b", "valueType": "text", "regex": 12}
    }));
    // "b" also fails to load because regex is not a string.
    assert_eq!(codes(&result), ["SCH-05", "SCH-05", "SCH-08"]);
}

#[test]
fn unknown_message_name_is_a_warning() {
    let catalog = json!({
        "a": {"name": "a", "valueType": "text", "messageName": "zipInvalid"}
    });
    let result = lint(&catalog);
    assert_eq!(codes(&result), ["SCH-06"]);
    assert!(!result.has_errors());
    assert_eq!(result.warnings().count(), 1);

    let mut messages = MessageCatalog::new();
    messages.insert("zipInvalid", "not a zip code");
    let result = lint_catalog(&catalog, &messages, &LintConfig::default());
    assert!(result.is_empty());

    let off = LintConfig {
        check_message_names: false,
    };
    assert!(lint_catalog(&catalog, &MessageCatalog::new(), &off).is_empty());
}

#[test]
fn empty_date_window_is_reported() {
    let result = lint(&json!({
        "d": {"name": "d", "valueType": "date", "maxPastDays": -10, "maxFutureDays": 5},
        "e": {"name": "e", "valueType": "timestamp", "maxPastDays": -10, "maxFutureDays": 10}
    }));
    assert_eq!(codes(&result), ["SCH-07"]);
    assert_eq!(
        result.diagnostics[0].location,
        Location::Schema {
            key: "d".to_owned(),
            field: None
        }
    );
}

#[test]
fn malformed_shapes_are_reported() {
    let result = lint(&json!(["not", "an", "object"]));
    assert_eq!(codes(&result), ["SCH-08"]);
    assert_eq!(result.diagnostics[0].location, Location::Catalog);

    let result = lint(&json!({
        "a": "text",
        "b": {"name": "b", "valueType": "text", "minLength": -1}
    }));
    assert_eq!(codes(&result), ["SCH-08", "SCH-08"]);
}

#[test]
fn findings_are_collected_across_rules() {
    let result = lint(&json!({
        "x": {"name": "y", "valueType": "text", "minLength": 9, "maxLength": 3, "minValue": 1, "regex": "["}
    }));
    assert_eq!(codes(&result), ["SCH-01", "SCH-03", "SCH-04", "SCH-05"]);
    assert_eq!(result.errors().count(), 4);
}

#[test]
fn diagnostic_display_is_one_line() {
    let d = Diagnostic::new(
        LintRuleId::Sch06,
        Severity::Warning,
        Location::field("zip", "messageName"),
        "message \"m\" is not in the message catalog",
    );
    assert_eq!(
        d.to_string(),
        "[W] SCH-06 schema \"zip\" field \"messageName\": message \"m\" is not in the message catalog"
    );
}

#[test]
fn lint_from_text_reports_bad_json() {
    assert!(lint_catalog_str("{", &MessageCatalog::new(), &LintConfig::default()).is_err());
    let ok = lint_catalog_str("{}", &MessageCatalog::new(), &LintConfig::default())
        .expect("valid json");
    assert!(ok.is_empty());
}
