//! Record validation tests

use super::*;
use crate::schema::{
    FieldKind, FieldSpec, Format, JsonType, SchemaRegistry, StreamSchema, Vocabulary,
};
use crate::types::{JsonObject, JsonValue};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

fn registry() -> Arc<SchemaRegistry> {
    SchemaRegistry::shared().unwrap()
}

fn object(value: JsonValue) -> JsonObject {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn run(stream: &str, record: JsonValue) -> ValidationResult {
    validate_record(&registry(), stream, &object(record)).unwrap()
}

fn paths(issues: &[FieldIssue]) -> Vec<String> {
    issues.iter().map(|i| i.path.to_string()).collect()
}

/// A value that conforms to `spec`
fn conforming(spec: &FieldSpec) -> JsonValue {
    match &spec.kind {
        FieldKind::Enum(vocabulary) => json!(vocabulary.values()[0]),
        FieldKind::Scalar {
            format: Some(Format::Date),
        } => json!("2024-02-09"),
        FieldKind::Scalar {
            format: Some(Format::DateTime),
        } => json!("2024-02-09T10:30:00Z"),
        FieldKind::Scalar { format: None } => {
            if spec.types.contains(JsonType::String) {
                json!("123")
            } else if spec.types.contains(JsonType::Integer) {
                json!(1)
            } else if spec.types.contains(JsonType::Number) {
                json!(1.5)
            } else if spec.types.contains(JsonType::Boolean) {
                json!(true)
            } else {
                json!({})
            }
        }
        FieldKind::ArrayOf(_) => json!([]),
        FieldKind::ObjectOf(object) => JsonValue::Object(
            object
                .required
                .iter()
                .map(|name| (name.clone(), conforming(&object.properties[name])))
                .collect(),
        ),
    }
}

/// The smallest record that satisfies a schema
fn minimal(schema: &StreamSchema) -> JsonObject {
    schema
        .required()
        .iter()
        .map(|name| (name.clone(), conforming(&schema.properties()[name])))
        .collect()
}

const ALL_STREAMS: [&str; 9] = [
    "campaigns",
    "ad_groups",
    "ads",
    "targets",
    "search_term_reports",
    "advertised_product_reports",
    "purchased_product_reports",
    "gross_and_invalid_traffic_reports",
    "sponsored_summary_reports",
];

// ============================================================================
// Required fields
// ============================================================================

#[test_case("campaigns")]
#[test_case("ad_groups")]
#[test_case("ads")]
#[test_case("targets")]
#[test_case("search_term_reports")]
#[test_case("advertised_product_reports")]
#[test_case("purchased_product_reports")]
#[test_case("gross_and_invalid_traffic_reports")]
#[test_case("sponsored_summary_reports")]
fn test_required_fields(stream: &str) {
    let registry = registry();
    let schema = registry.get_schema(stream).unwrap();
    let record = minimal(schema);

    let result = validate(schema, &record);
    assert!(result.is_valid(), "{stream}: {:?}", result.errors);
    assert!(result.warnings.is_empty(), "{stream}: {:?}", result.warnings);

    for field in schema.required() {
        let mut absent = record.clone();
        absent.remove(field);
        let result = validate(schema, &absent);
        assert!(!result.is_valid(), "{stream}.{field} absent");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].error, FieldError::MissingRequiredField);
        assert_eq!(result.errors[0].path.to_string(), *field);

        let mut null = record.clone();
        null.insert(field.clone(), JsonValue::Null);
        let result = validate(schema, &null);
        assert!(!result.is_valid(), "{stream}.{field} null");
        assert_eq!(result.errors[0].error, FieldError::MissingRequiredField);
    }
}

#[test]
fn test_absent_nullable_fields_become_null() {
    let result = run("campaigns", json!({"campaignId": "1"}));
    assert!(result.is_valid());
    assert_eq!(result.record["name"], NormalizedValue::Null);
    assert_eq!(result.record["budget"], NormalizedValue::Null);

    let schema = registry().get_shared("campaigns").unwrap();
    assert_eq!(result.record.len(), schema.properties().len());
}

#[test]
fn test_nested_nullable_fields_filled() {
    let result = run(
        "campaigns",
        json!({"campaignId": "1", "budget": {"budget": 50}}),
    );
    assert!(result.is_valid());

    let budget = &result.record["budget"];
    assert_eq!(budget.get("budgetType"), Some(&NormalizedValue::Null));
    assert_eq!(budget.get("currencyCode"), Some(&NormalizedValue::Null));
}

#[test]
fn test_required_field_type_mismatch_rejects() {
    let result = run("campaigns", json!({"campaignId": {"id": 1}}));
    assert!(!result.is_valid());
    assert!(matches!(
        result.errors[0].error,
        FieldError::TypeMismatch {
            found: JsonType::Object,
            ..
        }
    ));
}

#[test]
fn test_numeric_id_coerced_to_string() {
    let result = run("campaigns", json!({"campaignId": 144_807_212_960_393_u64}));
    assert!(result.is_valid());
    assert_eq!(
        result.record["campaignId"],
        NormalizedValue::String("144807212960393".into())
    );
}

#[test]
fn test_non_object_record_rejected() {
    let registry = registry();
    let schema = registry.get_schema("campaigns").unwrap();
    let result = validate_value(schema, &json!(["not", "a", "record"]));
    assert!(!result.is_valid());
    assert_eq!(result.errors[0].path.to_string(), "<record>");
    assert!(result.record.is_empty());
}

#[test]
fn test_unknown_stream() {
    let err = validate_record(&registry(), "keywords", &JsonObject::new()).unwrap_err();
    assert!(matches!(err, crate::Error::UnknownStream { .. }));
}

// ============================================================================
// Enums
// ============================================================================

/// One step from a property to an enum nested below it
#[derive(Debug, Clone)]
enum Step {
    Key(String),
    Item,
}

/// Every enum reachable from `spec`, with the steps leading to it
fn enum_sites(spec: &FieldSpec, steps: &mut Vec<Step>, out: &mut Vec<(Vec<Step>, Arc<Vocabulary>)>) {
    match &spec.kind {
        FieldKind::Enum(vocabulary) => out.push((steps.clone(), Arc::clone(vocabulary))),
        FieldKind::ArrayOf(items) => {
            steps.push(Step::Item);
            enum_sites(items, steps, out);
            steps.pop();
        }
        FieldKind::ObjectOf(object) => {
            for (name, property) in &object.properties {
                steps.push(Step::Key(name.clone()));
                enum_sites(property, steps, out);
                steps.pop();
            }
        }
        FieldKind::Scalar { .. } => {}
    }
}

/// A conforming value for `spec` with `leaf` placed at the end of `steps`
fn conforming_with(spec: &FieldSpec, steps: &[Step], leaf: &JsonValue) -> JsonValue {
    match (steps.split_first(), &spec.kind) {
        (None, _) => leaf.clone(),
        (Some((Step::Key(name), rest)), FieldKind::ObjectOf(nested)) => {
            let mut value = object(conforming(spec));
            value.insert(name.clone(), conforming_with(&nested.properties[name], rest, leaf));
            JsonValue::Object(value)
        }
        (Some((Step::Item, rest)), FieldKind::ArrayOf(items)) => {
            json!([conforming_with(items, rest, leaf)])
        }
        (Some((step, _)), kind) => panic!("step {step:?} does not apply to {kind:?}"),
    }
}

fn site_name(steps: &[Step]) -> String {
    let mut name = String::new();
    for step in steps {
        match step {
            Step::Key(key) if name.is_empty() => name.push_str(key),
            Step::Key(key) => {
                name.push('.');
                name.push_str(key);
            }
            Step::Item => name.push_str("[]"),
        }
    }
    name
}

fn lookup<'a>(mut value: &'a JsonValue, steps: &[Step]) -> &'a JsonValue {
    for step in steps {
        value = match step {
            Step::Key(key) => &value[key.as_str()],
            Step::Item => &value[0],
        };
    }
    value
}

#[test]
fn test_every_enum_member_accepted() {
    let registry = registry();
    let mut visited = Vec::new();

    for stream in ALL_STREAMS {
        let schema = registry.get_schema(stream).unwrap();
        for (name, spec) in schema.properties() {
            let mut sites = Vec::new();
            enum_sites(spec, &mut Vec::new(), &mut sites);

            for (steps, vocabulary) in sites {
                let site = site_name(&[&[Step::Key(name.clone())], steps.as_slice()].concat());
                for member in vocabulary.values() {
                    let mut record = minimal(schema);
                    record.insert(name.clone(), conforming_with(spec, &steps, &json!(member)));

                    let result = validate(schema, &record);
                    assert!(
                        result.is_valid() && result.warnings.is_empty(),
                        "{stream}.{site} = {member}: {:?} {:?}",
                        result.errors,
                        result.warnings
                    );
                    let emitted = result.record_json();
                    assert_eq!(
                        lookup(&emitted[name.as_str()], &steps),
                        &json!(member),
                        "{stream}.{site}"
                    );
                }
                visited.push(format!("{stream}.{site}"));
            }
        }
    }

    for nested in [
        "ads.creative.cards[].landingPage.landingPageType",
        "ad_groups.optimization.goalSetting.goal",
        "ad_groups.optimization.bidStrategy",
        "ad_groups.optimization.bidAdjustments[].placement",
        "campaigns.budget.budgetType",
        "campaigns.dynamicBidding.strategy",
        "campaigns.dynamicBidding.placementBidding[].placement",
        "targets.expression[].type",
    ] {
        assert!(visited.iter().any(|v| v == nested), "{nested} not visited");
    }
}

#[test]
fn test_out_of_vocabulary_optional_enum_warns() {
    let result = run("campaigns", json!({"campaignId": "1", "state": "DELETED"}));
    assert!(result.is_valid());
    assert_eq!(paths(&result.warnings), vec!["state"]);
    assert_eq!(
        result.warnings[0].error,
        FieldError::InvalidEnumValue {
            value: "DELETED".into(),
            vocabulary: Some("EntityState".into()),
        }
    );
    assert_eq!(result.record["state"], NormalizedValue::String("DELETED".into()));
}

#[test]
fn test_out_of_vocabulary_required_enum_rejects() {
    let registry = SchemaRegistry::from_documents(
        &json!({"definitions": {"Color": {"type": "string", "enum": ["RED"]}}}),
        [(
            "things".to_string(),
            json!({
                "type": "object",
                "required": ["color"],
                "properties": { "color": { "type": "string", "$ref": "#/definitions/Color" } }
            }),
        )],
    )
    .unwrap();

    let result = validate_record(&registry, "things", &object(json!({"color": "BLUE"}))).unwrap();
    assert!(!result.is_valid());
    assert_eq!(result.errors[0].severity, Severity::Error);
    assert!(result.into_record().is_none());
}

#[test]
fn test_array_element_enum_never_rejects() {
    let result = run(
        "campaigns",
        json!({
            "campaignId": "1",
            "dynamicBidding": {
                "placementBidding": [{"placement": "PLACEMENT_NOWHERE", "percentage": 10}]
            }
        }),
    );
    // Array elements are never required, so this stays a warning
    assert!(result.is_valid());
    assert_eq!(
        paths(&result.warnings),
        vec!["dynamicBidding.placementBidding[0].placement"]
    );
}

#[test]
fn test_null_enum_allowed_when_nullable() {
    let result = run("campaigns", json!({"campaignId": "1", "state": null}));
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_delivery_reasons_partial_failure() {
    let result = run(
        "ad_groups",
        json!({
            "adGroupId": "7",
            "deliveryReasons": ["CAMPAIGN_PAUSED", "NOT_A_REAL_REASON"]
        }),
    );

    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
    let warning = &result.warnings[0];
    assert_eq!(warning.path, FieldPath::root().key("deliveryReasons").index(1));
    assert_eq!(warning.severity, Severity::Warning);
    assert!(matches!(warning.error, FieldError::InvalidEnumValue { .. }));

    assert_eq!(
        result.record_json()["deliveryReasons"],
        json!(["CAMPAIGN_PAUSED", "NOT_A_REAL_REASON"])
    );
}

// ============================================================================
// Nested objects
// ============================================================================

#[test]
fn test_ad_group_bid_missing_currency() {
    let result = run(
        "ad_groups",
        json!({"adGroupId": "7", "bid": {"defaultBid": 0.75}}),
    );

    assert!(result.is_valid());
    assert_eq!(paths(&result.warnings), vec!["bid.currencyCode"]);
    assert_eq!(result.warnings[0].error, FieldError::MissingRequiredField);
    assert_eq!(result.record_json()["bid"], json!({"defaultBid": 0.75}));
}

#[test]
fn test_deep_nested_path() {
    let result = run(
        "ads",
        json!({
            "adId": "9",
            "creative": {
                "cards": [
                    {"headline": "ok", "landingPage": {"landingPageType": "STORE"}},
                    {"headline": "bad", "landingPage": {"landingPageUrl": "https://x"}}
                ]
            }
        }),
    );

    assert!(result.is_valid());
    assert_eq!(
        paths(&result.warnings),
        vec!["creative.cards[1].landingPage.landingPageType"]
    );
    let cards = &result.record_json()["creative"]["cards"];
    assert_eq!(cards.as_array().unwrap().len(), 2);
    assert_eq!(cards[0]["landingPage"]["landingPageUrl"], JsonValue::Null);
}

#[test]
fn test_type_mismatch_passes_through() {
    let result = run(
        "campaigns",
        json!({"campaignId": "1", "budget": "lots"}),
    );
    assert!(result.is_valid());
    assert_eq!(paths(&result.warnings), vec!["budget"]);
    assert_eq!(result.record_json()["budget"], json!("lots"));
}

#[test]
fn test_array_elements_coerced() {
    let result = run(
        "campaigns",
        json!({
            "campaignId": "1",
            "dynamicBidding": {
                "placementBidding": [
                    {"placement": "PLACEMENT_TOP", "percentage": "25"},
                    {"placement": "PLACEMENT_PRODUCT_PAGE", "percentage": "many"}
                ]
            }
        }),
    );

    assert!(result.is_valid());
    assert_eq!(
        paths(&result.warnings),
        vec!["dynamicBidding.placementBidding[1].percentage"]
    );
    let bidding = &result.record_json()["dynamicBidding"]["placementBidding"];
    assert_eq!(bidding[0]["percentage"], json!(25));
    assert_eq!(bidding[1]["percentage"], json!("many"));
}

#[test]
fn test_project_standalone() {
    let registry = registry();
    let ad_groups = registry.get_schema("ad_groups").unwrap();
    let bid = ad_groups.get_property("bid").unwrap();

    let (value, issues) = project(bid, &json!({"defaultBid": "1.25", "currencyCode": "EUR"}));
    assert!(issues.is_empty());
    assert_eq!(value.to_json(), json!({"defaultBid": 1.25, "currencyCode": "EUR"}));
}

// ============================================================================
// Unknown fields
// ============================================================================

#[test]
fn test_unknown_fields_preserved() {
    let extra = json!({"nested": [1, "two", {"three": 3.0}], "flag": true});
    let result = run(
        "campaigns",
        json!({"campaignId": "1", "experimental": extra, "budget": {"budget": 5, "cap": "7"}}),
    );

    assert!(result.is_valid());
    assert_eq!(result.record_json()["experimental"], extra);
    assert_eq!(result.record_json()["budget"]["cap"], json!("7"));

    let mut warned = paths(&result.warnings);
    warned.sort();
    assert_eq!(warned, vec!["budget.cap", "experimental"]);
    assert!(result
        .warnings
        .iter()
        .all(|w| w.error == FieldError::UnknownField));
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_search_term_report_row() {
    let result = run(
        "search_term_reports",
        json!({"campaignId": "123", "date": "2024-02-09", "cost": 10.5}),
    );

    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
    assert_eq!(result.record["cost"], NormalizedValue::Number(serde_json::Number::from_f64(10.5).unwrap()));
    assert_eq!(
        result.record["date"],
        NormalizedValue::Date(NaiveDate::from_ymd_opt(2024, 2, 9).unwrap())
    );
}

#[test]
fn test_report_metrics_from_strings() {
    let result = run(
        "search_term_reports",
        json!({
            "campaignId": "123",
            "date": "20240209",
            "impressions": "1500",
            "clicks": "12",
            "cost": "4.37"
        }),
    );

    assert!(result.is_valid());
    let record = result.record_json();
    assert_eq!(record["date"], json!("2024-02-09"));
    assert_eq!(record["impressions"], json!(1500));
    assert_eq!(record["clicks"], json!(12));
    assert_eq!(record["cost"], json!(4.37));
}

#[test]
fn test_invalid_report_date_rejects() {
    let result = run(
        "search_term_reports",
        json!({"campaignId": "123", "date": "2024-13-01"}),
    );
    assert!(!result.is_valid());
    assert!(matches!(
        result.errors[0].error,
        FieldError::InvalidFormat {
            format: Format::Date,
            ..
        }
    ));
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_date_time_round_trip() {
    let result = run(
        "targets",
        json!({"targetId": "5", "lastUpdatedDateTime": "2024-02-09T10:30:00.123456789Z"}),
    );
    assert!(result.is_valid());
    assert_eq!(
        result.record_json()["lastUpdatedDateTime"],
        json!("2024-02-09T10:30:00.123456789Z")
    );
}

#[test]
fn test_validation_is_idempotent() {
    let raw = json!({
        "campaignId": 42,
        "state": "ENABLED",
        "startDate": "20240101",
        "budget": {"budget": "100", "budgetType": "DAILY", "currencyCode": "USD"},
        "dynamicBidding": {
            "placementBidding": [{"placement": "PLACEMENT_TOP", "percentage": "15"}]
        },
        "extendedData": {"lastUpdateDateTime": "2024-02-09 08:00:00"},
        "unexpected": {"kept": true}
    });

    let first = run("campaigns", raw);
    let second = run("campaigns", first.record_json());

    assert_eq!(first.record, second.record);
    assert_eq!(first.warnings, second.warnings);
    assert!(second.is_valid());
}

#[test_case(1_707_474_600_000_i64; "in range")]
#[test_case(253_402_300_799_000_i64; "last second of year 9999")]
#[test_case(1_000_000_000_000_000_i64; "year 33658")]
fn test_epoch_millis_revalidates_identically(millis: i64) {
    let first = run(
        "targets",
        json!({"targetId": "5", "lastUpdatedDateTime": millis}),
    );
    let second = run("targets", first.record_json());

    assert!(first.is_valid() && second.is_valid());
    assert_eq!(paths(&first.warnings), paths(&second.warnings));
    assert_eq!(first.record_json(), second.record_json());
}

#[test]
fn test_epoch_millis_beyond_year_9999_warns() {
    let result = run(
        "targets",
        json!({"targetId": "5", "lastUpdatedDateTime": 1_000_000_000_000_000_i64}),
    );
    assert_eq!(paths(&result.warnings), vec!["lastUpdatedDateTime"]);
    assert!(matches!(
        result.warnings[0].error,
        FieldError::InvalidFormat {
            format: Format::DateTime,
            ..
        }
    ));
    assert_eq!(
        result.record_json()["lastUpdatedDateTime"],
        json!(1_000_000_000_000_000_i64)
    );
}

#[test]
fn test_issue_report_serialization() {
    let result = run("ad_groups", json!({"adGroupId": "7", "bid": {}}));
    let report = serde_json::to_value(&result.warnings[0]).unwrap();
    assert_eq!(
        report,
        json!({
            "path": "bid.currencyCode",
            "severity": "warning",
            "code": "missing_required_field",
            "message": "required field is missing or null"
        })
    );
}

#[test]
fn test_record_validator_batch() {
    let validator = RecordValidator::for_stream(&registry(), "targets").unwrap();
    assert_eq!(validator.stream(), "targets");

    let results = validator.validate_all(&[
        json!({"targetId": "1"}),
        json!({"negative": true}),
        json!({"targetId": "3", "negative": "false"}),
    ]);

    let valid: Vec<bool> = results.iter().map(ValidationResult::is_valid).collect();
    assert_eq!(valid, vec![true, false, true]);
    assert_eq!(results[2].record["negative"], NormalizedValue::Bool(false));
}
