//! Schema registry tests

use super::*;
use crate::error::Error;
use serde_json::json;
use std::sync::Arc;

fn registry() -> SchemaRegistry {
    SchemaRegistry::builtin().unwrap()
}

fn definitions() -> serde_json::Value {
    json!({
        "definitions": {
            "Color": { "type": "string", "enum": ["RED", "GREEN"] }
        }
    })
}

// ============================================================================
// Built-in schemas
// ============================================================================

#[test]
fn test_builtin_schemas_parse() {
    let registry = registry();
    assert_eq!(registry.len(), BUILTIN_SCHEMAS.len());

    let names: Vec<&str> = registry.stream_names().collect();
    assert_eq!(
        names,
        vec![
            "ad_groups",
            "ads",
            "advertised_product_reports",
            "campaigns",
            "gross_and_invalid_traffic_reports",
            "purchased_product_reports",
            "search_term_reports",
            "sponsored_summary_reports",
            "targets",
        ]
    );
}

#[test]
fn test_required_fields_have_properties() {
    let registry = registry();
    for name in registry.stream_names() {
        let schema = registry.get_schema(name).unwrap();
        assert!(!schema.required().is_empty(), "{name} has no required fields");
        for field in schema.required() {
            assert!(
                schema.get_property(field).is_some(),
                "{name}.{field} is required but not declared"
            );
        }
    }
}

#[test]
fn test_report_schemas_require_campaign_and_date() {
    let registry = registry();
    for name in [
        "search_term_reports",
        "advertised_product_reports",
        "purchased_product_reports",
        "gross_and_invalid_traffic_reports",
        "sponsored_summary_reports",
    ] {
        let schema = registry.get_schema(name).unwrap();
        assert!(schema.is_required("campaignId"), "{name}");
        assert!(schema.is_required("date"), "{name}");
        assert_eq!(
            schema.get_property("date").unwrap().format(),
            Some(Format::Date),
            "{name}"
        );
    }
}

#[test]
fn test_unknown_stream() {
    let registry = registry();
    let err = registry.get_schema("keywords").unwrap_err();
    assert!(matches!(err, Error::UnknownStream { ref stream } if stream == "keywords"));
    assert!(!registry.contains("keywords"));
}

#[test]
fn test_shared_registry_is_published_once() {
    let first = SchemaRegistry::shared().unwrap();
    let second = SchemaRegistry::shared().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

// ============================================================================
// Shared vocabularies
// ============================================================================

#[test]
fn test_vocabulary_shared_across_streams() {
    let registry = registry();

    let campaigns = registry.get_schema("campaigns").unwrap();
    let ad_groups = registry.get_schema("ad_groups").unwrap();

    let a = campaigns.get_property("state").unwrap().vocabulary().unwrap();
    let b = ad_groups.get_property("state").unwrap().vocabulary().unwrap();
    assert!(Arc::ptr_eq(a, b));
    assert_eq!(a.name(), Some("EntityState"));
    assert!(Arc::ptr_eq(a, registry.vocabulary("EntityState").unwrap()));
}

#[test]
fn test_currency_vocabulary_shared_with_nested_field() {
    let registry = registry();
    let ad_groups = registry.get_schema("ad_groups").unwrap();

    let bid = ad_groups.get_property("bid").unwrap().object().unwrap();
    let nested = bid.get("currencyCode").unwrap().vocabulary().unwrap();

    assert!(Arc::ptr_eq(nested, registry.vocabulary("CurrencyCode").unwrap()));
    assert!(nested.contains("USD"));
    assert!(bid.is_required("currencyCode"));
    assert!(!ad_groups.is_required("bid"));
}

#[test]
fn test_ref_with_sibling_type_keeps_nullability() {
    let registry = registry();
    let campaigns = registry.get_schema("campaigns").unwrap();

    let state = campaigns.get_property("state").unwrap();
    assert!(state.is_nullable());
    assert!(state.types.contains(JsonType::String));

    let items = campaigns
        .get_property("deliveryReasons")
        .unwrap()
        .items()
        .unwrap();
    assert!(!items.is_nullable());
    assert!(items.vocabulary().unwrap().contains("CAMPAIGN_PAUSED"));
}

#[test]
fn test_deep_nesting() {
    let registry = registry();
    let ads = registry.get_schema("ads").unwrap();

    let landing_page = ads
        .get_property("creative")
        .and_then(FieldSpec::object)
        .and_then(|creative| creative.get("cards"))
        .and_then(FieldSpec::items)
        .and_then(FieldSpec::object)
        .and_then(|card| card.get("landingPage"))
        .and_then(FieldSpec::object)
        .unwrap();

    assert!(landing_page.is_required("landingPageType"));
    assert!(landing_page
        .get("landingPageType")
        .unwrap()
        .vocabulary()
        .is_some());
}

#[test]
fn test_document_refs_inlined() {
    let registry = registry();
    let campaigns = registry.get_schema("campaigns").unwrap();

    let text = campaigns.document().to_string();
    assert!(!text.contains("$ref"));

    let state = &campaigns.document()["properties"]["state"];
    assert_eq!(state["type"], json!(["string", "null"]));
    assert_eq!(state["enum"], json!(["ENABLED", "PAUSED", "ARCHIVED"]));
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_minimal_schema() {
    let registry = SchemaRegistry::from_documents(
        &definitions(),
        [(
            "things".to_string(),
            json!({
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": { "type": "string" },
                    "color": { "type": ["string", "null"], "$ref": "#/definitions/Color" },
                    "size": { "type": ["integer", "null"] },
                    "seen": { "type": ["string", "null"], "format": "date-time" },
                    "labels": { "type": ["array", "null"], "items": { "type": "string" } }
                }
            }),
        )],
    )
    .unwrap();

    let schema = registry.get_schema("things").unwrap();
    assert_eq!(schema.name(), "things");
    assert_eq!(schema.required(), ["id".to_string()]);

    let size = schema.get_property("size").unwrap();
    assert_eq!(size.types, TypeSet::nullable(JsonType::Integer));
    assert!(matches!(size.kind, FieldKind::Scalar { format: None }));

    assert_eq!(
        schema.get_property("seen").unwrap().format(),
        Some(Format::DateTime)
    );
    assert!(schema.get_property("labels").unwrap().items().is_some());
    assert_eq!(
        schema.get_property("color").unwrap().vocabulary().unwrap().name(),
        Some("Color")
    );
}

#[test]
fn test_null_enum_literal_makes_field_nullable() {
    let registry = SchemaRegistry::from_documents(
        &definitions(),
        [(
            "things".to_string(),
            json!({
                "type": "object",
                "properties": {
                    "mode": { "type": "string", "enum": ["A", "B", null] }
                }
            }),
        )],
    )
    .unwrap();

    let mode = registry.get_schema("things").unwrap().get_property("mode").unwrap();
    assert!(mode.is_nullable());
    assert_eq!(mode.vocabulary().unwrap().len(), 2);
}

fn parse_error(document: serde_json::Value) -> String {
    let err = SchemaRegistry::from_documents(&definitions(), [("things".to_string(), document)])
        .unwrap_err();
    assert!(matches!(err, Error::SchemaParse { .. }), "{err:?}");
    err.to_string()
}

#[test]
fn test_reject_unknown_type() {
    let msg = parse_error(json!({
        "type": "object",
        "properties": { "id": { "type": "text" } }
    }));
    assert!(msg.contains("unknown type"));
}

#[test]
fn test_reject_unknown_format() {
    let msg = parse_error(json!({
        "type": "object",
        "properties": { "id": { "type": "string", "format": "uuid" } }
    }));
    assert!(msg.contains("unsupported format 'uuid'"));
}

#[test]
fn test_reject_unresolved_ref() {
    let msg = parse_error(json!({
        "type": "object",
        "properties": { "tone": { "type": "string", "$ref": "#/definitions/Tone" } }
    }));
    assert!(msg.contains("unresolved $ref"));
}

#[test]
fn test_reject_required_without_property() {
    let msg = parse_error(json!({
        "type": "object",
        "required": ["id"],
        "properties": { "name": { "type": "string" } }
    }));
    assert!(msg.contains("required field 'id'"));
}

#[test]
fn test_reject_non_string_enum_literal() {
    let msg = parse_error(json!({
        "type": "object",
        "properties": { "level": { "type": "integer", "enum": [1, 2] } }
    }));
    assert!(msg.contains("is not a string"));
}

#[test]
fn test_reject_non_object_root() {
    let msg = parse_error(json!({
        "type": "array",
        "properties": {}
    }));
    assert!(msg.contains("top-level type"));
}

#[test]
fn test_reject_missing_properties() {
    let msg = parse_error(json!({ "type": "object" }));
    assert!(msg.contains("missing 'properties'"));
}

#[test]
fn test_reject_duplicate_stream() {
    let doc = json!({ "type": "object", "properties": {} });
    let err = SchemaRegistry::from_documents(
        &definitions(),
        [("things".to_string(), doc.clone()), ("things".to_string(), doc)],
    )
    .unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn test_reject_invalid_json_source() {
    let err = SchemaRegistry::from_sources(r#"{"definitions": {}}"#, &[("things", "{nope")])
        .unwrap_err();
    assert!(matches!(err, Error::SchemaParse { ref stream, .. } if stream == "things"));
}

// ============================================================================
// Type sets
// ============================================================================

#[test]
fn test_type_set_accepts() {
    let integer = TypeSet::nullable(JsonType::Integer);
    assert!(integer.accepts(&json!(42)));
    assert!(integer.accepts(&json!(42.0)));
    assert!(integer.accepts(&json!(null)));
    assert!(!integer.accepts(&json!(42.5)));
    assert!(!integer.accepts(&json!("42")));

    let number = TypeSet::single(JsonType::Number);
    assert!(number.accepts(&json!(7)));
    assert!(number.accepts(&json!(7.25)));
    assert!(!number.accepts(&json!(null)));
}

#[test]
fn test_type_set_display() {
    let types: TypeSet = [JsonType::Null, JsonType::String].into_iter().collect();
    assert_eq!(types.to_string(), "string|null");
    assert_eq!(format!("{types:?}"), "TypeSet(string|null)");
}
