//! Tests for decoder module

use super::*;
use crate::error::Error;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;

fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

// ============================================================================
// Compression Tests
// ============================================================================

#[test]
fn test_detect_identity() {
    assert_eq!(Compression::detect(None, b"{}"), Compression::Identity);
    assert_eq!(
        Compression::detect(Some("identity"), b"{}"),
        Compression::Identity
    );
}

#[test]
fn test_detect_gzip_from_header() {
    assert_eq!(Compression::detect(Some("gzip"), b"{}"), Compression::Gzip);
    assert_eq!(
        Compression::detect(Some("br, GZIP"), b"{}"),
        Compression::Gzip
    );
}

#[test]
fn test_detect_gzip_from_magic() {
    let body = gzip(b"{}");
    assert_eq!(Compression::detect(None, &body), Compression::Gzip);
}

#[test]
fn test_decompress_roundtrip() {
    let raw = br#"{"rows":[{"campaignId":"1"}]}"#;
    let out = decompress(&gzip(raw), Some("gzip")).unwrap();
    assert_eq!(out, raw.to_vec());
}

#[test]
fn test_decompress_already_inflated() {
    let raw = br#"{"rows":[]}"#;
    let out = decompress(raw, Some("gzip")).unwrap();
    assert_eq!(out, raw.to_vec());
}

#[test]
fn test_decompress_corrupt_gzip() {
    let mut body = gzip(b"{\"rows\":[]}");
    body.truncate(6);
    let err = decompress(&body, None).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

// ============================================================================
// JsonDecoder Tests
// ============================================================================

fn decode(decoder: &JsonDecoder, body: &[u8]) -> crate::error::Result<Vec<serde_json::Value>> {
    let raw = decoder.parse(body, None)?;
    decoder.extract_records(&raw)
}

#[test]
fn test_json_decoder_wildcard_path() {
    let decoder = JsonDecoder::with_path("$.campaigns[*]");
    let body = br#"{
        "campaigns": [{"campaignId": "1"}, {"campaignId": "2"}],
        "pagination": {"totalResults": 2}
    }"#;

    let records = decode(&decoder, body).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["campaignId"], "1");
    assert_eq!(records[1]["campaignId"], "2");
}

#[test]
fn test_json_decoder_empty_and_missing_collection() {
    let decoder = JsonDecoder::with_path("$.adGroups[*]");
    assert!(decode(&decoder, br#"{"adGroups": []}"#).unwrap().is_empty());
    assert!(decode(&decoder, br#"{"other": 1}"#).unwrap().is_empty());
}

#[test]
fn test_json_decoder_simple_path() {
    let decoder = JsonDecoder::with_path("$.data.items");
    let body = br#"{"data": {"items": [{"id": 1}, {"id": 2}, {"id": 3}]}}"#;
    assert_eq!(decode(&decoder, body).unwrap().len(), 3);

    let decoder = JsonDecoder::with_path("data.items[1]");
    assert_eq!(decode(&decoder, body).unwrap(), vec![json!({"id": 2})]);
}

#[test]
fn test_json_decoder_root_path() {
    let decoder = JsonDecoder::with_path("$");
    assert_eq!(decode(&decoder, br#"[{"id": 1}, {"id": 2}]"#).unwrap().len(), 2);
    assert_eq!(decode(&decoder, br#"{"id": 1}"#).unwrap(), vec![json!({"id": 1})]);
}

#[test]
fn test_json_decoder_gzip_body() {
    let decoder = JsonDecoder::with_path("$.rows[*]");
    let body = gzip(br#"{"rows": [{"campaignId": "9", "date": "2024-02-09"}]}"#);

    let raw = decoder.parse(&body, Some("gzip")).unwrap();
    let records = decoder.extract_records(&raw).unwrap();
    assert_eq!(records, vec![json!({"campaignId": "9", "date": "2024-02-09"})]);
}

#[test]
fn test_json_decoder_invalid_json() {
    let decoder = JsonDecoder::with_path("$.rows[*]");
    let err = decoder.parse(b"not json", None).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn test_json_decoder_invalid_jsonpath() {
    let decoder = JsonDecoder::with_path("$.[*");
    let err = decode(&decoder, br#"{"a": []}"#).unwrap_err();
    assert!(matches!(err, Error::JsonPath { .. }));
}

#[test]
fn test_parse_keeps_full_document() {
    let decoder = JsonDecoder::with_path("$.campaigns[*]");
    let raw = decoder
        .parse(br#"{"campaigns": [], "nextToken": "t"}"#, None)
        .unwrap();
    assert_eq!(raw["nextToken"], "t");
}
