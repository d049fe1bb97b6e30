//! Stream schema documents embedded in the binary

/// Shared vocabulary definitions referenced through `$ref`
pub const DEFINITIONS: &str = include_str!("../../schemas/definitions.json");

/// Built-in stream schemas, keyed by stream name
pub const BUILTIN_SCHEMAS: &[(&str, &str)] = &[
    // Entities
    ("campaigns", include_str!("../../schemas/campaigns.json")),
    ("ad_groups", include_str!("../../schemas/ad_groups.json")),
    ("ads", include_str!("../../schemas/ads.json")),
    ("targets", include_str!("../../schemas/targets.json")),
    // Reports
    (
        "search_term_reports",
        include_str!("../../schemas/search_term_reports.json"),
    ),
    (
        "advertised_product_reports",
        include_str!("../../schemas/advertised_product_reports.json"),
    ),
    (
        "purchased_product_reports",
        include_str!("../../schemas/purchased_product_reports.json"),
    ),
    (
        "gross_and_invalid_traffic_reports",
        include_str!("../../schemas/gross_and_invalid_traffic_reports.json"),
    ),
    (
        "sponsored_summary_reports",
        include_str!("../../schemas/sponsored_summary_reports.json"),
    ),
];
