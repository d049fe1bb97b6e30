//! Syncable stream definitions

use crate::types::AdProduct;

/// Entity list endpoints for each ad product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityEndpoints {
    /// Sponsored Products list path (POST)
    pub sponsored_products: &'static str,
    /// Sponsored Brands list path (POST)
    pub sponsored_brands: &'static str,
    /// Sponsored Display path (GET)
    pub sponsored_display: &'static str,
    /// Vendor media type for Content-Type and Accept
    pub media_type: &'static str,
}

impl EntityEndpoints {
    /// Path for an ad product
    pub fn path(&self, product: AdProduct) -> &'static str {
        match product {
            AdProduct::SponsoredProducts => self.sponsored_products,
            AdProduct::SponsoredBrands => self.sponsored_brands,
            AdProduct::SponsoredDisplay => self.sponsored_display,
        }
    }
}

/// Report request settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportConfig {
    /// `configuration.reportTypeId`
    pub report_type: &'static str,
    /// `configuration.adProduct`; report types are tied to one ad product
    pub ad_product: AdProduct,
    /// `configuration.groupBy`
    pub group_by: &'static [&'static str],
    /// `configuration.format`
    pub format: &'static str,
    /// Explicit column list, when the report requires one
    pub columns: &'static [&'static str],
}

/// How a stream is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Paged entity listing
    Entity(EntityEndpoints),
    /// Report creation
    Report(ReportConfig),
}

/// Static description of a syncable stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDefinition {
    /// Stream name, also the schema name
    pub name: &'static str,
    /// Primary key properties
    pub primary_keys: &'static [&'static str],
    /// Replication key, if any
    pub replication_key: Option<&'static str>,
    /// JSONPath of the records in a response
    pub records_path: &'static str,
    /// Fetch strategy
    pub kind: StreamKind,
}

impl StreamDefinition {
    /// Check if this is a report stream
    pub fn is_report(&self) -> bool {
        matches!(self.kind, StreamKind::Report(_))
    }

    /// Properties that survive any selection
    pub fn key_properties(&self) -> impl Iterator<Item = &'static str> {
        self.primary_keys
            .iter()
            .copied()
            .chain(self.replication_key)
    }
}

/// Media type for report creation requests
pub const REPORT_MEDIA_TYPE: &str = "application/vnd.createasyncreport.v3+json";

/// Report creation path
pub const REPORT_PATH: &str = "/reporting/reports";

const ADVERTISED_PRODUCT_COLUMNS: &[&str] = &[
    "date",
    "campaignName",
    "campaignId",
    "adGroupName",
    "adGroupId",
    "advertisedAsin",
    "advertisedSku",
    "impressions",
    "clicks",
    "cost",
    "purchases14d",
    "sales14d",
    "unitsSoldClicks14d",
];

/// All syncable streams, in sync order
pub const STREAMS: &[StreamDefinition] = &[
    StreamDefinition {
        name: "campaigns",
        primary_keys: &["campaignId"],
        replication_key: None,
        records_path: "$.campaigns[*]",
        kind: StreamKind::Entity(EntityEndpoints {
            sponsored_products: "/sp/campaigns/list",
            sponsored_brands: "/sb/v4/campaigns/list",
            sponsored_display: "/sd/campaigns",
            media_type: "application/vnd.spcampaign.v3+json",
        }),
    },
    StreamDefinition {
        name: "ad_groups",
        primary_keys: &["adGroupId"],
        replication_key: None,
        records_path: "$.adGroups[*]",
        kind: StreamKind::Entity(EntityEndpoints {
            sponsored_products: "/sp/adGroups/list",
            sponsored_brands: "/sb/v4/adGroups/list",
            sponsored_display: "/sd/adGroups",
            media_type: "application/vnd.spadGroup.v3+json",
        }),
    },
    StreamDefinition {
        name: "targets",
        primary_keys: &["targetId"],
        replication_key: Some("lastUpdatedDateTime"),
        records_path: "$.targetingClauses[*]",
        kind: StreamKind::Entity(EntityEndpoints {
            sponsored_products: "/sp/targets/list",
            sponsored_brands: "/sb/targets/list",
            sponsored_display: "/sd/targets",
            media_type: "application/vnd.sptargetingClause.v3+json",
        }),
    },
    StreamDefinition {
        name: "ads",
        primary_keys: &["adId"],
        replication_key: None,
        records_path: "$.productAds[*]",
        kind: StreamKind::Entity(EntityEndpoints {
            sponsored_products: "/sp/productAds/list",
            sponsored_brands: "/sb/v4/ads/list",
            sponsored_display: "/sd/productAds",
            media_type: "application/vnd.spproductAd.v3+json",
        }),
    },
    StreamDefinition {
        name: "search_term_reports",
        primary_keys: &["campaignId", "date", "searchTerm"],
        replication_key: Some("date"),
        records_path: "$.rows[*]",
        kind: StreamKind::Report(ReportConfig {
            report_type: "searchTerm",
            ad_product: AdProduct::SponsoredProducts,
            group_by: &["searchTerm", "campaignId", "adGroupId"],
            format: "JSON",
            columns: &[],
        }),
    },
    StreamDefinition {
        name: "advertised_product_reports",
        primary_keys: &["campaignId", "date", "advertisedAsin"],
        replication_key: Some("date"),
        records_path: "$.rows[*]",
        kind: StreamKind::Report(ReportConfig {
            report_type: "spAdvertisedProduct",
            ad_product: AdProduct::SponsoredProducts,
            group_by: &["advertiser"],
            format: "GZIP_JSON",
            columns: ADVERTISED_PRODUCT_COLUMNS,
        }),
    },
    StreamDefinition {
        name: "purchased_product_reports",
        primary_keys: &["campaignId", "date", "asin"],
        replication_key: Some("date"),
        records_path: "$.rows[*]",
        kind: StreamKind::Report(ReportConfig {
            report_type: "purchasedProduct",
            ad_product: AdProduct::SponsoredProducts,
            group_by: &["asin", "campaignId", "adGroupId"],
            format: "JSON",
            columns: &[],
        }),
    },
    StreamDefinition {
        name: "gross_and_invalid_traffic_reports",
        primary_keys: &["campaignId", "date"],
        replication_key: Some("date"),
        records_path: "$.rows[*]",
        kind: StreamKind::Report(ReportConfig {
            report_type: "grossAndInvalidTraffic",
            ad_product: AdProduct::SponsoredProducts,
            group_by: &["campaignId", "adGroupId"],
            format: "JSON",
            columns: &[],
        }),
    },
];

/// Look up a syncable stream by name
pub fn find_stream(name: &str) -> Option<&'static StreamDefinition> {
    STREAMS.iter().find(|s| s.name == name)
}
