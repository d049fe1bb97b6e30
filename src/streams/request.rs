//! Request construction per stream

use super::catalog::{ReportConfig, StreamDefinition, StreamKind, REPORT_MEDIA_TYPE, REPORT_PATH};
use crate::http::RequestConfig;
use crate::pagination::PageRequest;
use crate::types::{AdProduct, JsonObject, JsonValue, Method};
use chrono::NaiveDate;
use serde_json::json;

/// Entity states requested from list endpoints
pub const ENTITY_STATES: &str = "enabled,paused,archived";

/// Parameters shared by all requests of one sync
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Ad product to list entities for
    pub ad_product: AdProduct,
    /// First report day
    pub start_date: NaiveDate,
    /// Last report day
    pub end_date: NaiveDate,
    /// User-Agent sent with API requests
    pub user_agent: String,
}

/// A fully resolved request template for one stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    /// HTTP method
    pub method: Method,
    /// Path below the region base URL
    pub path: String,
    /// Vendor media type
    pub media_type: &'static str,
    /// JSON body without paging fields (POST only)
    pub body: Option<JsonObject>,
    /// User-Agent header
    pub user_agent: String,
}

impl StreamRequest {
    /// Build the request template for a stream
    pub fn for_stream(stream: &StreamDefinition, ctx: &RequestContext) -> Self {
        match &stream.kind {
            StreamKind::Entity(endpoints) => {
                let path = endpoints.path(ctx.ad_product).to_string();
                if ctx.ad_product == AdProduct::SponsoredDisplay {
                    return Self {
                        method: Method::GET,
                        path,
                        media_type: endpoints.media_type,
                        body: None,
                        user_agent: ctx.user_agent.clone(),
                    };
                }

                let mut body = JsonObject::new();
                body.insert("adProduct".into(), json!(ctx.ad_product.as_str()));
                body.insert("state".into(), json!(ENTITY_STATES));
                Self {
                    method: Method::POST,
                    path,
                    media_type: endpoints.media_type,
                    body: Some(body),
                    user_agent: ctx.user_agent.clone(),
                }
            }
            StreamKind::Report(report) => Self {
                method: Method::POST,
                path: REPORT_PATH.to_string(),
                media_type: REPORT_MEDIA_TYPE,
                body: Some(report_body(stream.name, report, ctx)),
                user_agent: ctx.user_agent.clone(),
            },
        }
    }

    /// Request for one page
    pub fn page(&self, page: &PageRequest) -> RequestConfig {
        let config = RequestConfig::new()
            .header("Content-Type", self.media_type)
            .header("Accept", self.media_type)
            .header("User-Agent", self.user_agent.as_str());

        match &self.body {
            Some(body) => {
                let mut body = body.clone();
                page.apply_to_body(&mut body);
                config.json(JsonValue::Object(body))
            }
            None => page
                .query_params()
                .into_iter()
                .fold(config, |config, (key, value)| config.query(key, value)),
        }
    }
}

fn report_body(name: &str, report: &ReportConfig, ctx: &RequestContext) -> JsonObject {
    let start = ctx.start_date.format("%Y-%m-%d").to_string();
    let end = ctx.end_date.format("%Y-%m-%d").to_string();

    let mut configuration = JsonObject::new();
    configuration.insert("adProduct".into(), json!(report.ad_product.as_str()));
    configuration.insert("groupBy".into(), json!(report.group_by));
    configuration.insert("reportTypeId".into(), json!(report.report_type));
    configuration.insert("timeUnit".into(), json!("DAILY"));
    configuration.insert("format".into(), json!(report.format));
    if !report.columns.is_empty() {
        configuration.insert("columns".into(), json!(report.columns));
    }

    let mut body = JsonObject::new();
    body.insert("name".into(), json!(format!("{name} {start}-{end}")));
    body.insert("startDate".into(), json!(start));
    body.insert("endDate".into(), json!(end));
    body.insert("configuration".into(), JsonValue::Object(configuration));
    body
}
