//! API contract types for the Ops Manager public API

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use validator::Validate;

use crate::error::{ApiContractError, ApiContractResult};
use crate::validation;

/// Path prefix of the versioned public API, joined onto the endpoint.
pub const API_PREFIX: &str = "api/public/v1.0/";

/// Endpoint used when the caller does not name an Ops Manager installation.
pub const DEFAULT_ENDPOINT: &str = "https://cloud.mongodb.com/";

pub const DEFAULT_PAGE_NUM: u32 = 1;
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 100;

/// Any decoded response body: a resource, a paginated wrapper or an error document.
pub type ApiDocument = serde_json::Value;

/// HTTP verbs used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the versioned API base URL from an endpoint.
///
/// A missing trailing `/` is appended first so that any path already on the
/// endpoint (e.g. an Ops Manager served under `/mms`) is kept.
pub fn api_base_url(endpoint: &str) -> ApiContractResult<Url> {
    validation::require_text(endpoint, "endpoint")?;

    let mut normalized = endpoint.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    let endpoint_url = Url::parse(&normalized)
        .map_err(|e| ApiContractError::invalid_url(&normalized, e.to_string()))?;
    if endpoint_url.cannot_be_a_base() {
        return Err(ApiContractError::invalid_url(
            &normalized,
            "endpoint cannot be used as a base URL",
        ));
    }

    endpoint_url
        .join(API_PREFIX)
        .map_err(|e| ApiContractError::invalid_url(&normalized, e.to_string()))
}

/// Description of one API call, independent of the base URL.
///
/// Path segments are caller-supplied values and literal resource names; each
/// one is percent-encoded on its own when the descriptor is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<ApiDocument>,
}

impl RequestDescriptor {
    pub fn new<I, S>(method: HttpMethod, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Get, segments)
    }

    pub fn post<I, S>(segments: I, body: ApiDocument) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Post, segments).with_body(body)
    }

    pub fn put<I, S>(segments: I, body: ApiDocument) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Put, segments).with_body(body)
    }

    pub fn patch<I, S>(segments: I, body: ApiDocument) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Patch, segments).with_body(body)
    }

    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Delete, segments)
    }

    /// Append a query parameter. Repeated keys are kept in order.
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_page(self, page: &PageQuery) -> Self {
        self.with_query("pageNum", page.page_num)
            .with_query("itemsPerPage", page.items_per_page)
    }

    pub fn with_measurements(mut self, measurements: &MeasurementQuery) -> Self {
        self.query.extend(measurements.query_pairs());
        self
    }

    pub fn with_body(mut self, body: ApiDocument) -> Self {
        self.body = Some(body);
        self
    }

    /// Resolve the descriptor against the API base URL.
    pub fn resolve(&self, base: &Url) -> ApiContractResult<Url> {
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ApiContractError::invalid_url(base.as_str(), "cannot be a base URL")
            })?;
            path.pop_if_empty();
            path.extend(self.segments.iter().map(String::as_str));
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Resolve into the form handed to a transport.
    pub fn prepare(self, base: &Url) -> ApiContractResult<PreparedRequest> {
        let url = self.resolve(base)?;
        Ok(PreparedRequest {
            method: self.method,
            url,
            body: self.body,
        })
    }
}

/// A fully resolved request, ready to be authenticated and sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub body: Option<ApiDocument>,
}

impl PreparedRequest {
    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// All values for a query key, in order.
    pub fn query_values(&self, key: &str) -> Vec<String> {
        self.url
            .query_pairs()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .collect()
    }

    /// Request target (path plus query) as it appears on the request line.
    pub fn request_target(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }
}

/// Single-page selection for collection endpoints.
///
/// The client never follows up with further pages on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Validate)]
pub struct PageQuery {
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub page_num: u32,
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub items_per_page: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_num: DEFAULT_PAGE_NUM,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl PageQuery {
    pub fn new(page_num: u32, items_per_page: u32) -> Self {
        Self {
            page_num,
            items_per_page,
        }
    }

    pub fn page(page_num: u32) -> Self {
        Self {
            page_num,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ApiContractResult<()> {
        Validate::validate(self)?;
        Ok(())
    }
}

/// Time range of a measurement request. `period` and `start`/`end` never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasurementRange {
    /// ISO-8601 duration ending now, e.g. `P2D`.
    Period(String),
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Query for the measurement endpoints of hosts, disks and databases.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct MeasurementQuery {
    /// ISO-8601 duration, e.g. `PT1M`.
    #[validate(custom(function = "validation::iso8601_duration"))]
    pub granularity: String,
    pub range: MeasurementRange,
    /// Selected series; empty means every series the endpoint offers.
    #[validate(custom(function = "validation::metric_names"))]
    pub metrics: Vec<String>,
}

impl MeasurementQuery {
    pub fn for_period(granularity: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            granularity: granularity.into(),
            range: MeasurementRange::Period(period.into()),
            metrics: Vec::new(),
        }
    }

    pub fn between(
        granularity: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            granularity: granularity.into(),
            range: MeasurementRange::Between { start, end },
            metrics: Vec::new(),
        }
    }

    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metrics.push(metric.into());
        self
    }

    pub fn with_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics.extend(metrics.into_iter().map(Into::into));
        self
    }

    pub fn validate(&self) -> ApiContractResult<()> {
        Validate::validate(self)
            .map_err(|errors| ApiContractError::from_validation(&errors, Some("measurements")))?;
        match &self.range {
            MeasurementRange::Period(period) => {
                validation::require_iso8601_duration(period, "measurements.period")?
            }
            MeasurementRange::Between { start, end } => {
                if start >= end {
                    return Err(ApiContractError::invalid_argument(
                        "measurements.start",
                        "must be earlier than measurements.end",
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("granularity".to_string(), self.granularity.clone())];
        match &self.range {
            MeasurementRange::Period(period) => pairs.push(("period".to_string(), period.clone())),
            MeasurementRange::Between { start, end } => {
                pairs.push(("start".to_string(), format_timestamp(start)));
                pairs.push(("end".to_string(), format_timestamp(end)));
            }
        }
        pairs.extend(self.metrics.iter().map(|m| ("m".to_string(), m.clone())));
        pairs
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Granularity and period accepted by the retired metric-by-id endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyMetricWindow {
    /// `MINUTE`, `HOUR`, `DAY` and so on.
    pub granularity: String,
    pub period: String,
}

impl Default for LegacyMetricWindow {
    fn default() -> Self {
        Self {
            granularity: "MINUTE".to_string(),
            period: "P2D".to_string(),
        }
    }
}

impl LegacyMetricWindow {
    pub fn new(granularity: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            granularity: granularity.into(),
            period: period.into(),
        }
    }

    pub fn validate(&self) -> ApiContractResult<()> {
        validation::require_text(&self.granularity, "granularity")?;
        validation::require_iso8601_duration(&self.period, "period")
    }
}

/// Agent categories registered against a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentType {
    Monitoring,
    Backup,
    Automation,
}

impl AgentType {
    /// Order in which the composite agent listing concatenates categories.
    pub const ALL: [AgentType; 3] = [AgentType::Monitoring, AgentType::Backup, AgentType::Automation];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Monitoring => "MONITORING",
            AgentType::Backup => "BACKUP",
            AgentType::Automation => "AUTOMATION",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    Open,
    Closed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Open => "OPEN",
            AlertStatus::Closed => "CLOSED",
        }
    }
}

/// Desired state of an alert configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertConfigState {
    Enabled,
    Disabled,
}

impl AlertConfigState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, AlertConfigState::Enabled)
    }
}

impl std::str::FromStr for AlertConfigState {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(AlertConfigState::Enabled),
            "disabled" => Ok(AlertConfigState::Disabled),
            other => Err(ApiContractError::invalid_argument(
                "alert_state",
                format!("must be `enabled` or `disabled`, got `{other}`"),
            )),
        }
    }
}

/// Time until which an alert stays acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcknowledgeUntil(DateTime<FixedOffset>);

impl AcknowledgeUntil {
    /// Accept ISO-8601 text: RFC 3339, or a date-time or date without an
    /// offset, which is taken as UTC.
    pub fn parse(text: &str) -> ApiContractResult<Self> {
        validation::require_text(text, "acknowledge_until")?;
        let text = text.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self(ts));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Self::from(naive.and_utc()));
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(|date| Self::from(date.and_time(chrono::NaiveTime::MIN).and_utc()))
            .map_err(|_| {
                ApiContractError::invalid_argument(
                    "acknowledge_until",
                    format!("must be an ISO-8601 timestamp, got `{text}`"),
                )
            })
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for AcknowledgeUntil {
    fn from(ts: DateTime<Tz>) -> Self {
        Self(ts.fixed_offset())
    }
}

impl TryFrom<&ApiDocument> for AcknowledgeUntil {
    type Error = ApiContractError;

    fn try_from(value: &ApiDocument) -> Result<Self, Self::Error> {
        match value {
            ApiDocument::String(text) => Self::parse(text),
            other => Err(ApiContractError::invalid_argument(
                "acknowledge_until",
                format!("must be a timestamp or ISO-8601 text, got {}", json_kind(other)),
            )),
        }
    }
}

// ============================================================================
// Response documents
// ============================================================================

/// The `results` array of a paginated collection wrapper.
pub fn results(document: &ApiDocument) -> Option<&Vec<ApiDocument>> {
    document.get("results").and_then(ApiDocument::as_array)
}

/// The `id` of a resource document.
pub fn document_id(document: &ApiDocument) -> Option<&str> {
    document.get("id").and_then(ApiDocument::as_str)
}

/// The service's error code, when the document reports an error.
pub fn error_code(document: &ApiDocument) -> Option<&str> {
    document.get("errorCode").and_then(ApiDocument::as_str)
}

/// Whether the document is an error report rather than a resource.
pub fn is_error_document(document: &ApiDocument) -> bool {
    document.get("errorCode").is_some() || document.get("error").is_some()
}

pub(crate) fn json_kind(value: &ApiDocument) -> &'static str {
    match value {
        ApiDocument::Null => "null",
        ApiDocument::Bool(_) => "a boolean",
        ApiDocument::Number(_) => "a number",
        ApiDocument::String(_) => "text",
        ApiDocument::Array(_) => "an array",
        ApiDocument::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn base() -> Url {
        api_base_url("https://ops.example.com:8080").unwrap()
    }

    #[test]
    fn test_api_base_url_appends_separator_and_prefix() {
        assert_eq!(
            base().as_str(),
            "https://ops.example.com:8080/api/public/v1.0/"
        );
        assert_eq!(
            api_base_url(DEFAULT_ENDPOINT).unwrap().as_str(),
            "https://cloud.mongodb.com/api/public/v1.0/"
        );
    }

    #[test]
    fn test_api_base_url_keeps_endpoint_path() {
        let url = api_base_url("http://example.com/mms").unwrap();
        assert_eq!(url.as_str(), "http://example.com/mms/api/public/v1.0/");
    }

    #[test]
    fn test_api_base_url_rejects_garbage() {
        assert!(api_base_url("").is_err());
        assert!(api_base_url("   ").is_err());
        assert!(matches!(
            api_base_url("not a url"),
            Err(ApiContractError::InvalidUrl { .. })
        ));
        assert!(api_base_url("mailto:ops@example.com").is_err());
    }

    #[test]
    fn test_descriptor_resolves_segments_under_prefix() {
        let url = RequestDescriptor::get(["groups", "g1", "hosts", "h1"])
            .resolve(&base())
            .unwrap();
        assert_eq!(url.path(), "/api/public/v1.0/groups/g1/hosts/h1");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_descriptor_encodes_identifier_segments() {
        let url = RequestDescriptor::get(["groups", "byName", "App Servers/2"])
            .resolve(&base())
            .unwrap();
        assert_eq!(url.path(), "/api/public/v1.0/groups/byName/App%20Servers%2F2");
    }

    #[test]
    fn test_descriptor_keeps_host_port_separator() {
        let url = RequestDescriptor::get(["groups", "g1", "hosts", "byName", "db.example.com:27017"])
            .resolve(&base())
            .unwrap();
        assert_eq!(
            url.path(),
            "/api/public/v1.0/groups/g1/hosts/byName/db.example.com:27017"
        );
    }

    #[test]
    fn test_descriptor_query_keeps_order_and_repeats() {
        let query = MeasurementQuery::for_period("PT1M", "P1D")
            .with_metric("OPCOUNTER_QUERY")
            .with_metric("CONNECTIONS");
        let prepared = RequestDescriptor::get(["groups", "g1", "hosts", "h1", "measurements"])
            .with_measurements(&query)
            .prepare(&base())
            .unwrap();

        assert_eq!(
            prepared.query_pairs(),
            vec![
                ("granularity".to_string(), "PT1M".to_string()),
                ("period".to_string(), "P1D".to_string()),
                ("m".to_string(), "OPCOUNTER_QUERY".to_string()),
                ("m".to_string(), "CONNECTIONS".to_string()),
            ]
        );
        assert_eq!(prepared.query_values("m").len(), 2);
    }

    #[test]
    fn test_between_range_encodes_start_and_end_without_period() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 2, 12, 30, 0).unwrap();
        let pairs = MeasurementQuery::between("PT1H", start, end).query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("granularity".to_string(), "PT1H".to_string()),
                ("start".to_string(), "2024-03-01T00:00:00Z".to_string()),
                ("end".to_string(), "2024-03-02T12:30:00Z".to_string()),
            ]
        );
    }

    #[test]
    fn test_measurement_query_validation() {
        assert!(MeasurementQuery::for_period("PT1M", "P2D").validate().is_ok());
        assert!(MeasurementQuery::for_period("MINUTE", "P2D").validate().is_err());
        assert!(MeasurementQuery::for_period("PT1M", "2 days").validate().is_err());

        let start = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let err = MeasurementQuery::between("PT1M", start, end).validate().unwrap_err();
        assert_eq!(err.parameter(), Some("measurements.start"));

        let err = MeasurementQuery::for_period("PT1M", "P1D")
            .with_metric(" ")
            .validate()
            .unwrap_err();
        assert_eq!(err.parameter(), Some("measurements.metrics"));

        let err = MeasurementQuery::for_period("MINUTE", "P1D").validate().unwrap_err();
        assert_eq!(err.parameter(), Some("measurements.granularity"));
        assert!(err.to_string().contains("ISO-8601 duration"), "{err}");
    }

    #[test]
    fn test_page_query_defaults_and_validation() {
        let page = PageQuery::default();
        assert_eq!(page, PageQuery::new(1, 100));
        assert!(page.validate().is_ok());
        assert_eq!(
            PageQuery::new(0, 10).validate().unwrap_err().parameter(),
            Some("page_num")
        );
        assert_eq!(
            PageQuery::new(1, 0).validate().unwrap_err().parameter(),
            Some("items_per_page")
        );
        assert_eq!(
            PageQuery::new(0, 10).validate().unwrap_err().to_string(),
            "invalid argument `page_num`: must be a positive integer"
        );
    }

    #[test]
    fn test_acknowledge_until_accepts_timestamp_and_text() {
        let ts = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(AcknowledgeUntil::from(ts).to_iso8601(), "2030-01-01T00:00:00Z");

        let parsed = AcknowledgeUntil::parse("2030-01-01T00:00:00-05:00").unwrap();
        assert_eq!(parsed.to_iso8601(), "2030-01-01T00:00:00-05:00");

        let from_doc = AcknowledgeUntil::try_from(&json!("2030-01-01T00:00:00Z")).unwrap();
        assert_eq!(from_doc, AcknowledgeUntil::from(ts));
    }

    #[test]
    fn test_acknowledge_until_text_without_offset_is_utc() {
        let ts = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(AcknowledgeUntil::parse("2030-01-01T00:00:00").unwrap(), AcknowledgeUntil::from(ts));
        assert_eq!(AcknowledgeUntil::parse("2030-01-01").unwrap(), AcknowledgeUntil::from(ts));

        let fractional = AcknowledgeUntil::parse("2030-01-01T12:30:15.250000").unwrap();
        assert_eq!(fractional.to_iso8601(), "2030-01-01T12:30:15.250Z");
    }

    #[test]
    fn test_acknowledge_until_rejects_other_shapes() {
        assert!(AcknowledgeUntil::parse("tomorrow").is_err());
        assert!(AcknowledgeUntil::parse("").is_err());
        let err = AcknowledgeUntil::try_from(&json!(1_700_000_000)).unwrap_err();
        assert_eq!(err.parameter(), Some("acknowledge_until"));
        assert!(AcknowledgeUntil::try_from(&json!({"when": "later"})).is_err());
    }

    #[test]
    fn test_alert_config_state_parsing() {
        assert_eq!("enabled".parse::<AlertConfigState>(), Ok(AlertConfigState::Enabled));
        assert!(!"disabled".parse::<AlertConfigState>().unwrap().is_enabled());
        assert!("paused".parse::<AlertConfigState>().is_err());
    }

    #[test]
    fn test_response_helpers() {
        let page = json!({"results": [{"id": "a"}, {"id": "b"}], "totalCount": 2});
        assert_eq!(results(&page).map(Vec::len), Some(2));
        assert_eq!(document_id(&results(&page).unwrap()[0]), Some("a"));
        assert!(!is_error_document(&page));

        let error = json!({"error": 404, "errorCode": "INVALID_METRIC_NAME", "detail": "x"});
        assert!(is_error_document(&error));
        assert_eq!(error_code(&error), Some("INVALID_METRIC_NAME"));
        assert_eq!(results(&error), None);
    }

    #[test]
    fn test_agent_type_order_and_names() {
        let names: Vec<_> = AgentType::ALL.iter().map(AgentType::as_str).collect();
        assert_eq!(names, vec!["MONITORING", "BACKUP", "AUTOMATION"]);
    }
}
