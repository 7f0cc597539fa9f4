//! Traceability header validation.
//!
//! Every business request must carry the consumer and channel identification
//! headers below. Checks run in a fixed order and stop at the first failing
//! step:
//!
//! 1. presence of all [`REQUIRED_HEADERS`] (empty counts as missing);
//! 2. `Trace-Client-Req-Timestamp` format;
//! 3. `Trace-Source-Id` is a UUID;
//! 4. enterprise, country and channel mode enumerations;
//! 5. `Consumer-Sys-Code` lookup and `Channel-Name` consistency.
//!
//! Failures are 400 [`AppError`]s. Accepted requests get a [`TraceContext`]
//! extension and the trace response headers.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

use channels_errors::AppError;

use crate::error::ApiError;

pub const CONSUMER_SYS_CODE: &str = "Consumer-Sys-Code";
pub const CONSUMER_ENTERPRISE_CODE: &str = "Consumer-Enterprise-Code";
pub const CONSUMER_COUNTRY_CODE: &str = "Consumer-Country-Code";
pub const TRACE_CLIENT_REQ_TIMESTAMP: &str = "Trace-Client-Req-Timestamp";
pub const TRACE_SOURCE_ID: &str = "Trace-Source-Id";
pub const CHANNEL_NAME: &str = "Channel-Name";
pub const CHANNEL_MODE: &str = "Channel-Mode";

/// Required request headers, in reporting order.
pub const REQUIRED_HEADERS: [&str; 7] = [
    CONSUMER_SYS_CODE,
    CONSUMER_ENTERPRISE_CODE,
    CONSUMER_COUNTRY_CODE,
    TRACE_CLIENT_REQ_TIMESTAMP,
    TRACE_SOURCE_ID,
    CHANNEL_NAME,
    CHANNEL_MODE,
];

// Response headers, lowercase as they go on the wire.
pub const TRACE_REQ_TIMESTAMP: &str = "trace-req-timestamp";
pub const TRACE_SOURCE_ID_RESPONSE: &str = "trace-source-id";
pub const LOCAL_TRANSACTION_ID: &str = "local-transaction-id";
pub const TRACE_RSP_TIMESTAMP: &str = "trace-rsp-timestamp";

/// `yyyy-MM-dd HH:mm:ss.SSSSSSZ`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f%z";

pub const ENTERPRISE_CODES: [&str; 2] = ["BANCORIPLEY-CHL", "BANCORIPLEY-PER"];
pub const COUNTRY_CODES: [&str; 2] = ["CHL", "PER"];
pub const CHANNEL_MODES: [&str; 2] = ["PRESENCIAL", "NO-PRESENCIAL"];

/// System code to channel name pairs known out of the box.
pub const DEFAULT_SYSTEM_CODES: [(&str, &str); 2] =
    [("CHL-HB-WEB", "PWA"), ("CHL-SIT-SEG", "SEGUROS")];

const INVALID_TIMESTAMP: &str = "Invalid timestamp format. Expected: yyyy-MM-dd HH:mm:ss.SSSSSSZ";
const INVALID_UUID: &str = "Invalid UUID format";
const INVALID_VALUE: &str = "Invalid value";

/// Validated traceability headers plus the identifiers derived for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub consumer_sys_code: String,
    pub consumer_enterprise_code: String,
    pub consumer_country_code: String,
    pub client_request_timestamp: DateTime<FixedOffset>,
    pub trace_source_id: Uuid,
    pub channel_name: String,
    pub channel_mode: String,
    /// When the service accepted the request.
    pub received_at: DateTime<Utc>,
    pub local_transaction_id: Uuid,
}

impl TraceContext {
    /// Set the trace response headers, stamping the response time now.
    pub fn apply_response_headers(&self, headers: &mut HeaderMap) {
        set_header(headers, TRACE_REQ_TIMESTAMP, &format_timestamp(self.received_at));
        set_header(headers, TRACE_SOURCE_ID_RESPONSE, &self.trace_source_id.to_string());
        set_header(
            headers,
            LOCAL_TRANSACTION_ID,
            &self.local_transaction_id.to_string(),
        );
        set_header(headers, TRACE_RSP_TIMESTAMP, &format_timestamp(Utc::now()));
    }
}

/// Render an instant in the traceability timestamp format.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn set_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(name), value);
        }
        Err(err) => tracing::warn!(header = %name, error = %err, "skipping invalid trace header"),
    }
}

/// Lookup tables for traceability validation.
///
/// Immutable once built; share it through an `Arc`.
#[derive(Debug, Clone)]
pub struct TraceabilityRules {
    system_codes: HashMap<String, String>,
}

impl Default for TraceabilityRules {
    fn default() -> Self {
        Self {
            system_codes: DEFAULT_SYSTEM_CODES
                .iter()
                .map(|(code, name)| ((*code).to_owned(), (*name).to_owned()))
                .collect(),
        }
    }
}

impl TraceabilityRules {
    /// Default rules extended with extra system codes; extras override defaults.
    #[must_use]
    pub fn with_system_codes<I, K, V>(extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut rules = Self::default();
        rules
            .system_codes
            .extend(extra.into_iter().map(|(k, v)| (k.into(), v.into())));
        rules
    }

    /// Channel name expected for a consumer system code.
    #[must_use]
    pub fn expected_channel(&self, system_code: &str) -> Option<&str> {
        self.system_codes.get(system_code).map(String::as_str)
    }

    /// Validate the traceability headers of a request.
    ///
    /// # Errors
    /// Returns a 400 [`AppError`] describing the first failing check.
    pub fn validate(&self, headers: &HeaderMap) -> Result<TraceContext, AppError> {
        let values = REQUIRED_HEADERS.map(|name| header_value(headers, name));
        let missing: Vec<&str> = REQUIRED_HEADERS
            .iter()
            .zip(&values)
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::missing_headers(missing));
        }
        let [
            Some(sys_code),
            Some(enterprise),
            Some(country),
            Some(timestamp),
            Some(source_id),
            Some(channel_name),
            Some(channel_mode),
        ] = values
        else {
            return Err(AppError::missing_headers(REQUIRED_HEADERS));
        };

        let client_request_timestamp = parse_client_timestamp(&timestamp).ok_or_else(|| {
            AppError::invalid_header(TRACE_CLIENT_REQ_TIMESTAMP, INVALID_TIMESTAMP)
        })?;
        let trace_source_id = Uuid::parse_str(&source_id)
            .map_err(|_| AppError::invalid_header(TRACE_SOURCE_ID, INVALID_UUID))?;

        check_allowed(CONSUMER_ENTERPRISE_CODE, &enterprise, &ENTERPRISE_CODES)?;
        check_allowed(CONSUMER_COUNTRY_CODE, &country, &COUNTRY_CODES)?;
        check_allowed(CHANNEL_MODE, &channel_mode, &CHANNEL_MODES)?;

        let expected = self
            .expected_channel(&sys_code)
            .ok_or_else(|| AppError::invalid_header(CONSUMER_SYS_CODE, INVALID_VALUE))?;
        if channel_name != expected {
            return Err(AppError::invalid_header(
                CHANNEL_NAME,
                &format!("Inconsistent with {CONSUMER_SYS_CODE}. Expected: {expected}"),
            ));
        }

        Ok(TraceContext {
            consumer_sys_code: sys_code.into_owned(),
            consumer_enterprise_code: enterprise.into_owned(),
            consumer_country_code: country.into_owned(),
            client_request_timestamp,
            trace_source_id,
            channel_name: channel_name.into_owned(),
            channel_mode: channel_mode.into_owned(),
            received_at: Utc::now(),
            local_transaction_id: Uuid::new_v4(),
        })
    }
}

/// Non-ASCII bytes decode lossily so such values still count as present
/// and fail the value checks instead of the presence check.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
        .filter(|v| !v.is_empty())
}

/// Parse `yyyy-MM-dd HH:mm:ss.SSSSSSZ`: exactly six fraction digits and a
/// `+HHMM`/`-HHMM` offset. chrono alone accepts a missing fraction or `-04:00`.
fn parse_client_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    if !has_timestamp_shape(value.as_bytes()) {
        return None;
    }
    DateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}

fn has_timestamp_shape(bytes: &[u8]) -> bool {
    const SHAPE: &[u8; 31] = b"dddd-dd-dd dd:dd:dd.dddddd+dddd";
    bytes.len() == SHAPE.len()
        && SHAPE.iter().zip(bytes).all(|(&want, &got)| match want {
            b'd' => got.is_ascii_digit(),
            b'+' => matches!(got, b'+' | b'-'),
            _ => want == got,
        })
}

fn check_allowed(header: &str, value: &str, allowed: &[&str]) -> Result<(), AppError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(AppError::invalid_header(
        header,
        &format!("{INVALID_VALUE}. Expected: {}", allowed.join(" or ")),
    ))
}

/// Traceability middleware.
///
/// Rejected requests never reach the handler; the error travels in the
/// response extensions to the response wrapper.
pub async fn traceability_middleware(
    State(rules): State<Arc<TraceabilityRules>>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = match rules.validate(req.headers()) {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                error = %err,
                "traceability validation failed"
            );
            return ApiError::from(err).into_response();
        }
    };

    tracing::debug!(
        trace_source_id = %ctx.trace_source_id,
        local_transaction_id = %ctx.local_transaction_id,
        consumer = %ctx.consumer_sys_code,
        "traceability accepted"
    );
    req.extensions_mut().insert(ctx.clone());
    let mut resp = next.run(req).await;
    ctx.apply_response_headers(resp.headers_mut());
    resp
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const TIMESTAMP: &str = "2024-07-15 10:30:45.123456-0400";
    const SOURCE_ID: &str = "6f1e4c1a-4c1b-4a55-9a43-35f3f1f7e0b2";

    fn valid_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (CONSUMER_SYS_CODE, "CHL-HB-WEB"),
            (CONSUMER_ENTERPRISE_CODE, "BANCORIPLEY-CHL"),
            (CONSUMER_COUNTRY_CODE, "CHL"),
            (TRACE_CLIENT_REQ_TIMESTAMP, TIMESTAMP),
            (TRACE_SOURCE_ID, SOURCE_ID),
            (CHANNEL_NAME, "PWA"),
            (CHANNEL_MODE, "PRESENCIAL"),
        ] {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_static(value),
            );
        }
        headers
    }

    fn with(name: &str, value: &'static str) -> HeaderMap {
        let mut headers = valid_headers();
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_static(value),
        );
        headers
    }

    fn rejection(headers: &HeaderMap) -> String {
        let err = TraceabilityRules::default().validate(headers).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        err.message
    }

    #[test]
    fn valid_headers_produce_context() {
        let ctx = TraceabilityRules::default().validate(&valid_headers()).unwrap();
        assert_eq!(ctx.consumer_sys_code, "CHL-HB-WEB");
        assert_eq!(ctx.channel_name, "PWA");
        assert_eq!(ctx.trace_source_id.to_string(), SOURCE_ID);
        assert_eq!(
            ctx.client_request_timestamp.format(TIMESTAMP_FORMAT).to_string(),
            TIMESTAMP
        );
        assert_ne!(ctx.local_transaction_id, ctx.trace_source_id);
    }

    #[test]
    fn missing_headers_are_listed_in_declared_order() {
        let mut headers = HeaderMap::new();
        headers.insert("consumer-sys-code", HeaderValue::from_static("CHL-HB-WEB"));
        assert_eq!(
            rejection(&headers),
            "Missing required headers: Consumer-Enterprise-Code, Consumer-Country-Code, \
             Trace-Client-Req-Timestamp, Trace-Source-Id, Channel-Name, Channel-Mode"
        );
    }

    #[test]
    fn empty_values_count_as_missing_and_skip_value_checks() {
        let mut headers = with(CONSUMER_SYS_CODE, "");
        headers.insert("trace-source-id", HeaderValue::from_static("not-a-uuid"));
        headers.remove(CONSUMER_COUNTRY_CODE);
        assert_eq!(
            rejection(&headers),
            "Missing required headers: Consumer-Sys-Code, Consumer-Country-Code"
        );
    }

    #[test]
    fn bad_timestamp_is_rejected_before_uuid() {
        let mut headers = with(TRACE_CLIENT_REQ_TIMESTAMP, "invalid-timestamp");
        headers.insert("trace-source-id", HeaderValue::from_static("nope"));
        assert_eq!(
            rejection(&headers),
            "Invalid headers: Trace-Client-Req-Timestamp (Invalid timestamp format. Expected: yyyy-MM-dd HH:mm:ss.SSSSSSZ)"
        );
    }

    #[test]
    fn timestamp_without_zone_is_rejected() {
        let headers = with(TRACE_CLIENT_REQ_TIMESTAMP, "2024-07-15 10:30:45.123456");
        assert!(rejection(&headers).starts_with("Invalid headers: Trace-Client-Req-Timestamp"));
    }

    #[test]
    fn timestamp_needs_six_fraction_digits_and_compact_offset() {
        for value in [
            "2024-07-15 10:30:45-0400",
            "2024-07-15 10:30:45.123456-04:00",
            "2024-07-15 10:30:45.1-0400",
            "2024-07-15 10:30:45.123456789-0400",
            "2024-07-15T10:30:45.123456-0400",
            "2024-07-15 10:30:45.123456Z",
        ] {
            let headers = with(TRACE_CLIENT_REQ_TIMESTAMP, value);
            assert_eq!(
                rejection(&headers),
                "Invalid headers: Trace-Client-Req-Timestamp (Invalid timestamp format. Expected: yyyy-MM-dd HH:mm:ss.SSSSSSZ)",
                "{value}"
            );
        }

        let positive = with(TRACE_CLIENT_REQ_TIMESTAMP, "2024-07-15 10:30:45.000001+0530");
        assert!(TraceabilityRules::default().validate(&positive).is_ok());
    }

    #[test]
    fn calendar_invalid_timestamp_is_rejected() {
        let headers = with(TRACE_CLIENT_REQ_TIMESTAMP, "2024-02-30 10:30:45.123456-0400");
        assert!(rejection(&headers).starts_with("Invalid headers: Trace-Client-Req-Timestamp"));
    }

    #[test]
    fn non_ascii_value_is_invalid_not_missing() {
        let mut headers = valid_headers();
        headers.insert(
            "consumer-country-code",
            HeaderValue::from_bytes("CHÌ".as_bytes()).unwrap(),
        );
        assert_eq!(
            rejection(&headers),
            "Invalid headers: Consumer-Country-Code (Invalid value. Expected: CHL or PER)"
        );

        let mut headers = valid_headers();
        headers.insert("trace-source-id", HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        assert_eq!(
            rejection(&headers),
            "Invalid headers: Trace-Source-Id (Invalid UUID format)"
        );
    }

    #[test]
    fn bad_uuid_is_rejected() {
        assert_eq!(
            rejection(&with(TRACE_SOURCE_ID, "1234")),
            "Invalid headers: Trace-Source-Id (Invalid UUID format)"
        );
    }

    #[test]
    fn enumerations_are_checked_in_order() {
        assert_eq!(
            rejection(&with(CONSUMER_ENTERPRISE_CODE, "OTHER")),
            "Invalid headers: Consumer-Enterprise-Code (Invalid value. Expected: BANCORIPLEY-CHL or BANCORIPLEY-PER)"
        );
        assert_eq!(
            rejection(&with(CONSUMER_COUNTRY_CODE, "ARG")),
            "Invalid headers: Consumer-Country-Code (Invalid value. Expected: CHL or PER)"
        );
        assert_eq!(
            rejection(&with(CHANNEL_MODE, "REMOTO")),
            "Invalid headers: Channel-Mode (Invalid value. Expected: PRESENCIAL or NO-PRESENCIAL)"
        );

        let mut both = with(CONSUMER_COUNTRY_CODE, "ARG");
        both.insert("channel-mode", HeaderValue::from_static("REMOTO"));
        assert!(rejection(&both).contains(CONSUMER_COUNTRY_CODE));
    }

    #[test]
    fn unknown_system_code_is_rejected() {
        assert_eq!(
            rejection(&with(CONSUMER_SYS_CODE, "INVALID")),
            "Invalid headers: Consumer-Sys-Code (Invalid value)"
        );
    }

    #[test]
    fn channel_name_must_match_system_code() {
        assert_eq!(
            rejection(&with(CHANNEL_NAME, "INVALID")),
            "Invalid headers: Channel-Name (Inconsistent with Consumer-Sys-Code. Expected: PWA)"
        );

        let mut insurance = with(CONSUMER_SYS_CODE, "CHL-SIT-SEG");
        insurance.insert("channel-name", HeaderValue::from_static("SEGUROS"));
        assert!(TraceabilityRules::default().validate(&insurance).is_ok());
    }

    #[test]
    fn extra_system_codes_extend_the_table() {
        let rules = TraceabilityRules::with_system_codes([("CHL-APP-MOB", "APP")]);
        assert_eq!(rules.expected_channel("CHL-APP-MOB"), Some("APP"));
        assert_eq!(rules.expected_channel("CHL-HB-WEB"), Some("PWA"));

        let mut headers = with(CONSUMER_SYS_CODE, "CHL-APP-MOB");
        headers.insert("channel-name", HeaderValue::from_static("APP"));
        assert!(rules.validate(&headers).is_ok());
        assert!(TraceabilityRules::default().validate(&headers).is_err());
    }

    #[test]
    fn response_headers_use_trace_format() {
        let ctx = TraceabilityRules::default().validate(&valid_headers()).unwrap();
        let mut headers = HeaderMap::new();
        ctx.apply_response_headers(&mut headers);

        assert_eq!(headers[TRACE_SOURCE_ID_RESPONSE], SOURCE_ID);
        assert_eq!(
            headers[LOCAL_TRANSACTION_ID],
            ctx.local_transaction_id.to_string().as_str()
        );
        for name in [TRACE_REQ_TIMESTAMP, TRACE_RSP_TIMESTAMP] {
            let value = headers[name].to_str().unwrap();
            assert!(DateTime::parse_from_str(value, TIMESTAMP_FORMAT).is_ok(), "{value}");
        }
    }
}
