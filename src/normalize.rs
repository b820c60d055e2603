//! Provider payloads and their mapping onto [`CanonicalReport`].
//!
//! Every field is optional and lenient: a field of an unexpected JSON type is treated as
//! absent instead of failing the whole payload.

use crate::report::{CanonicalReport, Latitude, Longitude, NetworkType};
use crate::source::{SchemaKind, SourceSpec};

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("response body is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response body is not a JSON object")]
    NotAnObject,
    #[error(r#"provider rejected the query: "{0}""#)]
    Rejected(String),
}

/// ip-api.com response, `fields=66846719` selects all of these.
#[derive(Debug, Deserialize)]
struct SchemaAPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    query: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    country: Option<String>,
    #[serde(default, rename = "regionName", deserialize_with = "lenient_string")]
    region_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    city: Option<String>,
    #[serde(default, rename = "countryCode", deserialize_with = "lenient_string")]
    country_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    continent: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    isp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    org: Option<String>,
    #[serde(default, rename = "as", deserialize_with = "lenient_string")]
    as_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lon: Option<f64>,
    #[serde(default, deserialize_with = "truthy")]
    mobile: bool,
    #[serde(default, deserialize_with = "truthy")]
    proxy: bool,
    #[serde(default, deserialize_with = "truthy")]
    hosting: bool,
}

/// ipapi.co response.
#[derive(Debug, Deserialize)]
struct SchemaBPayload {
    #[serde(default, deserialize_with = "truthy")]
    error: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    ip: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    country_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    region: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    country_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    continent_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    isp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    org: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    asn: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    longitude: Option<f64>,
}

/// Parses `body` according to the schema of `source` and maps it onto a report.
pub fn normalize(source: &SourceSpec, body: &[u8]) -> Result<CanonicalReport, PayloadError> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(PayloadError::NotAnObject);
    }
    match source.schema {
        SchemaKind::A => normalize_schema_a(source, serde_json::from_value(value)?),
        SchemaKind::B => normalize_schema_b(source, serde_json::from_value(value)?),
    }
}

fn normalize_schema_a(
    source: &SourceSpec,
    payload: SchemaAPayload,
) -> Result<CanonicalReport, PayloadError> {
    // Some mirrors omit "status" but still echo the query back
    let accepted = match payload.status.as_deref() {
        Some(status) if status.eq_ignore_ascii_case("success") => true,
        Some(status) if status.eq_ignore_ascii_case("fail") => false,
        _ => payload.query.is_some(),
    };
    if !accepted {
        return Err(PayloadError::Rejected(
            payload
                .message
                .or(payload.status)
                .unwrap_or_else(|| "no success marker".to_owned()),
        ));
    }
    Ok(CanonicalReport {
        source: source.name.clone(),
        tier: source.tier,
        query: payload.query,
        country: payload.country,
        region: payload.region_name,
        city: payload.city,
        country_code: payload.country_code,
        continent: payload.continent,
        isp: payload.isp,
        org: payload.org,
        as_number: payload.as_number,
        timezone: payload.timezone,
        latitude: payload.lat.and_then(Latitude::from_signed),
        longitude: payload.lon.and_then(Longitude::from_signed),
        network_type: NetworkType::from_flags(payload.mobile, payload.proxy, payload.hosting),
    })
}

fn normalize_schema_b(
    source: &SourceSpec,
    payload: SchemaBPayload,
) -> Result<CanonicalReport, PayloadError> {
    if payload.error {
        return Err(PayloadError::Rejected(
            payload.reason.unwrap_or_else(|| "error".to_owned()),
        ));
    }
    Ok(CanonicalReport {
        source: source.name.clone(),
        tier: source.tier,
        query: payload.ip,
        country: payload.country_name,
        region: payload.region,
        city: payload.city,
        country_code: payload.country_code,
        continent: payload.continent_code,
        isp: payload.isp,
        org: payload.org,
        as_number: payload.asn,
        timezone: payload.timezone,
        latitude: payload.latitude.and_then(Latitude::from_signed),
        longitude: payload.longitude.and_then(Longitude::from_signed),
        network_type: NetworkType::Unavailable,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// JSON truthiness: `false`, `null`, `0`, and empty strings or containers are false.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}
