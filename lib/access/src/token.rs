//! Bearer token decoding.
//!
//! Tokens are compact, dot-separated structures whose middle segment is
//! base64url-encoded JSON. The dashboard only reads the payload; signature
//! verification is the backend's job, so nothing here trusts the claims for
//! anything beyond choosing what to render.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use lostfound_core::{RoleId, SubjectId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// base64url without padding requirements; issuers differ on trailing `=`.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded, unverified token payload.
///
/// Fields the dashboard does not interpret are kept in [`Claims::extra`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "WireClaims")]
pub struct Claims {
    /// Subject the token was issued to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<SubjectId>,

    /// Role identifier used for the permission lookup.
    #[serde(rename = "roleId", skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,

    /// Free-form role label (`admin`, `moderator`, ...), compared lower-cased.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Issued-at, seconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiry, seconds since the Unix epoch (UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Every other field of the payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload as issuers write it.
///
/// Both `roleId` and `role_id` are seen in the wild, sometimes together;
/// `roleId` wins when both carry a value.
#[derive(Deserialize)]
struct WireClaims {
    #[serde(default, deserialize_with = "lenient_id")]
    sub: Option<SubjectId>,
    #[serde(rename = "roleId", default, deserialize_with = "lenient_id")]
    role_id: Option<RoleId>,
    #[serde(rename = "role_id", default, deserialize_with = "lenient_id")]
    role_id_snake: Option<RoleId>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    iat: Option<i64>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    exp: Option<i64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<WireClaims> for Claims {
    fn from(wire: WireClaims) -> Self {
        Self {
            sub: wire.sub,
            role_id: wire.role_id.or(wire.role_id_snake),
            role: wire.role,
            iat: wire.iat,
            exp: wire.exp,
            extra: wire.extra,
        }
    }
}

impl Claims {
    /// Returns true if the token has no expiry or the expiry has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Expiry check against an explicit clock.
    ///
    /// A missing `exp` counts as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            Some(exp) => exp <= now.timestamp(),
            None => true,
        }
    }

    /// Returns the expiry as a timestamp, if present and representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Returns the issue time as a timestamp, if present and representable.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Returns the role label lower-cased, or `None` when absent or blank.
    #[must_use]
    pub fn role_label(&self) -> Option<String> {
        self.role
            .as_deref()
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(str::to_lowercase)
    }

    /// Looks up an uninterpreted payload field.
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Decodes a token into its claims without verifying it.
///
/// Returns `None` when the token is not three dot-separated segments, when
/// the payload is not base64url, or when it is not a JSON object with
/// well-typed known fields.
#[must_use]
pub fn decode(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    if payload.is_empty() {
        return None;
    }

    let bytes = PAYLOAD_ENGINE.decode(payload).ok()?;
    let value: Value = serde_json::from_slice(&bytes).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Accepts identifiers issued either as strings or as JSON numbers.
fn lenient_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(T::from(s))),
        Some(Value::Number(n)) => Ok(Some(T::from(n.to_string()))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number identifier, found {other}"
        ))),
    }
}

/// Accepts epoch seconds written as integers or floats.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(secs) => Ok(Some(secs)),
            None => n
                .as_f64()
                .map(|secs| Some(secs.trunc() as i64))
                .ok_or_else(|| serde::de::Error::custom("timestamp out of range")),
        },
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected numeric timestamp, found {other}"
        ))),
    }
}
