//! Locating the bearer token in what the browser sends.
//!
//! The host page stores the token in a cookie under one of several names,
//! and the storage layer may percent-encode it. Lookup order is fixed and
//! the first non-empty value wins.

use percent_encoding::percent_decode_str;
use tracing::debug;

/// Accepted cookie names, highest priority first.
pub const TOKEN_COOKIE_NAMES: [&str; 3] = ["token", "jwt", "access_token"];

/// Picks the token out of a cookie lookup.
///
/// `lookup` is called with each accepted name in priority order. Values are
/// percent-decoded tolerantly; see [`decode_transported`].
pub fn token_from_cookies<'a, F>(mut lookup: F) -> Option<String>
where
    F: FnMut(&str) -> Option<&'a str>,
{
    let mut found: Option<(&str, String)> = None;
    for name in TOKEN_COOKIE_NAMES {
        let Some(value) = lookup(name).map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        let value = decode_transported(value);
        if let Some((winner, token)) = &found {
            if *token != value {
                debug!(winner = %winner, ignored = %name, "conflicting token cookies, keeping first");
            }
            continue;
        }
        found = Some((name, value));
    }
    found.map(|(_, token)| token)
}

/// Extracts the token from an `Authorization: Bearer ...` header value.
#[must_use]
pub fn token_from_authorization(header: &str) -> Option<String> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(decode_transported(token))
    }
}

/// Percent-decodes a transported token, falling back to the raw value.
///
/// Decoding that would produce invalid UTF-8 keeps the original string.
/// Malformed escapes are left untouched.
#[must_use]
pub fn decode_transported(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn first_accepted_name_wins() {
        let jar = HashMap::from([("jwt", "second"), ("access_token", "third"), ("token", "first")]);
        assert_eq!(
            token_from_cookies(|name| jar.get(name).copied()).as_deref(),
            Some("first")
        );
    }

    #[test]
    fn falls_through_to_later_names() {
        let jar = HashMap::from([("access_token", "third")]);
        assert_eq!(
            token_from_cookies(|name| jar.get(name).copied()).as_deref(),
            Some("third")
        );
    }

    #[test]
    fn empty_values_are_skipped() {
        let jar = HashMap::from([("token", "  "), ("jwt", "real")]);
        assert_eq!(
            token_from_cookies(|name| jar.get(name).copied()).as_deref(),
            Some("real")
        );
    }

    #[test]
    fn no_accepted_cookie_yields_none() {
        let jar = HashMap::from([("session", "abc")]);
        assert!(token_from_cookies(|name| jar.get(name).copied()).is_none());
    }

    #[test]
    fn percent_encoded_tokens_are_decoded() {
        assert_eq!(decode_transported("abc%2Edef%2Eghi"), "abc.def.ghi");
        assert_eq!(decode_transported("plain.token.value"), "plain.token.value");
    }

    #[test]
    fn undecodable_tokens_fall_back_to_raw() {
        assert_eq!(decode_transported("abc%FFdef"), "abc%FFdef");
        assert_eq!(decode_transported("abc%zzdef"), "abc%zzdef");
    }

    #[test]
    fn bearer_header_is_parsed() {
        assert_eq!(token_from_authorization("Bearer a.b.c").as_deref(), Some("a.b.c"));
        assert_eq!(token_from_authorization("bearer  a.b.c ").as_deref(), Some("a.b.c"));
        assert!(token_from_authorization("Basic dXNlcjpwdw==").is_none());
        assert!(token_from_authorization("Bearer ").is_none());
        assert!(token_from_authorization("Bearer").is_none());
    }
}
