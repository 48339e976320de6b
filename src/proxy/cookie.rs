//! First-party identity cookie handling.
//!
//! [`resolve`] is a pure read-through / generate-if-absent step: an
//! existing identifier is returned untouched (never regenerated, never
//! extended), and a missing one is minted from 128 bits of OS randomness
//! and returned together with the `Set-Cookie` instruction to persist
//! it. There is no server-side identifier store — the cookie held by the
//! client is the only state. The identifier is used solely as a cookie
//! value; it is never echoed into the proxied request.

use std::borrow::Cow;

use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::ProxyConfig;
use crate::error::TagRelayError;

/// Two years.
pub const IDENTITY_MAX_AGE_SECONDS: i64 = 60 * 60 * 24 * 730;

#[derive(Debug)]
pub struct ResolvedIdentity {
    pub identifier: String,
    /// `Set-Cookie` value to attach to the client response, present only
    /// when the identifier was generated on this request.
    pub set_cookie: Option<String>,
}

/// Resolve the first-party identifier from the raw `Cookie` header.
///
/// A missing or unreadable header counts as "no identifier present" and
/// triggers generation. Generation fails the request if the secure
/// random source is unavailable — there is no weaker fallback.
pub fn resolve(
    cookie_header: Option<&str>,
    config: &ProxyConfig,
) -> Result<ResolvedIdentity, TagRelayError> {
    if let Some(identifier) =
        cookie_header.and_then(|raw| find_cookie(raw, &config.cookie_name))
    {
        return Ok(ResolvedIdentity {
            identifier,
            set_cookie: None,
        });
    }

    let identifier = generate_identifier()?;
    let set_cookie = build_set_cookie(config, &identifier);
    Ok(ResolvedIdentity {
        identifier,
        set_cookie: Some(set_cookie),
    })
}

/// Parse the raw header into pairs and return the named cookie's value.
///
/// Pairs split on `;`, each trimmed, name/value split on the first `=`
/// with both sides percent-decoded. A pair with no `=` is a name with an
/// empty value.
fn find_cookie(raw: &str, name: &str) -> Option<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode(k), decode(v)),
            None => (decode(pair), String::new()),
        })
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
}

/// Percent-decode one cookie token, falling back to the raw text when the
/// decoded bytes are not UTF-8.
fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), Cow::into_owned)
}

/// 16 bytes from the OS entropy source, lowercase hex, zero-padded per
/// byte — a 32-character identifier.
fn generate_identifier() -> Result<String, TagRelayError> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|source| TagRelayError::RandomSource { source })?;
    Ok(hex::encode(bytes))
}

fn build_set_cookie(config: &ProxyConfig, identifier: &str) -> String {
    let mut builder = Cookie::build((config.cookie_name.clone(), identifier.to_owned()))
        .path("/")
        .max_age(Duration::seconds(IDENTITY_MAX_AGE_SECONDS))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax);
    if let Some(ref domain) = config.cookie_domain {
        builder = builder.domain(domain.clone());
    }
    builder.build().to_string()
}
