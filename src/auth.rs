// Copyright 2025 Cowboy AI, LLC.

//! HTTP Basic and Digest authentication (RFC 2617) for the WBEM transport.
//!
//! Digest is hand-rolled rather than pulled from a crate: no digest-auth
//! client crate appears anywhere in the reference pack, while `md-5` does
//! (vendored alongside other hashers), so the MD5 digests RFC 2617
//! requires are computed directly against that crate.

use base64::Engine;
use md5::{Digest, Md5};

/// Build a `Basic` Authorization header value.
pub fn basic_auth_header(user: &str, password: &str) -> String {
    let raw = format!("{user}:{password}");
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(raw)
    )
}

/// A parsed `WWW-Authenticate: Digest ...` challenge.
#[derive(Debug, Clone)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub qop: Option<String>,
    pub opaque: Option<String>,
}

impl DigestChallenge {
    /// Parse a `WWW-Authenticate` header value. Returns `None` if it isn't
    /// a `Digest` challenge, or is missing a mandatory field.
    pub fn parse(header: &str) -> Option<Self> {
        let rest = header.strip_prefix("Digest ")?;
        let mut realm = None;
        let mut nonce = None;
        let mut qop = None;
        let mut opaque = None;
        for part in split_challenge_params(rest) {
            let (key, value) = part.split_once('=')?;
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"').to_string();
            match key.as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "qop" => qop = Some(value),
                "opaque" => opaque = Some(value),
                _ => {}
            }
        }
        Some(Self {
            realm: realm?,
            nonce: nonce?,
            qop,
            opaque,
        })
    }
}

/// Split Digest challenge parameters on top-level commas, ignoring commas
/// inside quoted strings (`qop="auth,auth-int"`).
fn split_challenge_params(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Build a `Digest` Authorization header value for `method`/`uri` in
/// response to `challenge`, per RFC 2617 §3.2.2. `cnonce` must be a
/// fresh, unpredictable value per request; `nc` is the nonce-count,
/// starting at 1 for the first use of a given server nonce.
pub fn digest_auth_header(
    challenge: &DigestChallenge,
    user: &str,
    password: &str,
    method: &str,
    uri: &str,
    cnonce: &str,
    nc: u32,
) -> String {
    let ha1 = md5_hex(&format!("{user}:{}:{password}", challenge.realm));
    let ha2 = md5_hex(&format!("{method}:{uri}"));

    let mut header = format!(
        r#"Digest username="{user}", realm="{}", nonce="{}", uri="{uri}", response="#,
        challenge.realm, challenge.nonce,
    );

    if let Some(qop) = challenge.qop.as_deref() {
        let qop_value = qop.split(',').next().unwrap_or("auth").trim();
        let nc_str = format!("{nc:08x}");
        let response = md5_hex(&format!(
            "{ha1}:{}:{nc_str}:{cnonce}:{qop_value}:{ha2}",
            challenge.nonce
        ));
        header.push_str(&format!(r#""{response}", qop={qop_value}, nc={nc_str}, cnonce="{cnonce}""#));
    } else {
        let response = md5_hex(&format!("{ha1}:{}:{ha2}", challenge.nonce));
        header.push_str(&format!(r#""{response}""#));
    }

    if let Some(opaque) = &challenge.opaque {
        header.push_str(&format!(r#", opaque="{opaque}""#));
    }
    header
}
