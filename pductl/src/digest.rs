//! HTTP Digest authentication (RFC 7616)
//!
//! PDU firmware only speaks Digest, and reqwest has no built-in
//! support for it, so the challenge-response handshake lives here.
//! MD5 is the firmware default; SHA-256 and SHA-512-256 challenges
//! from newer devices are also answered.

use std::sync::atomic::{AtomicU32, Ordering};

use pdu_core::{PduError, Result};

/// Hash algorithm advertised in a Digest challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha256,
    Sha512_256,
}

impl DigestAlgorithm {
    /// Parse the `algorithm` challenge parameter (case-insensitive).
    ///
    /// Unknown values fall back to MD5, which every firmware accepts.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "SHA-256" | "SHA256" => DigestAlgorithm::Sha256,
            "SHA-512-256" | "SHA512-256" => DigestAlgorithm::Sha512_256,
            _ => DigestAlgorithm::Md5,
        }
    }

    /// Name used in the `Authorization` header.
    pub fn label(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha512_256 => "SHA-512-256",
        }
    }
}

/// Parsed `WWW-Authenticate: Digest` challenge.
#[derive(Debug, Clone)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub algorithm: DigestAlgorithm,
    pub qop: Option<String>,
    pub opaque: Option<String>,
    pub stale: bool,
}

impl DigestChallenge {
    /// Parse a `WWW-Authenticate` header value.
    ///
    /// Fails with [`PduError::Auth`] when the challenge is not a
    /// Digest challenge or lacks the mandatory realm/nonce parameters.
    pub fn parse(header: &str) -> Result<Self> {
        let params_str = header
            .strip_prefix("Digest ")
            .or_else(|| header.strip_prefix("digest "))
            .ok_or_else(|| PduError::Auth(format!("not a Digest challenge: {header}")))?;

        let mut realm = None;
        let mut nonce = None;
        let mut algorithm = DigestAlgorithm::Md5;
        let mut qop = None;
        let mut opaque = None;
        let mut stale = false;

        for (key, value) in parse_params(params_str) {
            match key.to_ascii_lowercase().as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "algorithm" => algorithm = DigestAlgorithm::parse(&value),
                "qop" => qop = Some(value),
                "opaque" => opaque = Some(value),
                "stale" => stale = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        let realm =
            realm.ok_or_else(|| PduError::Auth("Digest challenge missing realm".to_string()))?;
        let nonce =
            nonce.ok_or_else(|| PduError::Auth("Digest challenge missing nonce".to_string()))?;

        Ok(DigestChallenge {
            realm,
            nonce,
            algorithm,
            qop,
            opaque,
            stale,
        })
    }

    /// The qop value the client will answer with, if any.
    ///
    /// Servers may offer a list (`"auth,auth-int"`); only `auth` is
    /// implemented, and it is always listed first by real firmware.
    pub fn chosen_qop(&self) -> Option<&str> {
        self.qop
            .as_deref()
            .map(|q| q.split(',').next().unwrap_or("auth").trim())
    }
}

/// Digest credentials bound to one device.
///
/// The nonce count increases across requests within one session so a
/// re-used server nonce never produces a replayable response.
#[derive(Debug)]
pub struct DigestAuth {
    username: String,
    password: String,
    nc: AtomicU32,
}

impl Clone for DigestAuth {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: self.password.clone(),
            nc: AtomicU32::new(self.nc.load(Ordering::SeqCst)),
        }
    }
}

impl DigestAuth {
    /// Create credentials for one username/password pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            nc: AtomicU32::new(0),
        }
    }

    /// Build the `Authorization` header value answering `challenge`
    /// for a request with the given method and request-URI path.
    pub fn authorization(&self, challenge: &DigestChallenge, method: &str, uri: &str) -> String {
        let nc = self.nc.fetch_add(1, Ordering::SeqCst) + 1;
        let cnonce = hex::encode(rand::random::<[u8; 16]>());

        let response = compute_response(
            challenge.algorithm,
            &self.username,
            &challenge.realm,
            &self.password,
            &challenge.nonce,
            nc,
            &cnonce,
            challenge.chosen_qop(),
            method,
            uri,
        );

        let mut value = format!(
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\", algorithm={}",
            self.username,
            challenge.realm,
            challenge.nonce,
            uri,
            response,
            challenge.algorithm.label(),
        );

        if let Some(qop) = challenge.chosen_qop() {
            value.push_str(&format!(", qop={qop}, nc={nc:08x}, cnonce=\"{cnonce}\""));
        }

        if let Some(opaque) = &challenge.opaque {
            value.push_str(&format!(", opaque=\"{opaque}\""));
        }

        value
    }
}

/// Compute the `response` parameter per RFC 7616 §3.4.1.
#[allow(clippy::too_many_arguments)]
pub fn compute_response(
    algorithm: DigestAlgorithm,
    username: &str,
    realm: &str,
    password: &str,
    nonce: &str,
    nc: u32,
    cnonce: &str,
    qop: Option<&str>,
    method: &str,
    uri: &str,
) -> String {
    // HA1 = H(username:realm:password), HA2 = H(method:uri).
    // auth-int would fold the body hash into A2; no firmware asks for it.
    let ha1 = hash(algorithm, &format!("{username}:{realm}:{password}"));
    let ha2 = hash(algorithm, &format!("{method}:{uri}"));

    match qop {
        Some(qop) => hash(
            algorithm,
            &format!("{ha1}:{nonce}:{nc:08x}:{cnonce}:{qop}:{ha2}"),
        ),
        // Legacy RFC 2069 form for challenges without qop
        None => hash(algorithm, &format!("{ha1}:{nonce}:{ha2}")),
    }
}

fn hash(algorithm: DigestAlgorithm, data: &str) -> String {
    use sha2::Digest;

    match algorithm {
        DigestAlgorithm::Md5 => {
            let mut hasher = md5::Md5::new();
            hasher.update(data.as_bytes());
            hex::encode(hasher.finalize())
        }
        DigestAlgorithm::Sha256 => {
            let mut hasher = sha2::Sha256::new();
            hasher.update(data.as_bytes());
            hex::encode(hasher.finalize())
        }
        DigestAlgorithm::Sha512_256 => {
            let mut hasher = sha2::Sha512_256::new();
            hasher.update(data.as_bytes());
            hex::encode(hasher.finalize())
        }
    }
}

/// Split a Digest parameter list into key/value pairs, honoring
/// commas inside quoted values and stripping the surrounding quotes.
pub(crate) fn parse_params(s: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut push_pair = |part: &str| {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            pairs.push((key.trim().to_string(), value.to_string()));
        }
    };

    for c in s.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                push_pair(&current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_pair(&current);

    pairs
}
