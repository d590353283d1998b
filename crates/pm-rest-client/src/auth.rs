//! HTTP Digest authentication (RFC 2617) for the REST API client
//!
//! The service answers an unauthenticated request with `401` and a
//! `WWW-Authenticate: Digest ...` challenge. [`DigestChallenge::parse`] reads
//! that header and [`DigestChallenge::authorization`] computes the matching
//! `Authorization` value for the retried request.

use md5::{Digest, Md5};
use pm_client_api::{Credentials, TransportError, TransportResult};

/// Quality of protection offered by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qop {
    Auth,
    AuthInt,
}

impl Qop {
    fn as_str(&self) -> &'static str {
        match self {
            Qop::Auth => "auth",
            Qop::AuthInt => "auth-int",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Md5Sess,
}

/// Parsed `WWW-Authenticate: Digest` challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub algorithm: DigestAlgorithm,
    pub qop: Option<Qop>,
}

impl DigestChallenge {
    pub fn parse(header: &str) -> TransportResult<Self> {
        let rest = header
            .trim_start()
            .strip_prefix("Digest")
            .or_else(|| header.trim_start().strip_prefix("digest"))
            .ok_or_else(|| rejected_challenge(header, "not a Digest challenge"))?;

        let mut realm = None;
        let mut nonce = None;
        let mut opaque = None;
        let mut algorithm = DigestAlgorithm::Md5;
        let mut qop_options = None;

        for (key, value) in parse_params(rest) {
            match key.to_ascii_lowercase().as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "opaque" => opaque = Some(value),
                "qop" => qop_options = Some(value),
                "algorithm" => {
                    algorithm = match value.to_ascii_uppercase().as_str() {
                        "MD5" => DigestAlgorithm::Md5,
                        "MD5-SESS" => DigestAlgorithm::Md5Sess,
                        other => {
                            return Err(rejected_challenge(
                                header,
                                &format!("unsupported algorithm {other}"),
                            ))
                        }
                    }
                }
                _ => {}
            }
        }

        // Prefer plain `auth` when both are offered.
        let qop = qop_options.and_then(|options| {
            let offered: Vec<String> = options
                .split(',')
                .map(|o| o.trim().to_ascii_lowercase())
                .collect();
            if offered.iter().any(|o| o == "auth") {
                Some(Qop::Auth)
            } else if offered.iter().any(|o| o == "auth-int") {
                Some(Qop::AuthInt)
            } else {
                None
            }
        });

        Ok(Self {
            realm: realm.ok_or_else(|| rejected_challenge(header, "missing realm"))?,
            nonce: nonce.ok_or_else(|| rejected_challenge(header, "missing nonce"))?,
            opaque,
            algorithm,
            qop,
        })
    }

    /// `Authorization` header value with a fresh client nonce.
    pub fn authorization(
        &self,
        credentials: &Credentials,
        method: &str,
        uri: &str,
        body: &[u8],
    ) -> String {
        let cnonce = uuid::Uuid::new_v4().simple().to_string();
        self.authorization_with_cnonce(credentials, method, uri, body, &cnonce, 1)
    }

    pub fn authorization_with_cnonce(
        &self,
        credentials: &Credentials,
        method: &str,
        uri: &str,
        body: &[u8],
        cnonce: &str,
        nonce_count: u32,
    ) -> String {
        let nc = format!("{nonce_count:08x}");

        let mut ha1 = md5_hex(&format!(
            "{}:{}:{}",
            credentials.principal(),
            self.realm,
            credentials.api_key()
        ));
        if self.algorithm == DigestAlgorithm::Md5Sess {
            ha1 = md5_hex(&format!("{ha1}:{}:{cnonce}", self.nonce));
        }

        let ha2 = match self.qop {
            Some(Qop::AuthInt) => {
                let mut hasher = Md5::new();
                hasher.update(body);
                md5_hex(&format!("{method}:{uri}:{:x}", hasher.finalize()))
            }
            _ => md5_hex(&format!("{method}:{uri}")),
        };

        let response = match self.qop {
            Some(qop) => md5_hex(&format!(
                "{ha1}:{}:{nc}:{cnonce}:{}:{ha2}",
                self.nonce,
                qop.as_str()
            )),
            None => md5_hex(&format!("{ha1}:{}:{ha2}", self.nonce)),
        };

        let mut header = format!(
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{uri}\", response=\"{response}\"",
            credentials.principal(),
            self.realm,
            self.nonce
        );
        if self.algorithm == DigestAlgorithm::Md5Sess {
            header.push_str(", algorithm=MD5-sess");
        } else {
            header.push_str(", algorithm=MD5");
        }
        if let Some(qop) = self.qop {
            header.push_str(&format!(", qop={}, nc={nc}, cnonce=\"{cnonce}\"", qop.as_str()));
        }
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(", opaque=\"{opaque}\""));
        }
        header
    }
}

fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn rejected_challenge(header: &str, reason: &str) -> TransportError {
    TransportError::Request(format!("cannot answer challenge `{header}`: {reason}"))
}

/// Split `key=value, key="quoted, value"` pairs.
pub fn parse_params(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace() || *c == ',') {
            chars.next();
        }
        let mut key = String::new();
        while let Some(c) = chars.peek().copied() {
            if c == '=' || c == ',' {
                break;
            }
            key.push(c);
            chars.next();
        }
        if key.trim().is_empty() {
            break;
        }
        if chars.next() != Some('=') {
            params.push((key.trim().to_string(), String::new()));
            continue;
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => break,
                    _ => value.push(c),
                }
            }
        } else {
            while let Some(c) = chars.peek().copied() {
                if c == ',' {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }
        params.push((key.trim().to_string(), value.trim().to_string()));
    }

    params
}
