//! Cache key generation and key patterns.

use crate::types::GenerationRequest;
use crate::{Error, ErrorContext, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const KEY_NAMESPACE: &str = "workflow";
const ANONYMOUS_IDENTITY: &str = "anon";
const FINGERPRINT_LEN: usize = 16;

/// Readable, scoped cache key.
///
/// Layout: `workflow:<subtask_id>:<language>:v<variation>:<identity fingerprint>`.
/// The subtask segment comes first so that "everything for subtask X" is a prefix.
/// Caller-supplied segments are escaped (`%` `:` `*` become `%25` `%3A` `%2A`), so
/// distinct tuples never render the same key and plain ids stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub value: String,
    pub subtask_id: Option<String>,
    pub variation_index: Option<u32>,
}

impl CacheKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            subtask_id: None,
            variation_index: None,
        }
    }
    pub fn with_subtask(mut self, subtask_id: impl Into<String>) -> Self {
        self.subtask_id = Some(subtask_id.into());
        self
    }
    pub fn with_variation(mut self, index: u32) -> Self {
        self.variation_index = Some(index);
        self
    }
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Derives cache keys from generation requests.
///
/// The key is a pure function of `(subtask_id, language, variation_index, caller identity)`;
/// title, description, timeout and caller attributes never influence it.
pub struct CacheKeyGenerator {
    salt: Option<String>,
}

impl CacheKeyGenerator {
    pub fn new() -> Self {
        Self { salt: None }
    }

    /// Mix a salt into the identity fingerprint (e.g. a deployment or prompt revision).
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn generate(&self, request: &GenerationRequest) -> CacheKey {
        let fingerprint = self.identity_fingerprint(request.caller_context().identity.as_deref());
        let value = format!(
            "{}:{}:{}:v{}:{}",
            KEY_NAMESPACE,
            escape_segment(request.subtask_id()),
            escape_segment(request.language()),
            request.variation_index(),
            fingerprint
        );
        CacheKey::new(value)
            .with_subtask(request.subtask_id())
            .with_variation(request.variation_index())
    }

    fn identity_fingerprint(&self, identity: Option<&str>) -> String {
        match (identity, &self.salt) {
            (None, None) => ANONYMOUS_IDENTITY.to_string(),
            (identity, salt) => {
                let mut hasher = Sha256::new();
                hasher.update(identity.unwrap_or(ANONYMOUS_IDENTITY).as_bytes());
                if let Some(s) = salt {
                    hasher.update(b"\0");
                    hasher.update(s.as_bytes());
                }
                let hash: String = hasher
                    .finalize()
                    .iter()
                    .map(|b| format!("{:02x}", b))
                    .collect();
                hash[..FINGERPRINT_LEN].to_string()
            }
        }
    }
}

/// Percent-encode the characters that carry meaning in keys and key patterns.
fn escape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            '*' => out.push_str("%2A"),
            c => out.push(c),
        }
    }
    out
}

impl Default for CacheKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Glob pattern over cache key strings. `*` matches any run of characters;
/// everything else is literal.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    source: String,
    regex: Regex,
}

impl KeyPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{}$", body)).map_err(|e| {
            Error::validation_with_context(
                format!("invalid cache key pattern: {}", e),
                ErrorContext::new()
                    .with_details(pattern.to_string())
                    .with_source("cache_key_pattern"),
            )
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Pattern covering every variation, language and caller of one subtask.
    /// The id is matched literally, `*` included.
    pub fn for_subtask(subtask_id: &str) -> Result<Self> {
        Self::new(&format!("{}:{}:*", KEY_NAMESPACE, escape_segment(subtask_id)))
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}
