//! Adapter configuration.
//!
//! # Design
//! Every field has a default, so an empty TOML document or an empty
//! environment yields a working configuration. The method-to-encoding table
//! is plain data: adding a method or changing how one is encoded is a
//! configuration change, not a code change.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// How the inbound adapter encodes the call parameter for a given method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingRule {
    /// Input comes from the query string; no body is forwarded.
    Query,
    /// Body is parsed as JSON and the input re-serialized.
    JsonBody,
    /// Body is forwarded untouched.
    Passthrough,
    /// Answered with CORS headers only; never dispatched.
    Preflight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// External origin used to build absolute canonical URLs.
    pub base_url: String,
    /// Path the dispatcher serves procedures under.
    pub endpoint: String,
    /// Prefixes stripped from trigger paths, tried in order.
    pub mount_paths: Vec<String>,
    /// Name of the query parameter / body field carrying the input.
    pub input_param: String,
    /// Per-method rules, keyed by upper-case method name.
    #[serde(deserialize_with = "uppercase_methods")]
    pub encoding: BTreeMap<String, EncodingRule>,
    /// Include the error message as `details` in the fallback envelope.
    pub expose_error_details: bool,
}

fn uppercase_methods<'de, D>(deserializer: D) -> Result<BTreeMap<String, EncodingRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let table = BTreeMap::<String, EncodingRule>::deserialize(deserializer)?;
    Ok(table
        .into_iter()
        .map(|(method, rule)| (method.to_ascii_uppercase(), rule))
        .collect())
}

impl Default for AdapterConfig {
    fn default() -> Self {
        let encoding = [
            ("GET", EncodingRule::Query),
            ("HEAD", EncodingRule::Query),
            ("POST", EncodingRule::JsonBody),
            ("OPTIONS", EncodingRule::Preflight),
        ]
        .into_iter()
        .map(|(method, rule)| (method.to_string(), rule))
        .collect();

        Self {
            base_url: "https://ts-trpc.netlify.app".to_string(),
            endpoint: "/.netlify/functions/api".to_string(),
            mount_paths: vec!["/.netlify/functions/api".to_string(), "/api".to_string()],
            input_param: "input".to_string(),
            encoding,
            expose_error_details: true,
        }
    }
}

impl AdapterConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Defaults overridden by `BRIDGE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup. Split out from `from_env` so
    /// the lookup can be faked.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup("BRIDGE_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(endpoint) = lookup("BRIDGE_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(paths) = lookup("BRIDGE_MOUNT_PATHS") {
            self.mount_paths = paths
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(expose) = lookup("BRIDGE_EXPOSE_ERROR_DETAILS") {
            self.expose_error_details = !matches!(expose.trim(), "0" | "false" | "no" | "off");
        }
        self
    }

    /// Rule for a method; methods missing from the table pass through.
    pub fn rule_for(&self, method: &str) -> EncodingRule {
        self.encoding
            .get(&method.to_ascii_uppercase())
            .copied()
            .unwrap_or(EncodingRule::Passthrough)
    }
}
