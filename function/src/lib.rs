//! The deployable `hello` function.
//!
//! # Overview
//! Wires the bridge adapters to the in-process RPC dispatcher and exposes
//! the result two ways:
//! - `lambda`: the entry point for a proxy-event host, driven by
//!   `lambda_runtime`.
//! - `dev`: a local HTTP server that turns each real request into a trigger
//!   event, the way a functions dev proxy does.
//!
//! Both share one `Bridge`; nothing else is kept between invocations.

pub mod dev;
pub mod lambda;

use std::path::Path;

use anyhow::Context;
use bridge_core::{AdapterConfig, Bridge};
use rpc_dispatcher::{default_registry, router, RouterDispatcher};

pub type FunctionBridge = Bridge<RouterDispatcher>;

/// The bridge for this function: the dispatcher serves the registry under
/// the same endpoint the inbound adapter targets.
pub fn bridge(config: AdapterConfig) -> FunctionBridge {
    let dispatcher = RouterDispatcher::new(router(&config.endpoint, default_registry()));
    Bridge::new(config, dispatcher)
}

/// Configuration from an optional TOML file, then `BRIDGE_*` overrides.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AdapterConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            AdapterConfig::from_toml_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => AdapterConfig::default(),
    };
    Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
}
