//! Request-shape translation between a serverless trigger and an
//! RPC-over-HTTP dispatcher.
//!
//! # Overview
//! A trigger event goes through three stages per invocation:
//! `InboundAdapter` builds a canonical `HttpRequest`, a `Dispatcher` answers
//! it with an `HttpResponse`, and `OutboundAdapter` turns that into the
//! host's `TriggerResponse`. `Bridge` runs the three in order and converts
//! every adapter-level failure into one deterministic 500 envelope.
//!
//! # Design
//! - No network I/O here. The dispatcher sits behind a trait so the
//!   adapters never depend on a particular RPC runtime.
//! - No state survives an invocation; the host context is passed in
//!   explicitly rather than read from globals.
//! - How each method carries its input is a configuration table
//!   (`AdapterConfig::encoding`), not code.
//! - `HelloClient` is the caller-side counterpart: it builds requests in
//!   either call style and parses any response shape without panicking.

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod inbound;
pub mod outbound;
pub mod trigger;
pub mod types;
pub mod validate;

pub use bridge::{Bridge, Dispatcher};
pub use client::{CallStyle, HelloClient};
pub use config::{AdapterConfig, EncodingRule};
pub use error::{ApiError, BridgeError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use inbound::{Inbound, InboundAdapter};
pub use outbound::{OutboundAdapter, FIXED_HEADERS};
pub use trigger::{InvocationContext, TriggerEvent, TriggerResponse};
pub use types::{ErrorBody, HelloInput};
pub use validate::{InputShape, StringInput, Validator};
