//! Text generation for keel.
//!
//! Wraps an OpenAI-compatible chat completions endpoint behind the
//! [`TextGenerator`] trait so API handlers can run against a mock generator in
//! tests, and provides helpers that turn raw model output into typed artifacts
//! (currently compliance recommendations).

pub mod client;
pub mod error;
pub mod recommend;

pub use client::{ChatMessage, GenAiConfig, OpenAiClient, Role, TextGenerator};
pub use error::{Error, Result};
