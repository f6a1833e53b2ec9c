//! Chat assistant service that lets a Gemini model call Google Maps
//! geocoding tools and streams its reply to a web chat client.

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{orchestrator, tooling};
pub use config::{AppConfig, ConfigError};
pub use domain::{conversation, stream, types};
pub use infrastructure::{geocode, model, server};
