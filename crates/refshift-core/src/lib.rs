//! refshift Core
//!
//! Shared configuration types for the refshift hook.

pub mod config;

pub use config::{Config, ConfigError, DialectConfig, TrackingConfig};
