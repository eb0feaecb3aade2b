//! Shared configuration and telemetry for upstorage.
//!
//! This crate provides the ambient pieces used by the storage crates:
//! - Configuration loading (files, `.env`, environment)
//! - Tracing subscriber initialization

pub mod config;
pub mod telemetry;

pub use config::{AppConfig, LocalSettings, LogConfig, S3Settings, StorageSettings};
pub use telemetry::init_tracing;
