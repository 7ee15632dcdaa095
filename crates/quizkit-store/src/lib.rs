//! quizkit-store — Quiz definition sources and completion sinks.
//!
//! Implements the `DefinitionSource`, `CompletionSink`, and
//! `ResponseHistory` traits for a local file store, the hosted REST
//! backend, and an in-memory store for tests.

pub mod config;
pub mod fallback;
pub mod local;
pub mod memory;
pub mod rest;

pub use config::{create_store, load_config, QuizkitConfig, StoreConfig, StoreHandle};
pub use quizkit_core::error::StoreError;
