//! Core types for Horizon Doctext.
//!
//! This crate provides the ambient pieces shared by the document text model
//! and its consumers:
//!
//! - **Errors**: the [`Error`] taxonomy and [`Result`] alias
//! - **Logging**: `tracing` targets and span names for filtering
//! - **Configuration**: [`TextModelConfig`], loaded from TOML or built in code
//! - **Units**: [`TextUnit`] and [`Endpoint`], the vocabulary of range movement

pub mod config;
pub mod logging;
pub mod unit;

mod error;

pub use config::{TabConfig, TextModelConfig};
pub use error::{Error, Result};
pub use unit::{Endpoint, TextUnit};
