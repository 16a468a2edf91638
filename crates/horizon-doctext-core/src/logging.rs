//! Logging facilities for Horizon Doctext.
//!
//! Horizon Doctext uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in the embedding application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_doctext::dedupe=debug")
//!     .init();
//! ```
//!
//! Every event emitted by the document text model carries one of the
//! [`targets`] below, so individual subsystems can be filtered.

/// Span names used throughout Horizon Doctext for tracing.
pub mod span_names {
    /// A single linearization call.
    pub const LINEARIZE: &str = "horizon_doctext::linearize";
    /// A single unit move.
    pub const MOVE: &str = "horizon_doctext::move";
    /// Waiting for the selection to change after a forwarded gesture.
    pub const TAB_WAIT: &str = "horizon_doctext::tab_wait";
}

/// Target names for log filtering.
pub mod targets {
    /// Text linearizer.
    pub const LINEARIZE: &str = "horizon_doctext::linearize";
    /// Duplicate span eliminator and structure validation.
    pub const DEDUPE: &str = "horizon_doctext::dedupe";
    /// Field extraction.
    pub const EXTRACT: &str = "horizon_doctext::extract";
    /// Unit navigation.
    pub const NAVIGATE: &str = "horizon_doctext::navigate";
    /// Browse-mode policy and gesture handling.
    pub const BROWSE: &str = "horizon_doctext::browse";
    /// Calls into the tree provider.
    pub const PROVIDER: &str = "horizon_doctext::provider";
    /// Configuration loading.
    pub const CONFIG: &str = "horizon_doctext_core::config";
}
