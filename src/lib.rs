//! Provider-routing query tools.
//!
//! The crate maps a free-text question to one of several response
//! strategies (weather lookup, canned language-model answer, guided
//! fallback) based on which provider credentials are configured, and
//! exposes the result as a displayable answer with an optional step trace.

/// CLI command implementations.
pub mod commands;
/// Credential store persistence.
pub mod config;
/// Query routing core.
pub mod dispatch;
