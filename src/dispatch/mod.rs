//! Query routing core.
//!
//! The module contains the provider registry, the dispatch routine that
//! maps a free-text query to exactly one response strategy, and the
//! weather client used by the weather strategy.

/// Query-to-strategy planning and dispatch.
pub mod dispatcher;
/// Configured provider credentials.
pub mod registry;
/// Response and trace-step types.
pub mod response;
/// OpenWeatherMap current-weather client.
pub mod weather;
