//! CLI command implementations shared by the `qroute` and `qask` binaries.

/// `ask` command: dispatch a query and render the response.
pub mod ask;
/// `config` command: manage the persisted credential store.
pub mod config;
