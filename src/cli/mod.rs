//! CLI operation handlers.
//!
//! - [`bootstrap`]: Builds a [`beacon::CiReporter`] from configuration
//! - [`migrations`]: Audit database schema migrations
//! - [`operations`]: One handler per [`beacon::config::OperationMode`]
//!
//! Output formatting utilities are in [`output`].

pub mod bootstrap;
pub mod migrations;
pub mod operations;
pub mod output;
