//! Unit tests for configuration loading and precedence.
//!
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence and defaults
//! - `operation_mode`: Operation selection
//! - `field_resolution`: Token, locator, PR number and status request resolution

mod helpers;
