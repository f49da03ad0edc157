//! Hierarchy Test Suite
//!
//! End-to-end behaviour of sports, events and selections through the
//! public [`sportsdb::SportsDb`] facade.
//!
//! ```bash
//! cargo test --test hierarchy
//! ```

mod test_utils;

mod cascade;
mod filter;
mod foreign_keys;
mod lifecycle;
mod persistence;
mod validation;
