//! Integration tests
//!
//! `inventory_flow` runs against the library with an in-memory store.
//! `api_tests` needs a running server and is ignored by default.

mod api_tests;
mod inventory_flow;
