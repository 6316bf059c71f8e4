//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, ALICE_EMAIL};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_feed() {
//!     let server = TestServer::spawn().await;
//!     let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
//!
//!     let response = alice.get_feed().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{raw_profile, raw_track};
pub use server::TestServer;
