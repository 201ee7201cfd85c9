//! Integration tests for the VTU dashboard client state.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vtu-dashboard-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_restore` - Sessions written by one store and restored by another
//! - `user_isolation` - Per-user cart and wishlist across sign-in and sign-out
//! - `shared_storage` - Several stores over one storage medium
//!
//! This library holds the fixtures the test files share.

#![cfg_attr(not(test), forbid(unsafe_code))]

use secrecy::SecretString;
use serde_json::json;
use tempfile::TempDir;
use vtu_dashboard_client::{
    ClientStateStore, FileStorage, FixedClock, KeyValueStorage, SessionCodec,
};
use vtu_dashboard_core::{ProductId, UserSession};

/// Secret used by every test codec.
pub const TEST_SECRET: &str = "hJ4&kL7*mN0(qW3)eR6!tY9@uI2#oP5$";

/// Fixed "now" used by test clocks (2024-01-15T12:00:00Z).
pub const TEST_NOW_MS: i64 = 1_705_320_000_000;

/// One hour in milliseconds.
pub const HOUR_MS: i64 = 60 * 60 * 1000;

/// Build the codec shared by all test stores.
///
/// # Panics
///
/// Panics if key derivation fails.
#[must_use]
#[allow(clippy::expect_used)]
pub fn codec() -> SessionCodec {
    SessionCodec::new(&SecretString::from(TEST_SECRET)).expect("test codec")
}

/// Open a store over `storage` with a fixed clock.
pub fn open_store<S: KeyValueStorage>(
    storage: S,
    clock: &FixedClock,
) -> ClientStateStore<S, FixedClock> {
    ClientStateStore::open(storage, codec(), clock.clone())
}

/// A file-backed storage in a fresh temporary directory.
///
/// The directory is deleted when the returned guard drops.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
#[allow(clippy::expect_used)]
pub fn temp_file_storage() -> (TempDir, FileStorage) {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = FileStorage::new(dir.path().join("state").join("storage.json"));
    (dir, storage)
}

/// A customer session as the backend issues it.
///
/// # Panics
///
/// Panics if `id` is not a valid user id.
#[must_use]
#[allow(clippy::expect_used)]
pub fn customer(id: &str) -> UserSession {
    serde_json::from_value(json!({
        "_id": id,
        "role": "user",
        "email": format!("{id}@example.com"),
        "token": format!("token-{id}"),
    }))
    .expect("customer session")
}

/// Parse a product id.
///
/// # Panics
///
/// Panics if `id` is blank or too long.
#[must_use]
#[allow(clippy::expect_used)]
pub fn pid(id: &str) -> ProductId {
    ProductId::parse(id).expect("product id")
}
