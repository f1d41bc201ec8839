//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust,ignore
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Management user name configured on mocked endpoints.
pub const USERNAME: &str = "admin";

/// Management password configured on mocked endpoints.
pub const PASSWORD: &str = "secret";

/// REST root appended to the mock server URL.
pub const API_ROOT: &str = "/api/rest";

/// Well-formed UUID never assigned by an array.
pub const UNKNOWN_ID: &str = "f98de58e-9223-4fdc-86bd-d4ff268e20e1";
