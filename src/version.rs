// Version information for the leukocoria screening API

/// Path segment of the real detection surface
pub const VERSION: &str = "v1.0.0";

/// Path segment of the random-result surface
pub const MOCK_VERSION: &str = "vmock";

/// Crate version of this build
pub const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Leukocoria API {} (build {})", VERSION, BUILD_VERSION)
}
