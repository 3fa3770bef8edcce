pub mod macros;

/// Returns the version of this build.
pub fn portfolio_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
