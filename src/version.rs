//! Version information with embedded build metadata.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build timestamp (RFC 3339), or "unknown" if unavailable.
pub const BUILD_TIMESTAMP: &str = match option_env!("VERGEN_BUILD_TIMESTAMP") {
    Some(ts) => ts,
    None => "unknown",
};

/// Target triple the crate was compiled for, or "unknown".
pub const TARGET_TRIPLE: &str = match option_env!("VERGEN_CARGO_TARGET_TRIPLE") {
    Some(triple) => triple,
    None => "unknown",
};

/// Full version string: `{version} ({target}, built {timestamp})`.
///
/// Example: `0.3.0 (x86_64-unknown-linux-gnu, built 2026-10-19T08:12:44Z)`
pub fn version_string() -> String {
    format!("{PKG_VERSION} ({TARGET_TRIPLE}, built {BUILD_TIMESTAMP})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_pkg_version() {
        let version = version_string();
        assert!(
            version.starts_with(PKG_VERSION),
            "version should start with pkg version"
        );
    }

    #[test]
    fn version_string_mentions_build() {
        assert!(version_string().contains("built "));
    }
}
