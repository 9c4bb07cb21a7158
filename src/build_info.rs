/// Build-time git commit SHA stamped by build.rs when available.
pub fn git_sha() -> Option<&'static str> {
    option_env!("FLOWTIME_BUILD_GIT_SHA")
}

/// Version string for `--version`, with the commit appended when known.
pub fn long_version() -> String {
    match git_sha() {
        Some(sha) => format!("{} ({})", env!("CARGO_PKG_VERSION"), &sha[..sha.len().min(12)]),
        None => env!("CARGO_PKG_VERSION").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_version_starts_with_package_version() {
        assert!(long_version().starts_with(env!("CARGO_PKG_VERSION")));
    }
}
