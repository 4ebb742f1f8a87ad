use git_version::git_version;
use serde::Serialize;

// include -modified if the working tree has uncommitted changes
const COMMIT: &str = git_version!(
    args = ["--abbrev=10", "--always", "--dirty=-modified"],
    fallback = "unknown"
);

/// Build metadata reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub package: &'static str,
    pub version: String,
    pub commit: &'static str,
    pub profile: &'static str,
}

pub fn build_info() -> BuildInfo {
    let profile = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    let latest = option_env!("LATEST_TAG").unwrap_or("");
    let ahead = option_env!("COMMITS_AHEAD").unwrap_or("");
    let version = match option_env!("RELEASE_VERSION") {
        Some(tag) if !tag.is_empty() => format!("release {tag}"),
        _ if !latest.is_empty() && !ahead.is_empty() => {
            format!("development, {ahead} commits ahead of {latest}")
        }
        _ if !latest.is_empty() => format!("development, ahead of {latest}"),
        _ => format!("development {}", env!("CARGO_PKG_VERSION")),
    };

    BuildInfo {
        package: env!("CARGO_PKG_NAME"),
        version,
        commit: COMMIT,
        profile,
    }
}

/// One-line summary for the startup log.
pub fn get_system_info() -> String {
    let info = build_info();
    format!(
        "{} {} (commit {}, {} build)",
        info.package, info.version, info.commit, info.profile
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_system_info() {
        let info = get_system_info();
        assert!(info.starts_with("plategate "));
        assert!(info.contains(COMMIT));
        assert!(info.contains("dev build") || info.contains("release build"));
    }
}
