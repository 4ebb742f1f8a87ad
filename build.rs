use std::process::Command;

fn git(args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default()
}

fn main() {
    // sqlx::migrate! embeds the SQL files at compile time.
    println!("cargo:rerun-if-changed=migrations");

    // Expose HEAD's tag if it's a release commit.
    let tag = git(&["describe", "--tags", "--exact-match"]);
    println!("cargo:rustc-env=RELEASE_VERSION={}", tag);

    let latest = git(&["describe", "--tags", "--abbrev=0"]);
    println!("cargo:rustc-env=LATEST_TAG={}", latest);

    // Count commits since the latest tag so dev builds show how far ahead they are.
    let ahead = if latest.is_empty() {
        String::new()
    } else {
        git(&["rev-list", "--count", &format!("{}..HEAD", latest)])
    };
    println!("cargo:rustc-env=COMMITS_AHEAD={}", ahead);
}
