// Build script: expose CODE_CONTEXT_VERSION from `git describe`, falling back
// to the package version when git or tags are unavailable

use std::process::Command;

fn main() {
    let package = env!("CARGO_PKG_VERSION");
    let version = describe()
        .map(|described| version_from_describe(package, &described))
        .unwrap_or_else(|| package.to_string());

    println!("cargo:rustc-env=CODE_CONTEXT_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    Some(described.trim().to_string())
}

/// "v1.2.0" and "v1.2.0-3-gabc123" map to "1.2.0"; a bare hash is appended
/// to the package version
fn version_from_describe(package: &str, described: &str) -> String {
    match described.strip_prefix('v') {
        Some(tagged) => tagged.split('-').next().unwrap_or(tagged).to_string(),
        None => format!("{}-{}", package, described),
    }
}
