//! Embeds `git describe` output as ATLAS_VERSION.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let version = describe().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=ATLAS_VERSION={}", version);
}

/// `git describe --tags --always`, without a leading `v`.
fn describe() -> Option<String> {
    Command::new("git")
        .args(["describe", "--tags", "--always"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|raw| raw.trim().trim_start_matches('v').to_string())
        .filter(|version| !version.is_empty())
}
