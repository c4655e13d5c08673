// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-env-changed=CAMERA_SHELL_VERSION");

    // Packaged builds (e.g. the Android gradle task) pass the version in explicitly
    let version = std::env::var("CAMERA_SHELL_VERSION")
        .ok()
        .or_else(git_version)
        .unwrap_or_else(|| std::env::var("CARGO_PKG_VERSION").unwrap_or_default());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// `git describe` output with the leading `v` stripped, `None` outside a checkout.
fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--match", "v*"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Some(
        described
            .strip_prefix('v')
            .map(str::to_string)
            .unwrap_or(described),
    )
}
