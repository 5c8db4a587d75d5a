//! Stamps the binary with the metadata logged by `--debug`.

use std::process::Command;

fn main() {
    emit_env("BUILD_TIME", &chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string());

    // GIT_COMMIT stays unset outside a checkout; the crate reads it with option_env!.
    if let Some(commit) = short_commit() {
        emit_env("GIT_COMMIT", &commit);
    }

    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    emit_env("TARGET_TRIPLE", &target);

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
}

fn emit_env(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!commit.is_empty()).then_some(commit)
}
