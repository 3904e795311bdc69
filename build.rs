use std::env;
use std::process::Command;

fn main() {
    let revision = git_revision().unwrap_or_else(|| "unknown".to_string());
    let build_date = chrono::Utc::now().format("%Y-%m-%d");

    println!("cargo:rustc-env=SDKSYNC_REVISION={revision}");
    println!("cargo:rustc-env=SDKSYNC_BUILD_DATE={build_date}");
    println!(
        "cargo:rustc-env=SDKSYNC_BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=templates/sdksync.yaml");
}

/// Short hash of the checked out commit, if built from a git checkout
fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let revision = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!revision.is_empty()).then_some(revision)
}
