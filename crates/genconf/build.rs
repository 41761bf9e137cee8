//! Stamps the binary with its commit, build date and cargo profile

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn main() {
    // Packagers building from a tarball can pass the commit explicitly
    let commit = std::env::var("GENCONF_COMMIT")
        .ok()
        .or_else(|| git(&["describe", "--always", "--dirty", "--exclude", "*"]));
    if let Some(commit) = commit {
        println!("cargo:rustc-env=GENCONF_COMMIT={}", commit);
    }

    println!(
        "cargo:rustc-env=GENCONF_BUILD_DATE={}",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    if let Ok(profile) = std::env::var("PROFILE") {
        println!("cargo:rustc-env=GENCONF_PROFILE={}", profile);
    }

    println!("cargo:rerun-if-env-changed=GENCONF_COMMIT");
    println!("cargo:rerun-if-changed=build.rs");
}
