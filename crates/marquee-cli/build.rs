//! Stamps the binary's `--version` with the commit it was built from.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-env-changed=MARQUEE_BUILD_COMMIT");

    let package = env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let commit = env::var("MARQUEE_BUILD_COMMIT")
        .ok()
        .filter(|c| !c.trim().is_empty())
        .or_else(short_commit);

    let version = match commit {
        Some(commit) => format!("{package} ({})", commit.trim()),
        None => package,
    };
    println!("cargo:rustc-env=MARQUEE_VERSION={version}");
}

/// Abbreviated hash of HEAD, with `-dirty` if the tree has local changes.
fn short_commit() -> Option<String> {
    let head = git(&["rev-parse", "--short=10", "HEAD"])?;
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .is_some_and(|status| !status.is_empty());
    Some(if dirty { format!("{head}-dirty") } else { head })
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}
