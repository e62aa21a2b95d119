use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI with an isolated data directory against `api_url`.
pub fn run_cli_with_env(args: &[&str], data_dir: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_marquee"));
    cmd.args(args);
    cmd.env("MARQUEE_DATA_DIR", data_dir);
    cmd.env("MARQUEE_API_URL", api_url);
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI with an isolated data directory and expect success.
pub fn run_cli_with_env_success(args: &[&str], data_dir: &Path, api_url: &str) -> String {
    let output = run_cli_with_env(args, data_dir, api_url);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI with an isolated data directory and expect failure.
pub fn run_cli_with_env_failure(args: &[&str], data_dir: &Path, api_url: &str) -> String {
    let output = run_cli_with_env(args, data_dir, api_url);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
