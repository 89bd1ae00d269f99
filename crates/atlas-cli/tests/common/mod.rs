use std::path::Path;
use std::process::{Command, Output};

use url::Url;

/// File URL for a Data API rooted at `path`.
pub fn file_api_url(path: &Path) -> String {
    Url::from_directory_path(path)
        .expect("Failed to convert path to file URL")
        .to_string()
}

/// A CLI command isolated from the user's config and environment.
pub fn cli(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_atlas"));
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd.env("NO_COLOR", "1");
    for var in [
        "ATLAS_CONFIG",
        "ATLAS_REGION",
        "ATLAS_DATA_API_URL",
        "ATLAS_GATEWAY_URL",
        "ATLAS_BIND",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Run the CLI with arguments.
pub fn run_cli(home: &Path, args: &[&str]) -> Output {
    cli(home).args(args).output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let output = run_cli(home, args);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}
