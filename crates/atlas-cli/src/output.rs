//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use atlas_http::RawResponse;

/// Print a success message.
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as JSON, pretty or compact.
pub fn json_as<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    if pretty { json_pretty(value) } else { json(value) }
}

/// Print the status and body of a raw call.
pub fn status_and_body(response: &RawResponse) {
    let status = response.status.to_string();
    let status = if response.is_success() {
        status.green()
    } else {
        status.red()
    };
    println!("{}: {}", "Status".dimmed(), status);
    println!("{}: {}", "Response".dimmed(), response.body);
}
