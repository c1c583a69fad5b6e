//! Loan config from a JSON file or piped stdin.

use loan_payoff_core::LoanConfig;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Load a [`LoanConfig`] from `path`, or from stdin when data is piped.
///
/// Returns `Ok(None)` when neither source is available, so the caller can
/// fall back to individual flags.
pub fn read_loan_config(path: Option<&str>) -> Result<Option<LoanConfig>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        let file = resolve_path(path)?;
        let contents = fs::read_to_string(&file)
            .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse loan config '{}': {}", file.display(), e))?;
        return Ok(Some(config));
    }

    match read_stdin()? {
        Some(data) => {
            let config = serde_json::from_str(&data)
                .map_err(|e| format!("Failed to parse loan config from stdin: {}", e))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Piped stdin contents, or `None` for an interactive terminal or empty input.
fn read_stdin() -> Result<Option<String>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = PathBuf::from(path);
    let resolved = if p.is_absolute() {
        p
    } else {
        std::env::current_dir()?.join(p)
    };

    if !resolved.is_file() {
        return Err(format!("Loan config not found: {}", resolved.display()).into());
    }
    Ok(resolved)
}
