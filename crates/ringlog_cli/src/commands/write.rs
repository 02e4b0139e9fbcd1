//! Write command implementation.

use super::CliResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error};

/// Runs the write command.
///
/// Creates or truncates `file` and writes `text` to it. The parent
/// directory must already exist.
pub fn run(file: &Path, text: &str) -> CliResult<()> {
    debug!("Writing {} to {}", text, file.display());

    let result = File::create(file).and_then(|mut f| {
        f.write_all(text.as_bytes())?;
        f.flush()
    });
    if let Err(err) = &result {
        error!(path = %file.display(), error = %err, "write failed");
    }
    Ok(result?)
}
