//! Env-file output.
//!
//! One `KEY="VALUE"` line per entry. Only `"` is escaped, as `\"`.

use envetcd_types::{EnvEtcdError, EnvMap, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Escape a value for the double-quoted right-hand side.
pub fn escape_value(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Render `mapping` in env-file form.
pub fn render(mapping: &EnvMap) -> String {
    let mut out = String::new();
    for (key, value) in mapping {
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_value(value));
        out.push_str("\"\n");
    }
    out
}

/// Write `mapping` to `path`, creating or truncating it.
pub fn write_env_file(path: &Path, mapping: &EnvMap) -> Result<()> {
    let file_error = |source| EnvEtcdError::File {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(file_error)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render(mapping).as_bytes())
        .map_err(file_error)?;
    let file = writer.into_inner().map_err(|e| file_error(e.into_error()))?;
    file.sync_all().map_err(file_error)?;

    tracing::info!(path = %path.display(), entries = mapping.len(), "wrote env file");
    Ok(())
}
