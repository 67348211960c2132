use std::path::{Path, PathBuf};
use std::process::Command;

use crate::app::{BinderyError, Result};
use crate::config::ConverterConfig;

/// Result of converting the book into one format.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub format: String,
    pub result: Result<PathBuf>,
}

/// Drives an external converter (calibre's `ebook-convert` by default).
///
/// Invoked once per format as `<program> <index> <target> --title <t> --authors <a>`.
pub struct Converter {
    program: String,
    formats: Vec<String>,
    output_name: String,
}

impl Converter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            program: config.program.clone(),
            formats: config.formats.clone(),
            output_name: config.output_name.clone(),
        }
    }

    /// Convert into every configured format.
    ///
    /// A failing format is recorded and the next one is still attempted.
    /// The converter runs in the parent of the HTML directory and writes its
    /// targets there, never inside the HTML directory.
    pub fn convert_all(&self, index: &Path, title: &str, author: &str) -> Vec<ConversionOutcome> {
        let target_dir = index
            .parent()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let index_arg = index.strip_prefix(target_dir).unwrap_or(index);

        self.formats
            .iter()
            .map(|format| {
                let file_name = format!("{}.{}", self.output_name, format);
                let result = self
                    .convert(target_dir, index_arg, &file_name, title, author)
                    .map(|()| target_dir.join(&file_name));
                match &result {
                    Ok(path) => tracing::info!("Converted {} to {}", format, path.display()),
                    Err(e) => tracing::warn!("Conversion to {} failed: {}", format, e),
                }
                ConversionOutcome {
                    format: format.clone(),
                    result,
                }
            })
            .collect()
    }

    fn convert(
        &self,
        dir: &Path,
        index: &Path,
        target: &str,
        title: &str,
        author: &str,
    ) -> Result<()> {
        let output = Command::new(&self.program)
            .current_dir(dir)
            .arg(index)
            .arg(target)
            .args(["--title", title, "--authors", author])
            .output()
            .map_err(|e| BinderyError::Converter(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().last().unwrap_or("").trim();
            return Err(BinderyError::Converter(format!(
                "{} exited with {}: {}",
                self.program, output.status, last_line
            )));
        }

        Ok(())
    }
}
