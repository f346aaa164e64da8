//! Source formatting for rendered files.
//!
//! Formatting is cosmetic: a formatter failure is logged and the rendered text
//! is used unchanged. End-of-line conversion runs after formatting.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::config::EolStyle;
use crate::error::FormatError;

/// Canonicalizes generated TypeScript source
pub trait SourceFormatter: Send + Sync {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Closures can be used directly as formatters
impl<F> SourceFormatter for F
where
    F: Fn(&str) -> Result<String, FormatError> + Send + Sync,
{
    fn format(&self, source: &str) -> Result<String, FormatError> {
        self(source)
    }
}

/// Returns the source unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFormatter;

impl SourceFormatter for PassthroughFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        Ok(source.to_string())
    }
}

/// Pipes source through an external `prettier` process
#[derive(Debug, Clone)]
pub struct PrettierFormatter {
    program: String,
    args: Vec<String>,
}

impl Default for PrettierFormatter {
    fn default() -> Self {
        // Allow tests and CI to point at a different binary without touching PATH
        let program =
            std::env::var("CRUDFORGE_PRETTIER_BIN").unwrap_or_else(|_| "prettier".to_string());
        Self::new(program)
    }
}

impl PrettierFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![
                "--parser".to_string(),
                "typescript".to_string(),
                "--end-of-line".to_string(),
                "lf".to_string(),
            ],
        }
    }
}

impl SourceFormatter for PrettierFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FormatError(format!("failed to start {}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| FormatError("formatter stdin unavailable".to_string()))?;
        // Feed stdin from another thread so a full stdout pipe cannot deadlock us
        let input = source.to_string();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child
            .wait_with_output()
            .map_err(|e| FormatError(format!("{} did not finish: {}", self.program, e)))?;
        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(FormatError(format!("failed to write source: {}", e))),
            Err(_) => return Err(FormatError("formatter input thread panicked".to_string())),
        }

        if !output.status.success() {
            return Err(FormatError(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| FormatError(format!("formatter produced invalid UTF-8: {}", e)))
    }
}

/// Format `rendered`, falling back to the raw text on failure, then apply `eol`
pub fn format_or_raw(formatter: &dyn SourceFormatter, rendered: String, eol: EolStyle, label: &str) -> String {
    let formatted = match formatter.format(&rendered) {
        Ok(formatted) => formatted,
        Err(e) => {
            tracing::warn!("Formatting {} failed, keeping unformatted source: {}", label, e);
            rendered
        }
    };
    convert_eol(&formatted, eol)
}

/// Normalize line endings to `eol`
pub fn convert_eol(source: &str, eol: EolStyle) -> String {
    let normalized = source.replace("\r\n", "\n");
    match eol {
        EolStyle::Lf => normalized,
        EolStyle::Crlf => normalized.replace('\n', eol.terminator()),
    }
}
