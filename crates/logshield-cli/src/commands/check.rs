use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use logshield_core::Redactor;

/// Report every redaction a mask run would make, as `path:line: token`.
///
/// Returns the number of findings; the original values are never printed.
pub fn run(redactor: &Redactor, file: &Path, out: &mut impl Write) -> Result<usize> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let result = redactor.scan(&content);

    for record in &result.redactions {
        writeln!(
            out,
            "{}:{}: {}",
            file.display(),
            record.line_number,
            record.masked
        )?;
    }

    if result.is_clean() {
        eprintln!("logshield: {} is clean", file.display());
    } else {
        eprintln!(
            "logshield: {} finding(s) in {}",
            result.redactions.len(),
            file.display()
        );
    }

    Ok(result.redactions.len())
}
