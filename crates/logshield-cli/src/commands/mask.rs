use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use logshield_core::{ledger, Redactor};
use tracing::info;

use crate::cli::MaskArgs;

/// What a mask run produced.
#[derive(Debug)]
pub struct MaskOutcome {
    /// `None` when the masked log went to stdout
    pub output: Option<PathBuf>,
    pub redactions: usize,
}

/// Mask one file. The masked log goes to `out` with `--stdout`, otherwise
/// to the output path; the summary always goes to stderr.
pub fn run(redactor: &Redactor, args: &MaskArgs, out: &mut impl Write) -> Result<MaskOutcome> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let result = redactor.scan(&content);

    let output = if args.stdout {
        out.write_all(result.masked_log.as_bytes())?;
        out.flush()?;
        None
    } else {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| default_output(&args.file));
        std::fs::write(&path, &result.masked_log)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Some(path)
    };

    if let Some(ledger_path) = &args.ledger {
        let json = serde_json::to_string_pretty(&result.redactions)?;
        std::fs::write(ledger_path, json)
            .with_context(|| format!("failed to write {}", ledger_path.display()))?;
    }

    info!(
        file = %args.file.display(),
        redactions = result.redactions.len(),
        "masked"
    );

    if result.is_clean() {
        eprintln!("logshield: nothing to mask in {}", args.file.display());
    } else {
        eprintln!(
            "logshield: {} redaction(s) in {}",
            result.redactions.len(),
            args.file.display()
        );
        for (token, count) in ledger::summarize(&result.redactions) {
            eprintln!("  {token:<24} {count}");
        }
    }
    if let Some(path) = &output {
        eprintln!("logshield: wrote {}", path.display());
    }

    Ok(MaskOutcome {
        output,
        redactions: result.redactions.len(),
    })
}

/// `<stem>_masked.log` beside the input.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("log");
    input.with_file_name(format!("{stem}_masked.log"))
}
