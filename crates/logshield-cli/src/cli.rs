use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use logshield_core::{CardPolicy, Category, PolicyBuilder, PolicyConfig, RedactionPolicy};

#[derive(Parser, Debug)]
#[command(name = "logshield")]
#[command(about = "Mask sensitive data in log files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Policy file (TOML); overrides --profile
    #[arg(long, global = true, env = "LOGSHIELD_POLICY")]
    pub config: Option<PathBuf>,

    /// Named policy profile: default, strict, gdpr, pci_dss
    #[arg(long, global = true, env = "LOGSHIELD_PROFILE", default_value = "default")]
    pub profile: String,

    /// Also mask every remaining quoted value (allowlisted keys excepted)
    #[arg(long, global = true)]
    pub strict: bool,

    /// When card-shaped numbers are masked
    #[arg(long, global = true, value_enum)]
    pub card_policy: Option<CardPolicyArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a masked copy of a log file
    Mask(MaskArgs),

    /// Exit non-zero if a log file contains anything that would be masked
    Check {
        /// Log file to inspect
        file: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct MaskArgs {
    /// Log file to mask
    pub file: PathBuf,

    /// Output path (default: <stem>_masked.log next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the redaction ledger as JSON
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Print the masked log to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPolicyArg {
    Unconditional,
    PaymentContext,
}

impl From<CardPolicyArg> for CardPolicy {
    fn from(arg: CardPolicyArg) -> Self {
        match arg {
            CardPolicyArg::Unconditional => CardPolicy::Unconditional,
            CardPolicyArg::PaymentContext => CardPolicy::PaymentContext,
        }
    }
}

impl Cli {
    /// Resolve the policy from the config file or profile, then apply flag overrides.
    pub fn policy(&self) -> Result<RedactionPolicy> {
        let base = match &self.config {
            Some(path) => PolicyConfig::from_file(path)
                .and_then(PolicyConfig::into_policy)
                .with_context(|| format!("failed to load policy {}", path.display()))?,
            None => RedactionPolicy::from_profile(&self.profile)
                .ok_or_else(|| anyhow!("unknown profile: {}", self.profile))?,
        };

        let mut builder = PolicyBuilder::from_policy(base);
        if self.strict {
            builder = builder.enable(Category::GenericQuotedValue);
        }
        if let Some(card_policy) = self.card_policy {
            builder = builder.card_policy(card_policy.into());
        }
        Ok(builder.build())
    }
}
