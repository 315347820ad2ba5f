use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::Parser;
use ghtv_core::report::ReportOptions;
use ghtv_core::validator::{DEFAULT_ENDPOINT, ValidatorConfig};

/// Validate GitHub OAuth and personal access tokens.
#[derive(Parser, Debug)]
#[command(name = "ghtv", version, about)]
pub struct Cli {
    /// GitHub token to validate
    #[arg(short = 'k', value_name = "TOKEN", conflicts_with = "file")]
    pub key: Option<String>,

    /// File containing tokens (one per line)
    #[arg(short = 'f', value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Number of concurrent workers when validating a file
    #[arg(
        short = 't',
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub threads: u64,

    /// Retrieve and display user details and scopes for valid tokens
    #[arg(short = 'i')]
    pub info: bool,

    /// Retrieve and display private repositories for valid tokens
    #[arg(short = 'p')]
    pub private_repos: bool,

    /// Show invalid tokens
    #[arg(short = 'd')]
    pub show_invalid: bool,

    /// GitHub API endpoint to use for validation
    #[arg(short = 'e', value_name = "URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Remove color from output
    #[arg(long)]
    pub remove_color: bool,
}

/// What the invocation asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Mode<'a> {
    Single(&'a str),
    Batch(&'a Path),
    Usage,
}

impl Cli {
    pub fn mode(&self) -> Mode<'_> {
        match (self.key.as_deref(), self.file.as_deref()) {
            (Some(key), _) if !key.is_empty() => Mode::Single(key),
            (_, Some(file)) if !file.as_os_str().is_empty() => Mode::Batch(file),
            _ => Mode::Usage,
        }
    }

    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            endpoint: self.endpoint.clone(),
            retrieve_identity: self.info,
            retrieve_resources: self.private_repos,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            show_invalid: self.show_invalid,
            remove_color: self.remove_color,
        }
    }

    pub fn concurrency(&self) -> NonZeroUsize {
        usize::try_from(self.threads)
            .ok()
            .and_then(NonZeroUsize::new)
            .unwrap_or(NonZeroUsize::MIN)
    }
}
