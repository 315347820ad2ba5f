//! Text output for validation outcomes.
//!
//! Each outcome is rendered to one block and written with a single call under
//! the sink's lock, so blocks from concurrent workers never interleave.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::models::{Identity, ValidationOutcome};

const GREEN: &str = "32";
const RED: &str = "31";
const MISSING: &str = "-";

/// How outcomes are rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Print rejected tokens too.
    pub show_invalid: bool,
    /// Plain text without ANSI styling.
    pub remove_color: bool,
}

/// Writes rendered outcomes to a shared sink.
pub struct Reporter {
    options: ReportOptions,
    out: Mutex<Box<dyn Write + Send>>,
}

impl Reporter {
    pub fn new(options: ReportOptions, out: impl Write + Send + 'static) -> Self {
        Self {
            options,
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn stdout(options: ReportOptions) -> Self {
        Self::new(options, io::stdout())
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.options.remove_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        }
    }

    /// Render one outcome, or `None` when it is suppressed.
    pub fn render(&self, credential: &str, outcome: &ValidationOutcome) -> Option<String> {
        if !outcome.valid {
            if !self.options.show_invalid {
                return None;
            }
            let line = self.colorize(&format!("Invalid token: {credential}"), RED);
            return Some(format!("{line}\n"));
        }

        let mut lines = vec![self.colorize(&format!("Valid token: {credential}"), GREEN)];

        if let Some(identity) = &outcome.identity {
            lines.extend(identity_lines(identity));
            lines.push(format!("Scopes: [{}]", outcome.scopes.join(", ")));
        }

        if let Some(resources) = &outcome.resources {
            lines.push("Private Repositories:".to_string());
            lines.extend(resources.iter().map(|r| format!("- {} ({})", r.name, r.url)));
        }

        let mut block = lines.join("\n");
        block.push('\n');
        Some(block)
    }

    /// Render and write one outcome. Suppressed outcomes write nothing.
    pub fn report(&self, credential: &str, outcome: &ValidationOutcome) -> io::Result<()> {
        let Some(block) = self.render(credential, outcome) else {
            return Ok(());
        };

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(block.as_bytes())?;
        out.flush()
    }
}

fn identity_lines(identity: &Identity) -> Vec<String> {
    let two_factor = match identity.two_factor_authentication {
        Some(true) => "enabled",
        Some(false) => "disabled",
        None => MISSING,
    };

    vec![
        "User Info:".to_string(),
        format!("  Login: {}", identity.login),
        format!("  ID: {}", identity.id),
        format!("  Name: {}", or_missing(&identity.name)),
        format!("  Email: {}", or_missing(&identity.email)),
        format!("  Bio: {}", or_missing(&identity.bio)),
        format!("  Company: {}", or_missing(&identity.company)),
        format!("  Type: {}", or_missing(&identity.account_type)),
        format!("  Two-factor auth: {two_factor}"),
    ]
}

fn or_missing(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(MISSING)
}
