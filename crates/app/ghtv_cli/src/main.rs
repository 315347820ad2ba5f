//! ghtv — validate GitHub tokens one at a time or in bulk.

// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::sync::Arc;

use clap::{CommandFactory, Parser};
use cli::{Cli, Mode};
use ghtv_core::batch::run_batch;
use ghtv_core::credentials::load_credentials;
use ghtv_core::report::Reporter;
use ghtv_core::validator::Validator;

mod cli;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();
    let reporter = Reporter::stdout(args.report_options());

    match args.mode() {
        Mode::Single(token) => {
            let validator = Validator::new(args.validator_config())?;
            let outcome = validator.validate(token).await;
            reporter.report(token, &outcome)?;
        }
        Mode::Batch(path) => {
            let credentials = load_credentials(path)?;
            let validator = Arc::new(Validator::new(args.validator_config())?);
            run_batch(validator, credentials, args.concurrency(), Arc::new(reporter)).await;
        }
        Mode::Usage => {
            println!("Please specify a token (-k) or a file (-f) containing tokens.");
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
