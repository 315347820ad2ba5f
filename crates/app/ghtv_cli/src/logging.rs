use std::io::Write;

use flexi_logger::{DeferredNow, Logger};
use log::Record;

use crate::Error;

/// Diagnostics go to stderr; stdout carries only the token report.
pub fn init() -> Result<(), Error> {
    Logger::try_with_env_or_str("info")?
        .format(cli_format)
        .log_to_stderr()
        .start()?;

    Ok(())
}

fn cli_format(w: &mut dyn Write, _now: &mut DeferredNow, record: &Record) -> std::io::Result<()> {
    write!(w, "{:<5} {}", record.level(), record.args())
}
