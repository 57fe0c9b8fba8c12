//! Logging setup for hosts that embed the pixmosh kernels.
//!
//! The library itself only talks to the `log` facade. A host that wants to see
//! the pipeline's stage reports calls [`enable_verbose_logging`] once, which
//! installs an `env_logger` backend writing `[LEVEL] message` lines to stderr or
//! to an append-mode file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::PixmoshError;

static INIT_LOGGER: Once = Once::new();

/// Installs the process-wide logger at `Info` level.
///
/// Only the first successful call has any effect; once a logger is installed
/// later calls return immediately and never touch `log_file`. Opening
/// `log_file` is the only thing that can fail, in which case no logger is
/// installed and a later call may try again.
pub fn enable_verbose_logging(log_file: Option<&Path>) -> Result<(), PixmoshError> {
    if INIT_LOGGER.is_completed() {
        return Ok(());
    }
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
