//! Logging and diagnostics for classification and transcoding.
//!
//! The library only ever emits through the `log` facade. Hosts that want to see
//! the output call [`enable_verbose_logging`] once; everything else is silent.
//! The `log_metric!` macro is for structured key-value events that are useful when
//! chasing down why a column was classified or transcoded the way it was.

use crate::error::TabwireError;
use log::LevelFilter;
use std::fs::OpenOptions;
use std::sync::Once;

/// Logs a structured key-value metric string at debug level.
///
/// # Example
/// ```ignore
/// let rows = 4;
/// log_metric!("event"="serialize_column", "column"="tags", "rows"=&rows);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            log::debug!("TABWIRE_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend at `Debug` level, writing `[LEVEL] message`
/// lines to stderr or, if `log_file` is given, appending them to that file.
///
/// Only the first call has any effect. A logger installed by someone else is left alone.
pub fn enable_verbose_logging(log_file: Option<&str>) -> Result<(), TabwireError> {
    // Open the file outside the Once so a bad path is reported instead of panicking.
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Debug);

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_verbose_logging_is_idempotent() {
        assert!(enable_verbose_logging(None).is_ok());
        assert!(enable_verbose_logging(None).is_ok());
        log_metric!("event" = "test", "value" = 1);
    }

    #[test]
    fn test_unopenable_log_file_is_reported() {
        let result = enable_verbose_logging(Some("/nonexistent-dir/tabwire/log.txt"));
        assert!(matches!(result, Err(TabwireError::Io(_))));
    }
}
