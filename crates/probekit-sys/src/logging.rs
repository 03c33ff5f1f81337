//! Console and file logging for the monitor.
//!
//! Every event is written twice, to stderr and to an append-mode log
//! file, as `YYYY-MM-DD HH:MM:SS,mmm | LEVEL | message`.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// File name used when no log path is given.
pub const LOG_FILE_NAME: &str = "system_health.log";

/// `time | LEVEL | message` event formatter.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipeFormat;

impl<S, N> FormatEvent<S, N> for PipeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} | {} | ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            level_name(event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Level names as they appear in the log file.
pub fn level_name(level: &Level) -> &'static str {
    if *level == Level::ERROR {
        "ERROR"
    } else if *level == Level::WARN {
        "WARNING"
    } else if *level == Level::INFO {
        "INFO"
    } else if *level == Level::DEBUG {
        "DEBUG"
    } else {
        "TRACE"
    }
}

/// `system_health.log` next to the running executable, or in the
/// working directory if the executable path is unknown.
pub fn default_log_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(LOG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME))
}

/// Open `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Build a subscriber that writes to stderr and to `file`.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn subscriber(file: File) -> impl Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(PipeFormat)
                .with_writer(io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(PipeFormat)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
}

/// Open the log file and install the global subscriber.
pub fn init(path: &Path) -> anyhow::Result<()> {
    let file = open_log_file(path)?;
    subscriber(file)
        .try_init()
        .context("failed to install log subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn warn_is_spelled_out() {
        assert_eq!(level_name(&Level::WARN), "WARNING");
        assert_eq!(level_name(&Level::INFO), "INFO");
        assert_eq!(level_name(&Level::ERROR), "ERROR");
    }

    #[test]
    fn default_path_uses_fixed_name() {
        assert!(default_log_path().ends_with(LOG_FILE_NAME));
    }

    #[test]
    fn lines_are_appended_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        std::fs::write(&path, "existing line\n").unwrap();

        let sub = subscriber(open_log_file(&path).unwrap());
        tracing::subscriber::with_default(sub, || {
            info!("first message");
            warn!("second message");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "existing line");
        assert!(lines[1].ends_with(" | INFO | first message"), "{}", lines[1]);
        assert!(lines[2].ends_with(" | WARNING | second message"), "{}", lines[2]);

        // "YYYY-MM-DD HH:MM:SS,mmm"
        let stamp = lines[1].split(" | ").next().unwrap();
        assert_eq!(stamp.len(), 23);
        assert_eq!(&stamp[19..20], ",");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_log_file(&dir.path().join("nope").join(LOG_FILE_NAME)).unwrap_err();
        assert!(err.to_string().contains("failed to open log file"));
    }
}
