//! Logging setup: console plus file, one pipe-separated line per event.
//!
//! Format: `<timestamp> | <LEVEL> | <message>`. Messages carry the
//! `[<target>]` prefix at the call sites that are scoped to a target.

use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

struct PipeFormat;

impl<S, N> FormatEvent<S, N> for PipeFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "{} | {} | ",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            level_label(event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Operator-facing severity names; WARN is spelled out.
fn level_label(level: &Level) -> &'static str {
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

/// Install the global subscriber: stdout plus a non-blocking file writer.
///
/// The returned guard must stay alive for the whole process so buffered
/// file output flushes on shutdown.
pub fn init(log_file: &Path) -> anyhow::Result<WorkerGuard> {
    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(directory)?;
    let file_name = log_file
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("vigild.log"));

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(PipeFormat)
                .with_ansi(false)
                .with_writer(std::io::stdout),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(PipeFormat)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    Ok(guard)
}
