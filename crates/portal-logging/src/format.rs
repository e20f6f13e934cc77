//! Log line format.

use std::{fmt, path::Path};

use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
};

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second],[subsecond digits:3]"
);

/// Formats events as `[timestamp] {file#function:line} LEVEL - message`.
///
/// The function is the innermost span name, which matches the function
/// name for `#[tracing::instrument]` spans. Events outside any span use
/// their target instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFormat;

impl<S, N> FormatEvent<S, N> for LogFormat
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
        let metadata = event.metadata();
        let timestamp = OffsetDateTime::now_utc()
            .format(TIMESTAMP_FORMAT)
            .map_err(|_| fmt::Error)?;
        let file = metadata
            .file()
            .and_then(|f| Path::new(f).file_name())
            .and_then(|f| f.to_str())
            .unwrap_or("<unknown>");
        let function = ctx
            .event_scope()
            .and_then(|mut scope| scope.next())
            .map(|span| span.name())
            .unwrap_or_else(|| metadata.target());
        let line = metadata.line().unwrap_or(0);

        write!(
            writer,
            "[{timestamp}] {{{file}#{function}:{line}}} {} - ",
            metadata.level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
