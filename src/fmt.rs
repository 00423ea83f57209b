//! Tick-stamped log formatting.

use std::cell::Cell;
use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::types::Tick;

thread_local! {
    /// Tick of the most recent engine activity on this thread. Display only.
    static LOG_TICK: Cell<Tick> = const { Cell::new(0) };
}

/// Record the tick shown in log lines emitted from this thread.
pub fn set_log_tick(tick: Tick) {
    LOG_TICK.with(|t| t.set(tick));
}

/// The tick shown in log lines emitted from this thread.
pub fn log_tick() -> Tick {
    LOG_TICK.with(|t| t.get())
}

/// Format a u64 with underscore grouping (groups of 3 from the right).
pub(crate) fn fmt_grouped(v: u64) -> String {
    let digits = v.to_string();
    let len = digits.len();
    if len <= 3 {
        return digits;
    }
    let mut result = String::with_capacity(len + (len - 1) / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push('_');
        }
        result.push(ch);
    }
    result
}

/// Right-aligned, underscore-grouped tick stamp: `[t=     1_024]`.
pub struct FmtTick(pub Tick);

impl fmt::Display for FmtTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:>9}", fmt_grouped(self.0))
    }
}

/// `tracing` event formatter that stamps each line with the simulated tick.
///
/// Lines read `[t=       42]  INFO COMPLETED core=0 pid=3 name=editor`. The
/// `tick` field is dropped since the stamp already carries it, and counters
/// are underscore-grouped like the stamp.
pub struct SimFormat;

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

impl<S, N> FormatEvent<S, N> for SimFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = *event.metadata().level();
        let mut line = EventLine::default();
        event.record(&mut line);

        write!(writer, "[{}] ", FmtTick(line.tick.unwrap_or_else(log_tick)))?;
        if writer.has_ansi_escapes() {
            write!(writer, "{}{level:>5}\x1b[0m ", level_color(level))?;
        } else {
            write!(writer, "{level:>5} ")?;
        }
        write!(writer, "{}", line.message)?;
        for (key, value) in &line.fields {
            write!(writer, " {key}={value}")?;
        }
        writeln!(writer)
    }
}

/// Message, explicit tick and remaining `key=value` pairs of one event.
#[derive(Default)]
struct EventLine {
    message: String,
    tick: Option<Tick>,
    fields: Vec<(&'static str, String)>,
}

impl Visit for EventLine {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            name => self.fields.push((name, format!("{value:?}"))),
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.push((field.name(), value.to_string()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "tick" => self.tick = Some(value),
            name => self.fields.push((name, fmt_grouped(value))),
        }
    }
}
