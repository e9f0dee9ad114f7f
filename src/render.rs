//! Formatting of the single progress line and its in-place redraw.
//!
//! A line looks like
//!
//! ```text
//! prefix{ 42.0%} [#############                 ] ( 4.2s < 5.8s) suffix
//! ```
//!
//! Each redraw starts with a carriage return and is padded with spaces up to the
//! widest line drawn so far, so a shorter line fully covers a longer one.

use std::{
    fmt::Write as _,
    io::{self, Write},
};

use crate::progress::ProgressSnapshot;

const FILLED: char = '#';
const EMPTY: char = ' ';

/// Renders a snapshot as one progress line, without the leading carriage return
/// or trailing padding.
#[must_use]
pub fn render_line(snapshot: &ProgressSnapshot) -> String {
    let width = snapshot.bar_width();
    let mut line = String::with_capacity(
        snapshot.prefix().len() + snapshot.suffix().len() + width + 32,
    );

    // Writing into a String cannot fail
    line.push_str(snapshot.prefix());
    match snapshot.fraction() {
        Some(fraction) => {
            let _ = write!(line, "{{{:4.1}%}} ", 100.0 * fraction);
        }
        None => line.push_str("{   ?%} "),
    }

    let filled = snapshot.filled();
    line.push('[');
    line.extend(std::iter::repeat_n(FILLED, filled));
    line.extend(std::iter::repeat_n(EMPTY, width - filled));
    line.push(']');

    let elapsed = snapshot.elapsed().as_secs_f64();
    match snapshot.eta() {
        Some(eta) => {
            let _ = write!(line, " ({elapsed:4.1}s < {:.1}s) ", eta.as_secs_f64());
        }
        None => {
            let _ = write!(line, " ({elapsed:4.1}s < ?) ");
        }
    }

    line.push_str(snapshot.suffix());
    line
}

/// Redraws `line` in place on `sink` and flushes.
///
/// `widest` tracks the widest line drawn on this sink; it is updated and the
/// line is padded with blanks up to it.
pub(crate) fn draw<W: Write + ?Sized>(
    sink: &mut W,
    line: &str,
    widest: &mut usize,
) -> io::Result<()> {
    let width = line.chars().count();
    *widest = (*widest).max(width);
    let padding = *widest - width;

    write!(sink, "\r{line}{:padding$}", "")?;
    sink.flush()
}
