//! # `iter_progress`
//!
//! A single-line, rate-limited progress bar for any iterator.
//!
//! Wrapping a sequence leaves the values it produces untouched; every element
//! pulled through the wrapper advances a counter, and a line such as
//!
//! ```text
//! parsing {42.0%} [#############                 ] ( 4.2s < 5.8s) file_042.json
//! ```
//!
//! is redrawn in place with a carriage return. Redraws are rate limited (at most
//! one per 0.15 s by default, plus the first and the final one), so wrapping a
//! tight loop costs little more than a clock read per element.
//!
//! ```
//! use iter_progress::{tqdm, trange};
//!
//! let files = vec!["a.json", "b.json", "c.json"];
//! let bar = tqdm(&files).with_prefix("parsing ").with_output_sink(std::io::sink());
//! let progress = bar.progress();
//! for file in bar {
//!     progress.append(file);
//! }
//!
//! let squares: u64 = trange(1000u64)
//!     .with_output_sink(std::io::sink())
//!     .map(|n| n * n)
//!     .sum();
//! assert_eq!(squares, 332_833_500);
//! ```
//!
//! The model is synchronous and single-threaded: a bar belongs to one loop on one
//! thread, and the final newline after a loop is left to the caller.
//!
//! ## Modules
//!
//! * [`iter`]: The [`Tqdm`] adapter, [`tqdm`] and the [`ProgressIteratorExt`] trait.
//! * [`progress`]: The [`Progress`] state handle, throttling policy and [`ProgressSnapshot`].
//! * [`render`]: Formatting of the progress line.
//! * [`builder`]: Fluent configuration through [`ProgressBuilder`].
//! * [`range`]: Integer sequences for [`trange`] and [`trange_from`].
//! * [`timer`]: A bar that follows wall-clock time, [`Timer`].
//! * [`clock`]: The [`Clock`] stopwatch.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod clock;
pub mod error;
pub mod iter;
pub mod progress;
pub mod range;
pub mod render;
pub mod timer;

#[cfg(test)]
mod testing;

pub use builder::ProgressBuilder;
pub use clock::Clock;
pub use error::{Error, Result};
pub use iter::{ProgressIteratorExt, Tqdm, tqdm, tqdm_with_total};
pub use progress::{Progress, ProgressSnapshot};
pub use range::{IntRange, RangeInt, trange, trange_from};
pub use timer::{Timer, tqdm_timer};
