//! Iterator adapters that draw a progress line while a loop runs.
//!
//! [`tqdm`] wraps anything that implements [`IntoIterator`]. How the sequence is
//! held follows from what is passed in:
//!
//! * `tqdm(vec)` takes ownership and yields `T`,
//! * `tqdm(&mut vec)` borrows mutably and yields `&mut T`,
//! * `tqdm(&vec)` borrows and yields `&T`.
//!
//! A borrowed sequence cannot be dropped or moved while the adapter is alive, and a
//! temporary is simply moved into the adapter. Both are enforced by the compiler:
//!
//! ```compile_fail
//! use iter_progress::tqdm;
//!
//! let data = vec![1, 2, 3];
//! let mut bar = tqdm(&data);
//! bar.next();
//! drop(data); // error: `data` is still borrowed by `bar`
//! bar.next();
//! ```
//!
//! # Heuristics
//!
//! The total is taken from [`Iterator::size_hint`] when it is exact. Otherwise it
//! stays unknown unless given with [`tqdm_with_total`] or
//! [`ProgressIteratorExt::tqdm_with_total`].
//!
//! # Example
//!
//! ```
//! use iter_progress::tqdm;
//!
//! let mut values = vec![1, 2, 3, 4];
//! let bar = tqdm(&mut values).with_prefix("doubling ");
//! let progress = bar.progress();
//! for v in bar {
//!     *v *= 2;
//!     progress.append(*v);
//! }
//! assert_eq!(values, [2, 4, 6, 8]);
//! assert_eq!(progress.done(), 4);
//! ```

use std::{fmt, io::Write, iter::FusedIterator};

use compact_str::CompactString;

use crate::progress::Progress;

/// An iterator adapter that wraps an underlying iterator and draws its progress.
///
/// Each element yielded advances the bar by one tick; the call that finds the
/// iterator exhausted draws the final line.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Tqdm<I> {
    iter: I,
    progress: Progress,
    started: bool,
}

impl<I: Iterator> Tqdm<I> {
    /// Wraps `iter` in a default progress bar.
    pub fn new(iter: I) -> Self {
        Self::with_progress(iter, Progress::new(None))
    }

    /// Wraps `iter` with an explicit total, for iterators without an exact length.
    pub fn with_total(iter: I, total: u64) -> Self {
        Self::with_progress(iter, Progress::new(Some(total)))
    }
}

impl<I> Tqdm<I> {
    /// Wraps `iter` using an existing [`Progress`].
    ///
    /// Note: This is usually constructed via [`tqdm`] or [`ProgressIteratorExt`].
    pub const fn with_progress(iter: I, progress: Progress) -> Self {
        Self {
            iter,
            progress,
            started: false,
        }
    }

    /// Returns a handle to the bar, usable inside the loop that consumes `self`.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    /// Appends text to the suffix, shown if a redraw happens before the next tick.
    pub fn append(&self, text: impl fmt::Display) {
        self.progress.append(text);
    }

    /// Sets the completed count to `fraction` of the total.
    pub fn manual_set(&self, fraction: f64) {
        self.progress.manual_set(fraction);
    }

    /// Sets the label drawn before the percentage.
    pub fn set_prefix(&self, prefix: impl Into<CompactString>) {
        self.progress.set_prefix(prefix);
    }

    /// Sets the number of cells in the bar.
    pub fn set_bar_size(&self, size: usize) {
        self.progress.set_bar_size(size);
    }

    /// Sets the minimum time between redraws, in seconds.
    pub fn set_min_update_time(&self, seconds: f64) {
        self.progress.set_min_update_time(seconds);
    }

    /// Replaces the output sink.
    pub fn set_output_sink(&self, sink: impl Write + 'static) {
        self.progress.set_output_sink(sink);
    }

    /// Chaining form of [`set_prefix`](Self::set_prefix).
    pub fn with_prefix(self, prefix: impl Into<CompactString>) -> Self {
        self.set_prefix(prefix);
        self
    }

    /// Chaining form of [`set_bar_size`](Self::set_bar_size).
    pub fn with_bar_size(self, size: usize) -> Self {
        self.set_bar_size(size);
        self
    }

    /// Chaining form of [`set_min_update_time`](Self::set_min_update_time).
    pub fn with_min_update_time(self, seconds: f64) -> Self {
        self.set_min_update_time(seconds);
        self
    }

    /// Chaining form of [`set_output_sink`](Self::set_output_sink).
    pub fn with_output_sink(self, sink: impl Write + 'static) -> Self {
        self.set_output_sink(sink);
        self
    }

    /// Unwraps the underlying iterator.
    pub fn into_inner(self) -> I {
        self.iter
    }
}

impl<I> fmt::Debug for Tqdm<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tqdm")
            .field("progress", &self.progress)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl<I: Iterator> Iterator for Tqdm<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            self.progress.begin_traversal(exact_len(&self.iter));
        }

        let item = self.iter.next();

        if item.is_some() {
            self.progress.tick();
        } else {
            // Exhausted
            self.progress.finish();
        }

        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<I: ExactSizeIterator> ExactSizeIterator for Tqdm<I> {}

impl<I: FusedIterator> FusedIterator for Tqdm<I> {}

/// The iterator's length, if its size hint pins it down exactly.
fn exact_len<I: Iterator>(iter: &I) -> Option<u64> {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => u64::try_from(upper).ok(),
        _ => None,
    }
}

/// Wraps any sequence in a progress bar drawing to standard error.
///
/// Passing the sequence by value, by `&mut` or by `&` decides whether it is owned,
/// mutably borrowed or borrowed by the adapter.
pub fn tqdm<S: IntoIterator>(seq: S) -> Tqdm<S::IntoIter> {
    Tqdm::new(seq.into_iter())
}

/// Wraps any sequence in a progress bar with an explicit total.
pub fn tqdm_with_total<S: IntoIterator>(seq: S, total: u64) -> Tqdm<S::IntoIter> {
    Tqdm::with_total(seq.into_iter(), total)
}

/// Extension trait to attach a progress bar to any iterator.
pub trait ProgressIteratorExt: Iterator + Sized {
    /// Wraps the iterator in a default progress bar.
    fn tqdm(self) -> Tqdm<Self>;

    /// Wraps the iterator with an explicit total.
    fn tqdm_with_total(self, total: u64) -> Tqdm<Self>;

    /// Wraps the iterator using an existing [`Progress`] instance.
    fn tqdm_with(self, progress: Progress) -> Tqdm<Self>;
}

impl<I: Iterator> ProgressIteratorExt for I {
    fn tqdm(self) -> Tqdm<Self> {
        Tqdm::new(self)
    }

    fn tqdm_with_total(self, total: u64) -> Tqdm<Self> {
        Tqdm::with_total(self, total)
    }

    fn tqdm_with(self, progress: Progress) -> Tqdm<Self> {
        Tqdm::with_progress(self, progress)
    }
}
