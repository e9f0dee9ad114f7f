//! Core progress state, its shared handle, and the snapshot used for rendering.
//!
//! The state is owned by a [`Progress`] handle. Handles are cheap to clone and all
//! clones point at the same counters, which lets a loop body append suffix text
//! while the adapter wrapping the loop's iterator drives the ticks.
//!
//! # Throttling
//!
//! Every [`tick`](Progress::tick) advances the completed count by one, but the line
//! is only redrawn when one of these holds:
//!
//! * nothing has completed yet (the bar becomes visible immediately),
//! * the completed count has reached the total (the bar never ends stale),
//! * more than the minimum update interval passed since the last redraw.
//!
//! This bounds the I/O cost of a progress bar independently of the loop speed.
//!
//! # Threading
//!
//! [`Progress`] is `Rc`-based and therefore neither `Send` nor `Sync`. A bar is
//! driven by exactly one traversal on one thread.

use std::{
    cell::RefCell,
    fmt::{self, Write as _},
    io::Write,
    rc::Rc,
    time::Duration,
};

use compact_str::CompactString;

use crate::{clock::Clock, error::Result, render};

/// Default number of cells in the bar.
pub const DEFAULT_BAR_SIZE: usize = 30;

/// Default minimum time between two redraws.
pub const DEFAULT_MIN_UPDATE: Duration = Duration::from_millis(150);

/// Guards the completion ratio against a zero total.
const EPSILON: f64 = 1e-13;

/// A cheap-to-clone, single-threaded handle to a progress bar.
#[derive(Clone)]
pub struct Progress {
    pub(crate) state: Rc<RefCell<ProgressState>>,
}

/// The mutable state behind a [`Progress`] handle.
pub(crate) struct ProgressState {
    /// Total set explicitly by the caller; wins over the iterator's length hint.
    pub(crate) explicit_total: Option<u64>,
    pub(crate) total: Option<u64>,
    pub(crate) done: u64,

    pub(crate) prefix: CompactString,
    pub(crate) suffix: CompactString,
    pub(crate) bar_width: usize,
    pub(crate) min_update: Duration,

    /// Widest line drawn so far, shorter lines are padded up to it.
    pub(crate) line_width: usize,

    pub(crate) overall: Clock,
    pub(crate) since_draw: Clock,

    pub(crate) sink: Box<dyn Write>,
    /// Whether anything was drawn since the traversal began.
    pub(crate) drawn: bool,
    pub(crate) finished: bool,
    /// Set once the sink failed; no further draws are attempted.
    pub(crate) muted: bool,
}

impl ProgressState {
    pub(crate) fn new(total: Option<u64>, sink: Box<dyn Write>) -> Self {
        Self {
            explicit_total: total,
            total,
            done: 0,
            prefix: CompactString::default(),
            suffix: CompactString::default(),
            bar_width: DEFAULT_BAR_SIZE,
            min_update: DEFAULT_MIN_UPDATE,
            line_width: 0,
            overall: Clock::new(),
            since_draw: Clock::new(),
            sink,
            drawn: false,
            finished: false,
            muted: false,
        }
    }

    fn begin_traversal(&mut self, total_hint: Option<u64>) {
        self.total = self.explicit_total.or(total_hint);
        self.done = 0;
        self.drawn = false;
        self.finished = false;
        self.overall.reset();
        self.since_draw.reset();
        log::trace!(
            "progress {:?}: traversal started, total {:?}",
            self.prefix,
            self.total
        );
    }

    fn is_due(&self) -> bool {
        self.done == 0 || Some(self.done) == self.total || self.since_draw.peek() > self.min_update
    }

    fn tick(&mut self) {
        if self.is_due() {
            self.draw_or_mute();
        }
        // Suffix text belongs to one iteration, drawn or not
        self.suffix.clear();
        self.done = self.saturate(self.done.saturating_add(1));
    }

    fn refresh_if_due(&mut self) {
        if !self.drawn || self.since_draw.peek() > self.min_update {
            self.draw_or_mute();
        }
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.draw_or_mute();
        log::trace!(
            "progress {:?}: finished at {}/{:?} after {:?}",
            self.prefix,
            self.done,
            self.total,
            self.overall.peek()
        );
    }

    fn draw_or_mute(&mut self) {
        self.drawn = true;
        if self.muted {
            self.since_draw.reset();
            self.suffix.clear();
            return;
        }
        if let Err(err) = self.draw() {
            log::warn!(
                "progress {:?}: output sink failed, disabling redraws: {err}",
                self.prefix
            );
            self.muted = true;
        }
    }

    fn draw(&mut self) -> std::io::Result<()> {
        self.since_draw.reset();
        let line = render::render_line(&ProgressSnapshot::of(self));
        self.suffix.clear();
        render::draw(&mut self.sink, &line, &mut self.line_width)
    }

    fn manual_set(&mut self, fraction: f64) {
        let Some(total) = self.total else {
            log::debug!(
                "progress {:?}: ignoring manual_set({fraction}) without a known total",
                self.prefix
            );
            return;
        };
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            self.done = (fraction * total as f64).round() as u64;
        }
    }

    fn saturate(&self, done: u64) -> u64 {
        self.total.map_or(done, |total| done.min(total))
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The sink is not `Debug`, only report the counters
        let state = self.state.borrow();
        f.debug_struct("Progress")
            .field("prefix", &state.prefix)
            .field("done", &state.done)
            .field("total", &state.total)
            .field("finished", &state.finished)
            .finish_non_exhaustive()
    }
}

impl Progress {
    /// Creates a progress bar with default settings drawing to standard error.
    ///
    /// `total` is the expected number of ticks; pass `None` to take it from the
    /// wrapped iterator's length, or to leave it unknown.
    #[must_use]
    pub fn new(total: Option<u64>) -> Self {
        Self::from_state(ProgressState::new(total, Box::new(std::io::stderr())))
    }

    pub(crate) fn from_state(state: ProgressState) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Starts a new traversal: zeroes the count and restarts both clocks.
    ///
    /// `total_hint` is used unless a total was set explicitly.
    pub fn begin_traversal(&self, total_hint: Option<u64>) {
        self.state.borrow_mut().begin_traversal(total_hint);
    }

    /// Advances the count by one, redrawing first if a redraw is due.
    ///
    /// The suffix is cleared whether or not a redraw happened.
    pub fn tick(&self) {
        self.state.borrow_mut().tick();
    }

    /// Redraws without advancing the count if nothing was drawn yet in this
    /// traversal or the minimum update interval has passed.
    pub fn refresh_if_due(&self) {
        self.state.borrow_mut().refresh_if_due();
    }

    /// Draws the final line of the traversal. Further calls do nothing until the
    /// next [`begin_traversal`](Self::begin_traversal).
    pub fn finish(&self) {
        self.state.borrow_mut().finish();
    }

    /// Redraws unconditionally, reporting sink failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sink`](crate::Error::Sink) if writing or flushing the sink fails.
    pub fn refresh(&self) -> Result<()> {
        self.state.borrow_mut().draw()?;
        Ok(())
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Appends text to the suffix shown after the bar.
    ///
    /// Appends accumulate in call order until the next tick or redraw, which
    /// clears them.
    pub fn append(&self, text: impl fmt::Display) {
        let mut state = self.state.borrow_mut();
        // Writing into a CompactString cannot fail
        let _ = write!(state.suffix, "{text}");
    }

    /// Sets the completed count to `fraction` of the total.
    ///
    /// `fraction` is clamped to `[0, 1]`. Does nothing when the total is unknown.
    pub fn manual_set(&self, fraction: f64) {
        self.state.borrow_mut().manual_set(fraction);
    }

    /// Advances the count by `amount` without redrawing.
    pub fn advance(&self, amount: u64) {
        let mut state = self.state.borrow_mut();
        state.done = state.saturate(state.done.saturating_add(amount));
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Sets the label drawn before the percentage.
    pub fn set_prefix(&self, prefix: impl Into<CompactString>) {
        self.state.borrow_mut().prefix = prefix.into();
    }

    /// Sets the number of cells in the bar.
    pub fn set_bar_size(&self, size: usize) {
        self.state.borrow_mut().bar_width = size;
    }

    /// Sets the minimum time between redraws, in seconds.
    ///
    /// Negative and NaN values mean "no minimum".
    pub fn set_min_update_time(&self, seconds: f64) {
        self.set_min_update_interval(secs_to_duration(seconds));
    }

    /// Sets the minimum time between redraws.
    pub fn set_min_update_interval(&self, interval: Duration) {
        self.state.borrow_mut().min_update = interval;
    }

    /// Replaces the output sink. The previous sink is dropped.
    pub fn set_output_sink(&self, sink: impl Write + 'static) {
        let mut state = self.state.borrow_mut();
        state.sink = Box::new(sink);
        state.muted = false;
    }

    /// Sets the total explicitly. `None` falls back to the iterator's length hint
    /// on the next traversal.
    pub fn set_total(&self, total: Option<u64>) {
        let mut state = self.state.borrow_mut();
        state.explicit_total = total;
        state.total = total;
        state.done = state.saturate(state.done);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the completed count.
    #[must_use]
    pub fn done(&self) -> u64 {
        self.state.borrow().done
    }

    /// Returns the total, if known.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.state.borrow().total
    }

    /// Checks whether the final line of the current traversal was drawn.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.borrow().finished
    }

    /// Creates a plain-data snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::of(&self.state.borrow())
    }
}

pub(crate) fn secs_to_duration(seconds: f64) -> Duration {
    // `max` maps NaN to zero; only +inf is left to overflow
    Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX)
}

/// A plain-data view of a progress bar at one instant, as consumed by the renderer.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressSnapshot {
    pub(crate) prefix: CompactString,
    pub(crate) suffix: CompactString,
    pub(crate) done: u64,
    pub(crate) total: Option<u64>,
    pub(crate) bar_width: usize,
    pub(crate) elapsed: Duration,
}

impl ProgressSnapshot {
    pub(crate) fn of(state: &ProgressState) -> Self {
        Self {
            prefix: state.prefix.clone(),
            suffix: state.suffix.clone(),
            done: state.done,
            total: state.total,
            bar_width: state.bar_width,
            elapsed: state.overall.peek(),
        }
    }

    /// Returns the label drawn before the percentage.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the pending suffix text.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Returns the completed count.
    #[must_use]
    pub const fn done(&self) -> u64 {
        self.done
    }

    /// Returns the total, if known.
    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.total
    }

    /// Returns the number of cells in the bar.
    #[must_use]
    pub const fn bar_width(&self) -> usize {
        self.bar_width
    }

    /// Returns the time since the traversal began.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the completed fraction, or `None` when the total is unknown.
    ///
    /// A zero total yields `0.0` rather than a division fault.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fraction(&self) -> Option<f64> {
        self.total
            .map(|total| self.done as f64 / (total as f64 + EPSILON))
    }

    /// Returns the number of filled bar cells, within `[0, bar_width]`.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn filled(&self) -> usize {
        let width = self.bar_width as f64;
        self.fraction()
            .map_or(0, |fraction| (fraction * width).round().clamp(0.0, width) as usize)
    }

    /// Estimates the remaining time as `elapsed / fraction - elapsed`.
    ///
    /// Returns `None` before anything completed, when the total is unknown, or
    /// when the estimate is not representable.
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        let fraction = self.fraction().filter(|fraction| *fraction > 0.0)?;
        let elapsed = self.elapsed.as_secs_f64();
        Duration::try_from_secs_f64((elapsed / fraction - elapsed).max(0.0)).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::{Progress, ProgressSnapshot, ProgressState};
    use crate::testing::{FailingSink, SharedSink};

    fn progress_with_sink(total: Option<u64>) -> (Progress, SharedSink) {
        let sink = SharedSink::default();
        let progress = Progress::from_state(ProgressState::new(total, Box::new(sink.clone())));
        (progress, sink)
    }

    /// Visible On Start
    /// The very first tick draws regardless of the throttle interval.
    #[test]
    fn test_first_tick_draws() {
        let (p, sink) = progress_with_sink(Some(10));
        p.set_min_update_interval(Duration::from_secs(3600));
        p.begin_traversal(None);

        p.tick();
        assert_eq!(sink.draws().len(), 1);
        assert!(sink.draws()[0].contains("{ 0.0%}"));
        assert_eq!(p.done(), 1);
    }

    /// Throttling
    /// With a long interval, intermediate ticks stay silent; only the first and final lines draw.
    #[test]
    fn test_throttled_ticks() {
        let (p, sink) = progress_with_sink(Some(100));
        p.set_min_update_interval(Duration::from_secs(3600));
        p.begin_traversal(None);

        for _ in 0..100 {
            p.tick();
        }
        assert_eq!(sink.draws().len(), 1);

        p.finish();
        let draws = sink.draws();
        assert_eq!(draws.len(), 2);
        assert!(draws[1].contains("{100.0%}"));
        assert_eq!(p.done(), 100);
        assert!(p.is_finished());
    }

    /// Interval Elapsed
    /// Once the interval has passed an intermediate tick draws; back-to-back ticks do not.
    #[test]
    fn test_ticks_draw_after_interval() {
        let (p, sink) = progress_with_sink(Some(10));
        p.set_min_update_interval(Duration::from_millis(50));
        p.begin_traversal(None);

        p.tick();
        p.tick();
        assert_eq!(sink.draws().len(), 1);

        thread::sleep(Duration::from_millis(60));
        p.tick();
        assert_eq!(sink.draws().len(), 2);
        assert!(sink.draws()[1].contains("{20.0%}"));

        p.tick();
        assert_eq!(sink.draws().len(), 2, "redraws stay throttled right after a draw");
        assert_eq!(p.done(), 4);
    }

    /// Suffix Per Tick
    /// Text appended between throttled ticks is dropped instead of piling up.
    #[test]
    fn test_suffix_cleared_without_draw() {
        let (p, sink) = progress_with_sink(Some(1000));
        p.set_min_update_interval(Duration::from_secs(3600));
        p.begin_traversal(None);

        for i in 0..1000 {
            p.tick();
            p.append(i);
            p.append(' ');
        }
        assert_eq!(p.snapshot().suffix(), "999 ");

        p.finish();
        let draws = sink.draws();
        assert_eq!(draws.len(), 2);
        assert!(draws[1].ends_with(") 999"), "{}", draws[1]);
        assert!(draws[1].len() < 80);
    }

    /// Reaching The Total Draws
    /// A tick that finds the count equal to the total draws even when throttled.
    #[test]
    fn test_tick_at_total_draws() {
        let (p, sink) = progress_with_sink(Some(4));
        p.set_min_update_interval(Duration::from_secs(3600));
        p.begin_traversal(None);
        p.tick();
        p.manual_set(1.0);

        p.tick();
        assert_eq!(sink.draws().len(), 2);
        assert_eq!(p.done(), 4, "count saturates at the total");
    }

    /// Finish Is Idempotent
    /// Only the first `finish` of a traversal draws.
    #[test]
    fn test_finish_once() {
        let (p, sink) = progress_with_sink(Some(1));
        p.begin_traversal(None);
        p.tick();
        p.finish();
        p.finish();
        assert_eq!(sink.draws().len(), 2);

        p.begin_traversal(None);
        assert!(!p.is_finished());
        assert_eq!(p.done(), 0);
    }

    /// Refresh Without Ticking
    /// Polling draws once per traversal and then only after the interval passes.
    #[test]
    fn test_refresh_if_due() {
        let (p, sink) = progress_with_sink(Some(10));
        p.set_min_update_interval(Duration::from_secs(3600));
        p.begin_traversal(None);

        p.refresh_if_due();
        p.refresh_if_due();
        assert_eq!(sink.draws().len(), 1);
        assert_eq!(p.done(), 0);

        p.begin_traversal(None);
        p.refresh_if_due();
        assert_eq!(sink.draws().len(), 2);
    }

    /// Manual Advancement
    /// Fractions are clamped to [0, 1] and rounded against the total.
    #[test]
    fn test_manual_set() {
        let (p, _sink) = progress_with_sink(Some(10));
        p.manual_set(0.5);
        assert_eq!(p.done(), 5);
        p.manual_set(1.5);
        assert_eq!(p.done(), 10);
        p.manual_set(-1.0);
        assert_eq!(p.done(), 0);
        p.manual_set(f64::NAN);
        assert_eq!(p.done(), 0);
        p.manual_set(0.26);
        assert_eq!(p.done(), 3);
    }

    /// Manual Advancement Without Total
    /// Without a total there is nothing to scale against, so the count is untouched.
    #[test]
    fn test_manual_set_unknown_total() {
        let (p, _sink) = progress_with_sink(None);
        p.begin_traversal(None);
        p.tick();
        p.manual_set(0.5);
        assert_eq!(p.done(), 1);
    }

    /// Suffix Accumulation
    /// Appends concatenate in call order and are cleared by the next draw.
    #[test]
    fn test_suffix_accumulates_and_clears() {
        let (p, sink) = progress_with_sink(Some(3));
        p.begin_traversal(None);
        p.append("a=");
        p.append(1);
        p.append(' ');
        p.append(2.5);
        assert_eq!(p.snapshot().suffix(), "a=1 2.5");

        p.tick();
        assert!(sink.draws()[0].contains(") a=1 2.5"));
        assert_eq!(p.snapshot().suffix(), "");
    }

    /// Explicit Total Wins
    /// A total set by the caller overrides the traversal's hint.
    #[test]
    fn test_explicit_total_overrides_hint() {
        let (p, _sink) = progress_with_sink(Some(7));
        p.begin_traversal(Some(3));
        assert_eq!(p.total(), Some(7));

        p.set_total(None);
        p.begin_traversal(Some(3));
        assert_eq!(p.total(), Some(3));
    }

    /// Advance
    /// Bulk advancement saturates at the total.
    #[test]
    fn test_advance_saturates() {
        let (p, sink) = progress_with_sink(Some(5));
        p.advance(3);
        assert_eq!(p.done(), 3);
        p.advance(10);
        assert_eq!(p.done(), 5);
        assert!(sink.draws().is_empty(), "advance never draws");
    }

    /// Sink Failure
    /// Iteration-driven draws swallow a failing sink; explicit refresh reports it.
    #[test]
    fn test_failing_sink() {
        let p = Progress::new(Some(2));
        p.set_output_sink(FailingSink);
        p.begin_traversal(None);
        p.tick();
        p.tick();
        p.finish();
        assert_eq!(p.done(), 2);
        assert!(p.state.borrow().muted);

        assert!(matches!(p.refresh(), Err(crate::Error::Sink(_))));
    }

    /// Min Update Time Parsing
    /// Seconds are converted with negative and NaN inputs meaning zero.
    #[test]
    fn test_min_update_time() {
        let (p, _sink) = progress_with_sink(None);
        p.set_min_update_time(0.25);
        assert_eq!(p.state.borrow().min_update, Duration::from_millis(250));
        p.set_min_update_time(-3.0);
        assert_eq!(p.state.borrow().min_update, Duration::ZERO);
        p.set_min_update_time(f64::NAN);
        assert_eq!(p.state.borrow().min_update, Duration::ZERO);
        p.set_min_update_time(f64::INFINITY);
        assert_eq!(p.state.borrow().min_update, Duration::MAX);
    }

    /// Completion Math
    /// Fraction, fill count and ETA degrade gracefully at the edges.
    #[test]
    fn test_snapshot_math() {
        let snap = ProgressSnapshot {
            done: 33,
            total: Some(100),
            bar_width: 30,
            elapsed: Duration::from_secs(33),
            ..Default::default()
        };
        assert_eq!(snap.filled(), 10);
        let eta = snap.eta().unwrap();
        assert!((eta.as_secs_f64() - 67.0).abs() < 1e-6);

        let zero_total = ProgressSnapshot {
            total: Some(0),
            bar_width: 30,
            ..Default::default()
        };
        assert_eq!(zero_total.fraction(), Some(0.0));
        assert_eq!(zero_total.filled(), 0);
        assert!(zero_total.eta().is_none());

        let unknown = ProgressSnapshot {
            done: 12,
            bar_width: 30,
            ..Default::default()
        };
        assert!(unknown.fraction().is_none());
        assert_eq!(unknown.filled(), 0);
        assert!(unknown.eta().is_none());
    }
}
