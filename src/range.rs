//! Arithmetic integer sequences for [`trange`] and [`trange_from`].

use std::iter::FusedIterator;

use crate::iter::Tqdm;

/// Primitive integers an [`IntRange`] can step over.
pub trait RangeInt: Copy + PartialOrd {
    /// The additive identity, start of [`IntRange::to`].
    const ZERO: Self;

    /// `self + step`, or `None` if that overflows the type.
    fn forward(self, step: u64) -> Option<Self>;

    /// Number of unit steps from `start` up to `end`; zero if `end <= start`.
    fn distance(start: Self, end: Self) -> u64;
}

macro_rules! impl_range_int {
    ($($t:ty),* $(,)?) => {$(
        impl RangeInt for $t {
            const ZERO: Self = 0;

            #[allow(clippy::cast_lossless)]
            fn forward(self, step: u64) -> Option<Self> {
                Self::try_from(self as i128 + step as i128).ok()
            }

            #[allow(clippy::cast_lossless)]
            fn distance(start: Self, end: Self) -> u64 {
                let diff = (end as i128 - start as i128).max(0);
                u64::try_from(diff).unwrap_or(u64::MAX)
            }
        }
    )*};
}

impl_range_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// The half-open sequence `first, first + step, ...` below `last`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IntRange<T> {
    next: T,
    last: T,
    step: u64,
}

impl<T: RangeInt> IntRange<T> {
    /// Counts from `first` up to, but excluding, `last`.
    pub const fn new(first: T, last: T) -> Self {
        Self {
            next: first,
            last,
            step: 1,
        }
    }

    /// Counts from zero up to, but excluding, `last`.
    pub const fn to(last: T) -> Self {
        Self::new(T::ZERO, last)
    }

    /// Steps by `step` instead of one. A step of zero is treated as one.
    #[must_use]
    pub fn step(mut self, step: u64) -> Self {
        self.step = step.max(1);
        self
    }

    fn remaining(&self) -> u64 {
        T::distance(self.next, self.last).div_ceil(self.step)
    }
}

impl<T: RangeInt> Iterator for IntRange<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next >= self.last {
            return None;
        }
        let value = self.next;
        self.next = value.forward(self.step).unwrap_or(self.last);
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            // Only reachable on targets narrower than 64 bits
            Err(_) => (usize::MAX, Some(usize::MAX)),
        }
    }
}

/// The reported length saturates at `usize::MAX` when the range is longer.
impl<T: RangeInt> ExactSizeIterator for IntRange<T> {}

impl<T: RangeInt> FusedIterator for IntRange<T> {}

/// A progress bar over `0..last`.
pub fn trange<T: RangeInt>(last: T) -> Tqdm<IntRange<T>> {
    Tqdm::new(IntRange::to(last))
}

/// A progress bar over `first..last`.
pub fn trange_from<T: RangeInt>(first: T, last: T) -> Tqdm<IntRange<T>> {
    Tqdm::new(IntRange::new(first, last))
}
