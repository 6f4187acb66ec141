//! Test infrastructure for driving the simulator through exact scenarios.
//!
//! [`ScriptedRandom`] replays queued outcomes for each kind of draw. When a
//! queue runs dry it falls back to a neutral answer: integer and float draws
//! return the midpoint of the requested range, `chance` returns `false`, and
//! `index` returns 0. A scripted value outside the requested range is
//! clamped into it, so the [`RandomSource`] contract always holds.

use std::collections::VecDeque;

use crate::data::random::RandomSource;

/// Random source that replays scripted outcomes.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    ints: VecDeque<i64>,
    chances: VecDeque<bool>,
    uniforms: VecDeque<f64>,
    indices: VecDeque<usize>,
}

impl ScriptedRandom {
    /// Create a source with empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for [`RandomSource::int_inclusive`].
    #[must_use]
    pub fn with_ints(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        self.ints.extend(values);
        self
    }

    /// Queue outcomes for [`RandomSource::chance`].
    #[must_use]
    pub fn with_chances(mut self, values: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(values);
        self
    }

    /// Queue outcomes for [`RandomSource::uniform`].
    #[must_use]
    pub fn with_uniforms(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.uniforms.extend(values);
        self
    }

    /// Queue outcomes for [`RandomSource::index`].
    #[must_use]
    pub fn with_indices(mut self, values: impl IntoIterator<Item = usize>) -> Self {
        self.indices.extend(values);
        self
    }

    /// Whether every scripted outcome has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.ints.is_empty()
            && self.chances.is_empty()
            && self.uniforms.is_empty()
            && self.indices.is_empty()
    }
}

impl RandomSource for ScriptedRandom {
    fn int_inclusive(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            self.ints.pop_front();
            return low;
        }
        self.ints
            .pop_front()
            .map_or(low + (high - low) / 2, |v| v.clamp(low, high))
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low.partial_cmp(&high) != Some(std::cmp::Ordering::Less) {
            self.uniforms.pop_front();
            return low;
        }
        self.uniforms
            .pop_front()
            .map_or(low + (high - low) / 2.0, |v| v.clamp(low, high))
    }

    fn index(&mut self, len: usize) -> usize {
        let value = self.indices.pop_front().unwrap_or(0);
        if len == 0 { 0 } else { value.min(len - 1) }
    }
}
