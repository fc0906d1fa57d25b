use std::collections::VecDeque;

use rand::{rngs::SmallRng, Rng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform random choices for map and marker selection.
pub trait RandomPicker {
    /// Index in `0..len`. Callers never pass zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl RandomPicker for SmallRng {
    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

impl RandomPicker for ChaCha8Rng {
    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Replays a fixed sequence of picks, each taken modulo the candidate count.
/// Once exhausted it always picks the first candidate.
#[derive(Debug, Clone, Default)]
pub struct SequencePicker {
    picks: VecDeque<usize>,
}

impl SequencePicker {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl RandomPicker for SequencePicker {
    fn pick_index(&mut self, len: usize) -> usize {
        self.picks.pop_front().map_or(0, |pick| pick % len)
    }
}

/// Removes and returns a random element, keeping the order of the rest.
/// A single candidate is taken without drawing.
pub fn take_random<T>(picker: &mut dyn RandomPicker, pool: &mut Vec<T>) -> Option<T> {
    match pool.len() {
        0 => None,
        1 => pool.pop(),
        len => Some(pool.remove(picker.pick_index(len))),
    }
}

pub fn choose<'a, T>(picker: &mut dyn RandomPicker, items: &'a [T]) -> Option<&'a T> {
    match items.len() {
        0 => None,
        1 => items.first(),
        len => items.get(picker.pick_index(len)),
    }
}
