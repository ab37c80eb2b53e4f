//! Deterministic pseudo-random numbers for plan generation.
//!
//! Every random decision of a run (task draws, fallback day order, repair
//! sampling, tip-of-the-day) flows through one [`LinearCongruentialRng`], so a
//! plan can be regenerated from the seed printed with it.
//!
//! The generator is a 48-bit linear congruential recurrence:
//! `seed = (seed * 0x5DEECE66D + 0xB) mod 2^48`.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

const MULTIPLIER: u64 = 0x5_DEEC_E66D;
const INCREMENT: u64 = 0xB;
const MASK: u64 = (1 << 48) - 1;

/// Upper bound (exclusive) for seeds produced by [`SeedSource`].
pub const MAX_DERIVED_SEED: u64 = 1_000_000;

/// Saved generator state. Restoring it replays the exact same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RngState(u64);

impl RngState {
    pub fn as_number(&self) -> u64 {
        self.0
    }

    pub fn save(&self) -> String {
        self.0.to_string()
    }

    pub fn load(saved: &str) -> Result<Self> {
        let seed: u64 = saved
            .trim()
            .parse()
            .with_context(|| format!("invalid rng state '{saved}'"))?;
        if seed > MASK {
            bail!("rng state {seed} does not fit in 48 bits");
        }
        Ok(Self(seed))
    }
}

#[derive(Debug, Clone)]
pub struct LinearCongruentialRng {
    state: RngState,
}

impl LinearCongruentialRng {
    /// Seed the generator directly. Negative seeds and seeds wider than
    /// 48 bits are rejected.
    pub fn from_seed(seed: i64) -> Result<Self> {
        if seed < 0 {
            bail!("bad seed {seed}: must not be negative");
        }
        let seed = seed as u64;
        if seed > MASK {
            bail!("bad seed {seed}: must fit in 48 bits");
        }
        Ok(Self {
            state: RngState(seed),
        })
    }

    pub fn from_state(state: RngState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> RngState {
        self.state
    }

    pub fn set_state(&mut self, state: RngState) {
        self.state = state;
    }

    pub fn as_number(&self) -> u64 {
        self.state.as_number()
    }

    fn next_bits(&mut self, bits: u32) -> u64 {
        let seed = self
            .state
            .0
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MASK;
        self.state = RngState(seed);
        seed >> (48 - bits)
    }

    /// Uniform double in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let high = self.next_bits(26) << 27;
        let low = self.next_bits(27);
        (high + low) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[0, i32::MAX)`.
    pub fn value_int(&mut self) -> i32 {
        (self.next_f64() * i32::MAX as f64) as i32
    }

    /// `value_int() % max`; zero when `max` is zero.
    pub fn value_int_below(&mut self, max: i32) -> i32 {
        if max == 0 {
            return 0;
        }
        self.value_int() % max
    }

    /// Integer in `[min, max)`. Returns `min` when the range is empty.
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        self.span_draw(i64::from(min), i64::from(max)) as i32
    }

    /// Integer in `[from, to]`. Returns `from` when `to < from`.
    pub fn range_inclusive(&mut self, from: i32, to: i32) -> i32 {
        self.span_draw(i64::from(from), i64::from(to) + 1) as i32
    }

    /// `value_int() % (max - min) + min`, widened so no span overflows.
    /// The result always lies in `[min, max)`.
    fn span_draw(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        i64::from(self.value_int()) % (max - min) + min
    }

    /// Index in `[0, len)`. Returns 0 for an empty range.
    pub fn index(&mut self, len: usize) -> usize {
        let len = i32::try_from(len).unwrap_or(i32::MAX);
        self.range(0, len) as usize
    }

    /// Float in `[min, max)`.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        (max - min) * self.next_f64() + min
    }

    /// Bernoulli trial succeeding with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let i = self.index(items.len());
        items.get(i)
    }

    /// Weighted pick. Returns the chosen index and item, or `None` when the
    /// total weight is not positive. Negative weights count as zero.
    pub fn spawn<'a, T>(
        &mut self,
        items: &'a [T],
        weight: impl Fn(&T) -> f64,
    ) -> Option<(usize, &'a T)> {
        let total: f64 = items.iter().map(|it| weight(it).max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }

        let point = self.next_f64() * total;
        let mut acc = 0.0;
        let mut last_positive = None;
        for (i, item) in items.iter().enumerate() {
            let w = weight(item).max(0.0);
            if w <= 0.0 {
                continue;
            }
            acc += w;
            if acc > point {
                return Some((i, item));
            }
            last_positive = Some((i, item));
        }

        // float accumulation can land exactly on the total
        last_positive
    }

    /// In-place Fisher-Yates shuffle, `j` drawn from `[0, i]`.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

/// Produces seeds when the user did not supply one.
///
/// The first seed comes from the wall clock; later seeds are stepped from
/// the previous one so that back-to-back runs in one process differ.
#[derive(Debug, Default)]
pub struct SeedSource {
    last: Option<u64>,
}

impl SeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_seed(&mut self) -> u64 {
        let seed = match self.last {
            None => clock_seed(),
            Some(prev) => step(prev),
        };
        self.last = Some(seed);
        seed
    }

    /// Generator seeded from `explicit` when given, otherwise from the
    /// next derived seed.
    pub fn generator(&mut self, explicit: Option<i64>) -> Result<LinearCongruentialRng> {
        match explicit {
            Some(seed) => LinearCongruentialRng::from_seed(seed),
            None => Ok(LinearCongruentialRng::from_state(RngState(self.next_seed()))),
        }
    }
}

fn clock_seed() -> u64 {
    let now = chrono::Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000));
    nanos.unsigned_abs() % MAX_DERIVED_SEED
}

fn step(val: u64) -> u64 {
    (val.wrapping_mul(1_103_515_245).wrapping_add(12_345) & 0x7fff_ffff) % MAX_DERIVED_SEED
}
