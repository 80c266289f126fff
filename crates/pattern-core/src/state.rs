use crate::{TimeSpan, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// State represents the context for querying a pattern
///
/// It contains the timespan being queried and any control parameters
/// that might affect pattern generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// The timespan being queried
    pub span: TimeSpan,

    /// Control parameters (e.g., tempo, effects, etc.)
    pub controls: HashMap<String, Value>,
}

impl State {
    /// Create a new State with the given timespan
    pub fn new(span: TimeSpan) -> Self {
        State {
            span,
            controls: HashMap::new(),
        }
    }

    /// Create a new State with the given timespan and controls
    pub fn with_controls(span: TimeSpan, controls: HashMap<String, Value>) -> Self {
        State { span, controls }
    }

    /// Return a new State with a different span
    pub fn set_span(&self, span: TimeSpan) -> State {
        State {
            span,
            controls: self.controls.clone(),
        }
    }

    /// Return a new State with the span modified by a function
    pub fn with_span<F>(&self, func: F) -> State
    where
        F: FnOnce(&TimeSpan) -> TimeSpan,
    {
        self.set_span(func(&self.span))
    }

    /// Return a new State with added/updated controls
    pub fn set_controls(&self, new_controls: HashMap<String, Value>) -> State {
        let mut controls = self.controls.clone();
        for (k, v) in new_controls {
            controls.insert(k, v);
        }
        State {
            span: self.span,
            controls,
        }
    }

    /// Return a new State with a single control added
    pub fn set_control(&self, key: String, value: Value) -> State {
        let mut controls = self.controls.clone();
        controls.insert(key, value);
        State {
            span: self.span,
            controls,
        }
    }

    /// Get a control value by key
    pub fn get_control(&self, key: &str) -> Option<&Value> {
        self.controls.get(key)
    }

    /// `ctx.randomSeed`, defaulting to 0. Keys the deterministic PRNG
    /// alongside the cycle index and each combinator's node salt.
    pub fn random_seed(&self) -> u64 {
        match self.controls.get(RANDOM_SEED_KEY).and_then(Value::as_number) {
            Some(n) => n as u64,
            None => 0,
        }
    }

    /// Return a new State with `randomSeed` set.
    pub fn with_random_seed(&self, seed: u64) -> State {
        self.set_control(RANDOM_SEED_KEY.to_string(), Value::Number(seed as f64))
    }

    /// `ctx.rangeMin`/`ctx.rangeMax`, used by continuous signals. Defaults
    /// to the unipolar range `[0, 1)`.
    pub fn range(&self) -> (f64, f64) {
        let lo = self
            .controls
            .get(RANGE_MIN_KEY)
            .and_then(Value::as_number)
            .unwrap_or(0.0);
        let hi = self
            .controls
            .get(RANGE_MAX_KEY)
            .and_then(Value::as_number)
            .unwrap_or(1.0);
        (lo, hi)
    }

    /// Return a new State with `rangeMin`/`rangeMax` set (`ContextRangeMap`).
    pub fn with_range(&self, lo: f64, hi: f64) -> State {
        self.set_controls(HashMap::from([
            (RANGE_MIN_KEY.to_string(), Value::Number(lo)),
            (RANGE_MAX_KEY.to_string(), Value::Number(hi)),
        ]))
    }
}

/// Reserved `QueryContext` key: the seed threaded into the deterministic
/// PRNG.
pub const RANDOM_SEED_KEY: &str = "randomSeed";
/// Reserved `QueryContext` key: lower bound for continuous-signal ranges.
pub const RANGE_MIN_KEY: &str = "rangeMin";
/// Reserved `QueryContext` key: upper bound for continuous-signal ranges.
pub const RANGE_MAX_KEY: &str = "rangeMax";
