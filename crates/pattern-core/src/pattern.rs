use crate::{prng, Fraction, Hap, State, TimeSpan, Value};
use std::sync::Arc;

/// A Pattern represents a time-varying sequence of values.
///
/// Patterns are queried with a [`State`] (containing a timespan) and return
/// a list of [`Hap`]s (events) that occur within that timespan. `weight` and
/// `steps` are metadata a parent sequencer consults without querying:
/// `weight` is this pattern's proportional share in a weighted sequence,
/// `steps` is its own declared subdivision count.
pub struct Pattern {
    query_func: Arc<dyn Fn(State) -> Vec<Hap> + Send + Sync>,
    steps: Option<Fraction>,
    weight: Fraction,
    estimate_cycle_duration: Fraction,
}

impl Pattern {
    pub fn new<F>(query_func: F) -> Self
    where
        F: Fn(State) -> Vec<Hap> + Send + Sync + 'static,
    {
        Pattern {
            query_func: Arc::new(query_func),
            steps: None,
            weight: Fraction::from_int(1),
            estimate_cycle_duration: Fraction::from_int(1),
        }
    }

    pub fn with_steps<F>(query_func: F, steps: Option<Fraction>) -> Self
    where
        F: Fn(State) -> Vec<Hap> + Send + Sync + 'static,
    {
        Pattern {
            query_func: Arc::new(query_func),
            steps,
            weight: Fraction::from_int(1),
            estimate_cycle_duration: Fraction::from_int(1),
        }
    }

    pub fn query(&self, state: State) -> Vec<Hap> {
        (self.query_func)(state)
    }

    pub fn get_steps(&self) -> Option<Fraction> {
        self.steps
    }

    pub fn set_steps(mut self, steps: Option<Fraction>) -> Self {
        self.steps = steps;
        self
    }

    /// `StepsOverride`: pure metadata wrapper, alias of [`Pattern::set_steps`]
    /// under the name used in the combinator catalog.
    pub fn with_steps_override(self, steps: Fraction) -> Self {
        self.set_steps(Some(steps))
    }

    pub fn weight(&self) -> Fraction {
        self.weight
    }

    /// `Weighted`: pure metadata wrapper changing this pattern's proportional
    /// share in a weighted sequence, without touching `query`.
    pub fn with_weight(mut self, weight: Fraction) -> Self {
        self.weight = weight;
        self
    }

    pub fn estimate_cycle_duration(&self) -> Fraction {
        self.estimate_cycle_duration
    }

    /// `PropertyOverride` specialized to cycle-duration estimates (used by
    /// `Arrangement`/`RepeatCycles`-style wrappers).
    pub fn with_estimate_cycle_duration(mut self, cycles: Fraction) -> Self {
        self.estimate_cycle_duration = cycles;
        self
    }

    /// Generic `PropertyOverride`: stamp a metadata key onto every event's
    /// context without touching timing or value.
    pub fn with_property(self, key: impl Into<String>, value: Value) -> Pattern {
        let key = key.into();
        self.with_hap(move |hap| {
            let mut context = hap.context.clone();
            context.metadata.insert(key.clone(), value.clone());
            Hap::with_context(hap.whole, hap.part, hap.value.clone(), context)
        })
    }

    /// The functor map operation (fmap) over values.
    pub fn with_value<F>(self, func: F) -> Pattern
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let query_func = self.query_func.clone();
        Pattern {
            query_func: Arc::new(move |state| {
                query_func(state)
                    .into_iter()
                    .map(|hap| hap.with_value(&func))
                    .collect()
            }),
            ..self
        }
    }

    pub fn with_query_time<F>(self, func: F) -> Pattern
    where
        F: Fn(Fraction) -> Fraction + Send + Sync + 'static + Copy,
    {
        let query_func = self.query_func.clone();
        Pattern {
            query_func: Arc::new(move |state| {
                let new_span = TimeSpan::new(func(state.span.begin), func(state.span.end));
                query_func(state.set_span(new_span))
            }),
            ..self
        }
    }

    pub fn with_hap_time<F>(self, func: F) -> Pattern
    where
        F: Fn(Fraction) -> Fraction + Send + Sync + 'static + Copy,
    {
        let query_func = self.query_func.clone();
        Pattern {
            query_func: Arc::new(move |state| {
                query_func(state)
                    .into_iter()
                    .map(|hap| hap.with_span(|ts| TimeSpan::new(func(ts.begin), func(ts.end))))
                    .collect()
            }),
            ..self
        }
    }

    pub fn with_hap<F>(self, func: F) -> Pattern
    where
        F: Fn(&Hap) -> Hap + Send + Sync + 'static,
    {
        let query_func = self.query_func.clone();
        Pattern {
            query_func: Arc::new(move |state| query_func(state).into_iter().map(|hap| func(&hap)).collect()),
            ..self
        }
    }

    /// `Map(source, g)`: apply `g` to the entire cycle's event batch at once
    /// (allows filtering, sorting, deduplicating — anything `with_hap` can't
    /// do one event at a time).
    pub fn with_haps<F>(self, func: F) -> Pattern
    where
        F: Fn(Vec<Hap>) -> Vec<Hap> + Send + Sync + 'static,
    {
        let query_func = self.query_func.clone();
        Pattern {
            query_func: Arc::new(move |state| func(query_func(state))),
            ..self
        }
    }

    /// Alias for [`Pattern::with_haps`] under the combinator-catalog name.
    pub fn fmap(self, g: impl Fn(Vec<Hap>) -> Vec<Hap> + Send + Sync + 'static) -> Pattern {
        self.with_haps(g)
    }

    /// `Filter(source, pred)`: retain only events matching `pred`.
    pub fn filter_events(self, pred: impl Fn(&Hap) -> bool + Send + Sync + 'static) -> Pattern {
        self.with_haps(move |haps| haps.into_iter().filter(|h| pred(h)).collect())
    }

    /// Split queries at cycle boundaries, so per-cycle combinators (random
    /// choice, degrade, reverse, euclid) see one integer cycle at a time.
    pub fn split_queries(self) -> Pattern {
        let query_func = self.query_func.clone();
        Pattern {
            query_func: Arc::new(move |state| {
                let span = state.span;
                let begin_cycle = span.begin.floor();
                let end_cycle = span.end.ceil();

                let mut all_haps = Vec::new();
                let mut cycle = begin_cycle;
                while cycle < end_cycle {
                    let cycle_begin = if cycle < span.begin { span.begin } else { cycle };
                    let cycle_end = if cycle + Fraction::from_int(1) > span.end {
                        span.end
                    } else {
                        cycle + Fraction::from_int(1)
                    };

                    let cycle_span = TimeSpan::new(cycle_begin, cycle_end);
                    all_haps.extend(query_func(state.set_span(cycle_span)));
                    cycle = cycle + Fraction::from_int(1);
                }
                all_haps
            }),
            ..self
        }
    }

    pub fn fast(self, factor: f64) -> Pattern {
        self.fast_frac(Fraction::from_float(factor))
    }

    fn fast_frac(self, factor: Fraction) -> Pattern {
        self.with_query_time(move |t| t * factor).with_hap_time(move |t| t / factor)
    }

    pub fn slow(self, factor: f64) -> Pattern {
        self.fast_frac(Fraction::from_float(factor).reciprocal())
    }

    /// `Fast(p, k)` where `k` is itself a pattern: sample `k` once per cycle
    /// and splice the constant-factor result at cycle boundaries.
    pub fn fast_with(self, factor: &Pattern) -> Pattern {
        self.time_modifier_with(factor, |p, k| p.fast_frac(k))
    }

    /// `Slow(p, k)` where `k` is itself a pattern.
    pub fn slow_with(self, factor: &Pattern) -> Pattern {
        self.time_modifier_with(factor, |p, k| p.fast_frac(k.reciprocal()))
    }

    fn time_modifier_with(
        self,
        factor_pattern: &Pattern,
        apply: impl Fn(Pattern, Fraction) -> Pattern + Send + Sync + 'static,
    ) -> Pattern {
        let source = self;
        let factor_pattern = factor_pattern.clone();
        Pattern::new(move |state| {
            let factor_haps = factor_pattern.query(state.clone());
            factor_haps
                .into_iter()
                .flat_map(|fhap| {
                    let Some(factor) = fhap.value.as_number() else {
                        return Vec::new();
                    };
                    let factor = Fraction::from_float(factor);
                    if factor.is_zero() {
                        return Vec::new();
                    }
                    let sub_state = state.set_span(fhap.part);
                    apply(source.clone(), factor).query(sub_state)
                })
                .collect()
        })
        .split_queries()
    }

    pub fn repeat_cycles(self, n: usize) -> Pattern {
        if n <= 1 {
            return self;
        }

        let query_func = self.query_func.clone();
        let n_frac = Fraction::from_int(n as i64);
        let estimate = self.estimate_cycle_duration * n_frac;

        Pattern {
            query_func: Arc::new(move |state| {
                let cycle = state.span.begin.floor();
                let source_cycle = cycle / n_frac;
                let source_cycle_floor = source_cycle.floor();
                let delta = cycle - source_cycle_floor;

                let adjusted_state = state.with_span(|span| TimeSpan::new(span.begin - delta, span.end - delta));

                query_func(adjusted_state)
                    .into_iter()
                    .map(|hap| hap.with_span(|span| TimeSpan::new(span.begin + delta, span.end + delta)))
                    .collect()
            }),
            estimate_cycle_duration: estimate,
            ..self
        }
        .split_queries()
    }

    pub fn replicate(self, n: usize) -> Pattern {
        if n == 0 {
            return Pattern::new(|_| Vec::new());
        }
        if n == 1 {
            return self;
        }
        self.repeat_cycles(n).fast(n as f64)
    }

    /// `Euclidean(inner, pulses, steps, rotation)`: divide the cycle into
    /// `steps` equal slots per the Bjorklund distribution and, for each
    /// onset slot `[i/steps, (i+1)/steps)`, query `self` over that slot
    /// (imposing the rhythm's grid on `self` the way [`Pattern::struct_`]
    /// imposes a boolean structure pattern — `self` need not already emit
    /// one event per step). Negative `pulses` inverts the mask.
    pub fn euclid(self, pulses: i64, steps: usize, rotation: i64) -> Pattern {
        let rhythm = crate::euclid::bjorklund(pulses, steps, rotation);
        if rhythm.is_empty() {
            return Pattern::new(|_| Vec::new());
        }

        let structure = crate::combinators::fastcat(
            rhythm
                .iter()
                .map(|&onset| crate::combinators::pure(Value::Bool(onset)))
                .collect(),
        );
        self.struct_(structure)
    }

    /// `Degrade(p, prob)` with a constant probability: roll one number per
    /// cycle keyed by `(ctx.randomSeed, cycle, node_salt)`; drop all of that
    /// cycle's events if the roll is below `prob`.
    pub fn degrade_by(self, prob: f64) -> Pattern {
        let salt = prng::next_node_salt();
        let query_func = self.query_func.clone();
        Pattern {
            query_func: Arc::new(move |state| {
                let cycle = state.span.begin.floor().to_float() as i64;
                let roll = prng::uniform(state.random_seed(), cycle, salt);
                if roll < prob {
                    Vec::new()
                } else {
                    query_func(state)
                }
            }),
            ..self
        }
        .split_queries()
    }

    pub fn degrade(self) -> Pattern {
        self.degrade_by(0.5)
    }

    /// `Degrade` with a pattern-valued probability (Open Question 2):
    /// sampled per-event rather than once per cycle, since a patterned
    /// probability is by definition not constant across the cycle.
    pub fn degrade_with(self, prob_pattern: &Pattern) -> Pattern {
        let salt = prng::next_node_salt();
        let prob_pattern = prob_pattern.clone();
        let query_func = self.query_func.clone();
        Pattern {
            query_func: Arc::new(move |state| {
                let cycle = state.span.begin.floor().to_float() as i64;
                query_func(state.clone())
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, hap)| {
                        let prob = prob_pattern
                            .query(state.set_span(hap.part))
                            .first()
                            .and_then(|h| h.value.as_number())
                            .unwrap_or(0.0);
                        let roll = prng::uniform(state.random_seed(), cycle, salt.wrapping_add(i as u64));
                        (roll >= prob).then_some(hap)
                    })
                    .collect()
            }),
            ..self
        }
    }

    pub fn scale(self, scale_name: String) -> Pattern {
        self.with_hap(move |hap| {
            let mut new_context = hap.context.clone();
            new_context
                .metadata
                .insert("scale".to_string(), Value::String(scale_name.clone()));

            let new_value = match &hap.value {
                Value::Number(n) => {
                    let note_names = ["C", "D", "E", "F", "G", "A", "B"];
                    let step = (*n as i32).rem_euclid(note_names.len() as i32) as usize;
                    let octave = (*n as i32).div_euclid(note_names.len() as i32) + 3;
                    Value::String(format!("{}{}", note_names[step], octave))
                }
                _ => hap.value.clone(),
            };

            Hap::with_context(hap.whole, hap.part, new_value, new_context)
        })
    }

    /// `Struct(source, structPat)`: the structure pattern supplies timing;
    /// `source` supplies values. Events of `source` are resampled under each
    /// on-beat of `structPat` and re-spanned to that beat's `whole`.
    pub fn struct_(self, structure: Pattern) -> Pattern {
        let value_pattern = self;

        Pattern::new(move |state| {
            let mut result_haps = Vec::new();
            let structure_haps = structure.query(state.clone());

            for structure_hap in structure_haps {
                if !structure_hap.value.is_truthy() {
                    continue;
                }
                let value_state = state.set_span(structure_hap.whole_or_part());
                for value_hap in value_pattern.query(value_state) {
                    if let Some(new_part) = structure_hap.part.intersection(&value_hap.part) {
                        result_haps.push(Hap::new(structure_hap.whole, new_part, value_hap.value.clone()));
                    }
                }
            }

            result_haps
        })
    }

    /// `Mask(source, maskPat)`: unlike `Struct`, keeps `source`'s own timing.
    /// Retains events of `source` whose onset falls inside a truthy event of
    /// `maskPat`.
    pub fn mask(self, mask_pat: Pattern) -> Pattern {
        let source = self;
        Pattern::new(move |state| {
            let source_haps = source.query(state.clone());
            let mask_haps = mask_pat.query(state.clone());

            source_haps
                .into_iter()
                .filter(|hap| {
                    mask_haps
                        .iter()
                        .any(|m| m.value.is_truthy() && m.part.contains(hap.part.begin))
                })
                .collect()
        })
    }

    /// `Control(source, control, combiner)`: for each event of `source`,
    /// query `control` over that event's part and combine the two values.
    pub fn control(
        self,
        control: Pattern,
        combine: impl Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    ) -> Pattern {
        let source = self;
        Pattern::new(move |state| {
            source
                .query(state.clone())
                .into_iter()
                .flat_map(|hap| {
                    let control_state = state.set_span(hap.part);
                    control
                        .query(control_state)
                        .into_iter()
                        .filter_map(|chap| {
                            let part = hap.part.intersection(&chap.part)?;
                            let value = combine(&hap.value, &chap.value);
                            Some(Hap::with_context(hap.whole, part, value, hap.context.clone()))
                        })
                        .collect::<Vec<_>>()
                })
                .collect()
        })
    }

    /// `Bind(outer, f)`: monadic bind. For each event of `outer`, `f`
    /// produces an inner pattern (or `None` to skip it), which is queried
    /// over the outer event's part and clipped to it.
    pub fn bind(self, f: impl Fn(&Hap) -> Option<Pattern> + Send + Sync + 'static) -> Pattern {
        let outer = self;
        Pattern::new(move |state| {
            outer
                .query(state.clone())
                .into_iter()
                .flat_map(|ohap| {
                    let Some(inner) = f(&ohap) else {
                        return Vec::new();
                    };
                    inner
                        .query(state.set_span(ohap.part))
                        .into_iter()
                        .filter_map(|ihap| {
                            let part = ohap.part.intersection(&ihap.part)?;
                            Some(Hap::with_context(ihap.whole, part, ihap.value, ihap.context))
                        })
                        .collect::<Vec<_>>()
                })
                .collect()
        })
    }

    /// `Superimpose(p, f) = Stack(p, f(p))`.
    pub fn superimpose(self, f: impl Fn(&Pattern) -> Pattern) -> Pattern {
        let transformed = f(&self);
        crate::stack(vec![self, transformed])
    }

    /// `Take(p, k)`: keep the first `k` steps of `p`, stretched to fill the
    /// cycle. `k` may be fractional.
    pub fn take(self, k: Fraction) -> Pattern {
        let total_steps = self.get_steps().unwrap_or_else(|| Fraction::from_int(1));
        if total_steps.is_zero() || k.is_zero() {
            return Pattern::new(|_| Vec::new());
        }
        let stretch = total_steps / k;
        self.fast_frac(stretch.reciprocal())
            .set_steps(Some(k))
    }

    /// `Reverse(p)`: reverse each cycle independently, `t ↦ 2c+1−t` within
    /// cycle `[c, c+1)`.
    pub fn rev(self) -> Pattern {
        let query_func = self.query_func.clone();
        Pattern {
            query_func: Arc::new(move |state| {
                let span = state.span;
                let cycle = span.begin.floor();
                let mirror_point = cycle * Fraction::from_int(2) + Fraction::from_int(1);
                let mirrored_span = TimeSpan::new(mirror_point - span.end, mirror_point - span.begin);

                query_func(state.set_span(mirrored_span))
                    .into_iter()
                    .map(|hap| hap.with_span(|ts| TimeSpan::new(mirror_point - ts.end, mirror_point - ts.begin)))
                    .collect()
            }),
            ..self
        }
        .split_queries()
    }

    /// `ReverseWithControl(p, nPat)`: samples `nPat` to pick the reversal
    /// group size; when `n > 1`, mirrors across `n` consecutive cycles
    /// instead of one.
    pub fn reverse_with_control(self, n_pattern: &Pattern) -> Pattern {
        let source = self;
        let n_pattern = n_pattern.clone();
        Pattern::new(move |state| {
            let cycle = state.span.begin.floor();
            let n = n_pattern
                .query(state.clone())
                .first()
                .and_then(|h| h.value.as_number())
                .map(|n| n.max(1.0).round() as i64)
                .unwrap_or(1);

            let group_start = cycle.floor().to_float() as i64;
            let group_start = group_start - group_start.rem_euclid(n);
            let group_start = Fraction::from_int(group_start);
            let group_end = group_start + Fraction::from_int(n);

            let mirror_point = group_start + group_end;
            let span = state.span;
            let mirrored_span = TimeSpan::new(mirror_point - span.end, mirror_point - span.begin);

            source
                .query(state.set_span(mirrored_span))
                .into_iter()
                .map(|hap| hap.with_span(|ts| TimeSpan::new(mirror_point - ts.end, mirror_point - ts.begin)))
                .collect()
        })
        .split_queries()
    }

    pub fn tail(self, other: Pattern) -> Pattern {
        crate::fastcat(vec![self, other])
    }

    pub fn shift(self, amount: f64) -> Pattern {
        self.shift_frac(Fraction::from_float(amount))
    }

    fn shift_frac(self, amount: Fraction) -> Pattern {
        self.with_query_time(move |t| t - amount).with_hap_time(move |t| t + amount)
    }

    /// `TimeShift(p, off)` where `off` is itself a pattern, sampled per
    /// cycle like [`Pattern::fast_with`].
    pub fn shift_with(self, offset: &Pattern) -> Pattern {
        self.time_modifier_with(offset, |p, off| p.shift_frac(off))
    }

    pub fn early(self, amount: f64) -> Pattern {
        self.shift(-amount)
    }

    pub fn late(self, amount: f64) -> Pattern {
        self.shift(amount)
    }

    pub fn target(self, target_name: String) -> Pattern {
        self.with_property("target", Value::String(target_name))
    }

    /// `ContextModifier(p, update)`: query `p` with a context derived from
    /// the incoming one.
    pub fn with_context(self, update: impl Fn(State) -> State + Send + Sync + 'static) -> Pattern {
        let query_func = self.query_func.clone();
        Pattern {
            query_func: Arc::new(move |state| query_func(update(state))),
            ..self
        }
    }

    /// Affine-maps a unipolar `[0,1]` continuous signal's numeric output to
    /// `[lo,hi]`; non-numeric values pass through unchanged. Apply
    /// [`Pattern::from_bipolar`] first if the signal is bipolar.
    pub fn range(self, lo: f64, hi: f64) -> Pattern {
        self.with_value(move |v| match v.as_number() {
            Some(n) => Value::Number(lo + n * (hi - lo)),
            None => v.clone(),
        })
    }

    /// `ContextRangeMap`: the specialization of `ContextModifier` for
    /// `(rangeMin, rangeMax)`, used by continuous signals' `.range()`. Also
    /// records the bounds in the query context so that any child signal
    /// which itself reads `state.range()` (e.g. context-aware noise
    /// sources) sees the same bounds.
    pub fn with_range(self, lo: f64, hi: f64) -> Pattern {
        self.with_context(move |state| state.with_range(lo, hi))
            .range(lo, hi)
    }

    /// `fromBipolar`: maps a bipolar `[-1,1]` continuous signal to unipolar
    /// `[0,1]`, for use before [`Pattern::range`].
    pub fn from_bipolar(self) -> Pattern {
        self.with_value(|v| match v.as_number() {
            Some(n) => Value::Number((n + 1.0) / 2.0),
            None => v.clone(),
        })
    }
}

impl Clone for Pattern {
    fn clone(&self) -> Self {
        Pattern {
            query_func: self.query_func.clone(),
            steps: self.steps,
            weight: self.weight,
            estimate_cycle_duration: self.estimate_cycle_duration,
        }
    }
}
