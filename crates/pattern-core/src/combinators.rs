use crate::{prng, Fraction, Hap, Pattern, State, TimeSpan, Value};
use std::sync::Arc;

/// Create a pattern with a single constant value
///
/// The value is active for all time
pub fn pure(value: Value) -> Pattern {
    Pattern::new(move |state| {
        vec![Hap::new(Some(state.span), state.span, value.clone())]
    })
}

/// Create an empty/silent pattern
///
/// Returns no events for any query
pub fn silence() -> Pattern {
    Pattern::new(|_state| Vec::new())
}

/// Named alias for [`silence`] used by sequences that reserve a step
/// without a value (`~` in mini-notation).
pub fn gap(steps: Fraction) -> Pattern {
    silence().set_steps(Some(steps))
}

fn lcm_of_steps(patterns: &[Pattern]) -> Option<Fraction> {
    patterns
        .iter()
        .filter_map(|p| p.get_steps())
        .reduce(|acc, s| {
            let lcm_val = Fraction::lcm(acc.numerator * s.denominator, s.numerator * acc.denominator);
            Fraction::new(lcm_val / acc.denominator, s.denominator)
        })
}

/// Concatenate patterns, switching between them successively per cycle
///
/// This is also known as "slowcat" - each pattern plays for one full cycle
pub fn slowcat(patterns: Vec<Pattern>) -> Pattern {
    if patterns.is_empty() {
        return silence();
    }

    if patterns.len() == 1 {
        return patterns.into_iter().next().unwrap();
    }

    let pat_count = patterns.len() as i128;
    let steps = lcm_of_steps(&patterns);
    let patterns_rc = Arc::new(patterns);

    Pattern::with_steps(
        move |state| {
            let span = state.span;

            // Calculate which pattern to use based on the cycle
            let begin_cycle = span.begin.floor().numerator;
            let pat_n = begin_cycle.rem_euclid(pat_count);

            if let Some(pat) = patterns_rc.get(pat_n as usize) {
                // Calculate offset to make pattern cycles line up correctly
                let cycle_offset = Fraction::new(begin_cycle, 1)
                    - (Fraction::new(begin_cycle.div_euclid(pat_count), 1) * Fraction::new(pat_count, 1));

                // Query the pattern with adjusted timespan
                let adjusted_span = TimeSpan::new(span.begin - cycle_offset, span.end - cycle_offset);
                let adjusted_state = state.set_span(adjusted_span);

                pat.query(adjusted_state)
                    .into_iter()
                    .map(|hap| {
                        hap.with_span(|ts| {
                            TimeSpan::new(ts.begin + cycle_offset, ts.end + cycle_offset)
                        })
                    })
                    .collect()
            } else {
                Vec::new()
            }
        },
        steps,
    )
    .split_queries()
}

/// Concatenate patterns, cramming them all into one cycle
///
/// This is also known as "fastcat" or "sequence" - plays all patterns
/// within a single cycle, each getting an equal share. See [`timecat`] for
/// unequal shares.
pub fn fastcat(patterns: Vec<Pattern>) -> Pattern {
    if patterns.is_empty() {
        return silence();
    }
    let weighted = patterns
        .into_iter()
        .map(|p| (p.weight(), p))
        .collect();
    timecat(weighted)
}

/// `Sequence(source, weighted)`: lay out patterns within one cycle, each
/// occupying a span proportional to its weight (equal weights reduce to
/// plain [`fastcat`]).
pub fn timecat(weighted: Vec<(Fraction, Pattern)>) -> Pattern {
    if weighted.is_empty() {
        return silence();
    }
    if weighted.len() == 1 {
        return weighted.into_iter().next().unwrap().1;
    }

    let total_weight: Fraction = weighted
        .iter()
        .fold(Fraction::from_int(0), |acc, (w, _)| acc + *w);

    if total_weight.is_zero() {
        return silence();
    }

    let mut sections = Vec::with_capacity(weighted.len());
    let mut begin = Fraction::from_int(0);
    for (weight, pattern) in &weighted {
        let end = begin + (*weight / total_weight);
        sections.push((begin, end, pattern.clone()));
        begin = end;
    }

    let section_count = Fraction::from_int(weighted.len() as i64);
    Pattern::new(move |state| {
        sections
            .iter()
            .flat_map(|(begin, end, pattern)| {
                let cycle = state.span.begin.floor();
                let section_span = TimeSpan::new(cycle + *begin, cycle + *end);
                let Some(clipped) = state.span.intersection(&section_span) else {
                    return Vec::new();
                };
                let span_width = *end - *begin;
                let begin = *begin;
                pattern
                    .clone()
                    .with_query_time(move |t| (t - cycle - begin) / span_width + cycle)
                    .with_hap_time(move |t| (t - cycle) * span_width + cycle + begin)
                    .query(state.set_span(clipped))
            })
            .collect()
    })
    .set_steps(Some(section_count))
    .split_queries()
}

/// Alias for fastcat
pub fn sequence(patterns: Vec<Pattern>) -> Pattern {
    fastcat(patterns)
}

/// `Arrangement(sections)`: lay patterns end-to-end across multiple cycles,
/// each section `(cycles, pattern)` occupying `cycles` whole cycles rather
/// than a fraction of one (unlike [`timecat`]).
pub fn arrange(sections: Vec<(Fraction, Pattern)>) -> Pattern {
    if sections.is_empty() {
        return silence();
    }

    let total_cycles: Fraction = sections
        .iter()
        .fold(Fraction::from_int(0), |acc, (c, _)| acc + *c);

    let mut spans = Vec::with_capacity(sections.len());
    let mut begin = Fraction::from_int(0);
    for (cycles, pattern) in &sections {
        let end = begin + *cycles;
        spans.push((begin, end, pattern.clone()));
        begin = end;
    }

    Pattern::new(move |state| {
        spans
            .iter()
            .flat_map(|(begin, end, pattern)| {
                let section_span = TimeSpan::new(*begin, *end);
                let Some(clipped) = state.span.intersection(&section_span) else {
                    return Vec::new();
                };
                pattern
                    .clone()
                    .with_query_time(move |t| t - *begin)
                    .with_hap_time(move |t| t + *begin)
                    .query(state.set_span(clipped))
            })
            .collect()
    })
    .with_estimate_cycle_duration(total_cycles)
}

/// Stack/layer multiple patterns on top of each other
///
/// All patterns play simultaneously (polyrhythm)
pub fn stack(patterns: Vec<Pattern>) -> Pattern {
    if patterns.is_empty() {
        return silence();
    }

    if patterns.len() == 1 {
        return patterns.into_iter().next().unwrap();
    }

    let steps = lcm_of_steps(&patterns);
    let patterns_rc = Arc::new(patterns);

    Pattern::with_steps(
        move |state| {
            let mut haps: Vec<Hap> = patterns_rc
                .iter()
                .flat_map(|pat| pat.query(state.clone()))
                .collect();
            // Stable sort by part.begin only: flat_map already visits
            // children in order, so a stable sort preserves child index as
            // the tie-break, matching the `(part.begin, child_index)` order
            // the query contract requires.
            haps.sort_by(|a, b| a.part.begin.cmp(&b.part.begin));
            haps
        },
        steps,
    )
}

/// Alias for stack
pub fn polyrhythm(patterns: Vec<Pattern>) -> Pattern {
    stack(patterns)
}

/// Polymeter - play patterns with different step counts simultaneously
///
/// Each pattern is sped up proportionally so they all complete
/// their cycles at the same time based on LCM of step counts.
///
/// For example, `{bd sd, hh oh cp}`:
/// - Pattern 1 has 2 steps, Pattern 2 has 3 steps
/// - LCM(2, 3) = 6 steps
/// - Pattern 1 plays 3 times (2 * 3 = 6)
/// - Pattern 2 plays 2 times (3 * 2 = 6)
pub fn polymeter(patterns: Vec<Pattern>) -> Pattern {
    if patterns.is_empty() {
        return silence();
    }

    if patterns.len() == 1 {
        return patterns.into_iter().next().unwrap();
    }

    // Get step counts for each pattern
    let step_counts: Vec<i128> = patterns
        .iter()
        .map(|p| {
            p.get_steps()
                .map(|f| f.numerator)
                .unwrap_or(1)
        })
        .collect();

    // Calculate LCM of all step counts
    let total_steps = step_counts
        .iter()
        .fold(1, |acc, &s| Fraction::lcm(acc, s));

    // Speed up each pattern proportionally
    let adjusted_patterns: Vec<Pattern> = patterns
        .into_iter()
        .zip(step_counts.iter())
        .map(|(pat, &steps)| {
            let speed_factor = (total_steps as f64) / (steps as f64);
            pat.fast(speed_factor)
        })
        .collect();

    // Stack the adjusted patterns
    stack(adjusted_patterns)
}

/// Choose - randomly select one pattern per cycle, keyed by
/// `(ctx.randomSeed, cycle, node_salt)`. Set a seed via
/// `State::with_random_seed` for reproducible selection.
pub fn choose(patterns: Vec<Pattern>) -> Pattern {
    if patterns.is_empty() {
        return silence();
    }

    if patterns.len() == 1 {
        return patterns.into_iter().next().unwrap();
    }

    let salt = prng::next_node_salt();
    let patterns_rc = Arc::new(patterns);
    let pat_count = patterns_rc.len();

    Pattern::new(move |state| {
        let cycle = state.span.begin.floor().to_float() as i64;
        let roll = prng::uniform(state.random_seed(), cycle, salt);
        let choice = ((roll * pat_count as f64) as usize).min(pat_count - 1);

        patterns_rc[choice].query(state)
    })
    .split_queries()
}

/// Choose with weights - randomly select one pattern per cycle using
/// weighted probabilities, keyed the same way as [`choose`].
///
/// # Arguments
/// * `patterns_with_weights` - Vector of (pattern, weight) tuples
///
/// # Examples
/// ```
/// use pattern_core::{pure, Value, choose_weighted};
///
/// let bd = pure(Value::String("bd".into()));
/// let sd = pure(Value::String("sd".into()));
/// let cp = pure(Value::String("cp".into()));
///
/// // bd is 2x more likely to be selected than sd or cp
/// let pattern = choose_weighted(vec![(bd, 2.0), (sd, 1.0), (cp, 1.0)]);
/// ```
pub fn choose_weighted(patterns_with_weights: Vec<(Pattern, f64)>) -> Pattern {
    if patterns_with_weights.is_empty() {
        return silence();
    }

    if patterns_with_weights.len() == 1 {
        return patterns_with_weights.into_iter().next().unwrap().0;
    }

    let salt = prng::next_node_salt();
    let patterns: Vec<Pattern> = patterns_with_weights.iter().map(|(p, _)| p.clone()).collect();
    let weights: Vec<f64> = patterns_with_weights.iter().map(|(_, w)| *w).collect();

    let patterns_rc = Arc::new(patterns);
    let weights_rc = Arc::new(weights);

    Pattern::new(move |state| {
        let cycle = state.span.begin.floor().to_float() as i64;
        let roll = prng::uniform(state.random_seed(), cycle, salt);

        let total_weight: f64 = weights_rc.iter().sum();
        if total_weight <= 0.0 {
            let choice = ((roll * patterns_rc.len() as f64) as usize).min(patterns_rc.len() - 1);
            return patterns_rc[choice].query(state);
        }

        let target = roll * total_weight;
        let mut cumulative = 0.0;
        for (i, weight) in weights_rc.iter().enumerate() {
            cumulative += weight;
            if target < cumulative {
                return patterns_rc[i].query(state);
            }
        }
        patterns_rc[patterns_rc.len() - 1].query(state)
    })
    .split_queries()
}

/// `Randrun(n)`: each cycle, emit a Fisher-Yates shuffle of `0..n` as `n`
/// equal steps, keyed like [`choose`].
pub fn randrun(n: usize) -> Pattern {
    if n == 0 {
        return silence();
    }
    let salt = prng::next_node_salt();
    Pattern::with_steps(
        move |state| {
            let cycle = state.span.begin.floor().to_float() as i64;
            let order = prng::shuffled_indices(state.random_seed(), cycle, salt, n);
            let cycle_start = state.span.begin.floor();
            let step = Fraction::new(1, n as i128);

            order
                .into_iter()
                .enumerate()
                .filter_map(|(i, value)| {
                    let begin = cycle_start + step * Fraction::from_int(i as i64);
                    let end = begin + step;
                    let whole = TimeSpan::new(begin, end);
                    let part = whole.intersection(&state.span)?;
                    Some(Hap::new(Some(whole), part, Value::Number(value as f64)))
                })
                .collect()
        },
        Some(Fraction::from_int(n as i64)),
    )
    .split_queries()
}

/// `FirstOf(p, n, transform)`: apply `transform` on cycle `0 mod n`, pass
/// `p` through unchanged otherwise.
pub fn first_of(p: Pattern, n: i64, transform: impl Fn(&Pattern) -> Pattern + Send + Sync + 'static) -> Pattern {
    nth_of(p, n, 0, transform)
}

/// `LastOf(p, n, transform)`: apply `transform` on cycle `n-1 mod n`.
pub fn last_of(p: Pattern, n: i64, transform: impl Fn(&Pattern) -> Pattern + Send + Sync + 'static) -> Pattern {
    if n <= 0 {
        return silence();
    }
    nth_of(p, n, n - 1, transform)
}

fn nth_of(p: Pattern, n: i64, target: i64, transform: impl Fn(&Pattern) -> Pattern + Send + Sync + 'static) -> Pattern {
    if n <= 0 {
        return silence();
    }
    let transformed = transform(&p);
    let n128 = n as i128;
    let target128 = target as i128;
    Pattern::new(move |state| {
        let cycle = state.span.begin.floor().numerator;
        let g = cycle.rem_euclid(n128);
        if g == target128 {
            transformed.query(state)
        } else {
            p.query(state)
        }
    })
    .split_queries()
}

/// `ContinuousSignal(f)`: a `Static`-family pattern with no discrete
/// `whole` — the value is computed from the query span's midpoint and the
/// query context, per `fn(from, ctx)`. Chain [`Pattern::from_bipolar`] and
/// [`Pattern::range`]/[`Pattern::with_range`] to rescale the raw output.
pub fn signal(f: impl Fn(f64, &State) -> f64 + Send + Sync + 'static) -> Pattern {
    Pattern::new(move |state| {
        let mid = state.span.midpoint().to_float();
        let value = Value::Number(f(mid, &state));
        vec![Hap::new(None, state.span, value)]
    })
}

/// `Static(events)`: a fixed, pre-computed set of `(whole, value)` pairs
/// replayed every cycle, clipped to the query span.
pub fn static_pattern(events: Vec<(TimeSpan, Value)>) -> Pattern {
    Pattern::new(move |state| {
        events
            .iter()
            .filter_map(|(whole, value)| {
                let part = whole.intersection(&state.span)?;
                Some(Hap::new(Some(*whole), part, value.clone()))
            })
            .collect()
    })
}

/// `Aligned(p, srcDur, tgtDur, bias)`: stretch/compress `p` from a source
/// duration to a target duration, with `bias` in `[0,1]` choosing where the
/// stretch is anchored (0 = anchor start, 1 = anchor end).
pub fn aligned(p: Pattern, src_dur: Fraction, tgt_dur: Fraction, bias: f64) -> Pattern {
    if src_dur.is_zero() {
        return silence();
    }
    let factor = tgt_dur / src_dur;
    let bias = bias.clamp(0.0, 1.0);
    let anchor = src_dur.to_float() * bias;
    let anchor = Fraction::from_float(anchor);

    p.with_query_time(move |t| (t - anchor) / factor + anchor)
        .with_hap_time(move |t| (t - anchor) * factor + anchor)
}

/// `Control(source, control, combiner)` as a free function, mirroring
/// [`Pattern::control`].
pub fn control(
    source: Pattern,
    control_pattern: Pattern,
    combine: impl Fn(&Value, &Value) -> Value + Send + Sync + 'static,
) -> Pattern {
    source.control(control_pattern, combine)
}

/// `Bind(outer, f)` as a free function, mirroring [`Pattern::bind`].
pub fn bind(outer: Pattern, f: impl Fn(&Hap) -> Option<Pattern> + Send + Sync + 'static) -> Pattern {
    outer.bind(f)
}
