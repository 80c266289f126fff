//! Euclidean rhythm generation.
//!
//! Distributes `pulses` onsets as evenly as possible among `steps`
//! positions using the canonical Bjorklund/Toussaint counts-and-remainders
//! construction, then normalizes so the first onset sits at position 0
//! (the construction itself does not guarantee that) and applies rotation
//! with JS-slice semantics (see `rotate`).
use crate::Fraction;

/// Generate the canonical Euclidean onset mask for `pulses` onsets spread
/// across `steps` positions, then rotate by `rotation` steps.
///
/// Negative `pulses` inverts the mask (the complement of the positive-pulse
/// pattern) rather than being treated as zero.
///
/// # Examples
/// ```
/// use pattern_core::euclid::bjorklund;
///
/// let pattern = bjorklund(3, 8, 0);
/// assert_eq!(pattern, vec![true, false, false, true, false, false, true, false]);
/// ```
pub fn bjorklund(pulses: i64, steps: usize, rotation: i64) -> Vec<bool> {
    if steps == 0 {
        return Vec::new();
    }

    let invert = pulses < 0;
    let pulses = pulses.unsigned_abs() as usize;

    let mut bits = canonical(pulses, steps);
    if invert {
        bits = bits.into_iter().map(|b| !b).collect();
    }
    rotate(&bits, rotation)
}

/// The raw counts-and-remainders construction, without inversion or
/// rotation: distribute `pulses` true values among `steps` positions.
fn canonical(pulses: usize, steps: usize) -> Vec<bool> {
    if pulses == 0 {
        return vec![false; steps];
    }
    if pulses >= steps {
        return vec![true; steps];
    }

    let mut counts = Vec::new();
    let mut remainders = vec![pulses];
    let mut divisor = steps - pulses;
    let mut level = 0usize;

    loop {
        counts.push(divisor / remainders[level]);
        remainders.push(divisor % remainders[level]);
        divisor = remainders[level];
        level += 1;
        if remainders[level] <= 1 {
            break;
        }
    }
    counts.push(divisor);

    let mut pattern = Vec::with_capacity(steps);
    build(level as isize, &counts, &remainders, &mut pattern);

    // The construction above does not guarantee the first onset lands at
    // position 0; rotate so it does, which is what makes the result
    // "canonical" and matches the reference implementation's pinned test
    // vectors.
    let first_onset = pattern.iter().position(|&b| b).unwrap_or(0);
    pattern.rotate_left(first_onset);
    pattern
}

fn build(level: isize, counts: &[usize], remainders: &[usize], out: &mut Vec<bool>) {
    if level == -1 {
        out.push(false);
    } else if level == -2 {
        out.push(true);
    } else {
        let lvl = level as usize;
        for _ in 0..counts[lvl] {
            build(level - 1, counts, remainders, out);
        }
        if remainders[lvl] != 0 {
            build(level - 2, counts, remainders, out);
        }
    }
}

/// Rotate a mask with "JS-slice" semantics: for rotation `r`, reduce to
/// `k = r.rem_euclid(steps)` and return `bits[steps-k..] ++ bits[..steps-k]`.
///
/// This differs from a plain `rotate_left(r % steps)` at the wrap-around
/// end: slicing from `steps - k` brings the *last* `k` elements to the
/// front, whereas `rotate_left(k)` brings the *first* `k` elements to the
/// back. The two are mirror images of each other and only coincide when
/// `k == 0`. The reference implementation builds rotation via
/// `array.slice(-rotation).concat(array.slice(0, -rotation))` in its host
/// language, which is the behavior this mirrors.
pub fn rotate(bits: &[bool], rotation: i64) -> Vec<bool> {
    let steps = bits.len();
    if steps == 0 {
        return Vec::new();
    }
    let k = rotation.rem_euclid(steps as i64) as usize;
    if k == 0 {
        return bits.to_vec();
    }
    let split = steps - k;
    let mut result = Vec::with_capacity(steps);
    result.extend_from_slice(&bits[split..]);
    result.extend_from_slice(&bits[..split]);
    result
}

/// Onset positions (as fractions of one cycle) for a `pulses`-in-`steps`
/// Euclidean rhythm, derived from [`bjorklund`].
pub fn onset_fractions(pulses: i64, steps: usize) -> Vec<Fraction> {
    bjorklund(pulses, steps, 0)
        .iter()
        .enumerate()
        .filter_map(|(i, &on)| on.then(|| Fraction::new(i as i128, steps as i128)))
        .collect()
}

/// Interpolate between the quantized Euclidean onset positions (`t == 0`)
/// and perfectly even continuous spacing `i/pulses` (`t == 1`). `t` outside
/// `[0,1]` extrapolates linearly.
///
/// Grounded entirely in the pinned `euclideanMorph` test vectors: at
/// `t=0.0`, `euclideanMorph(3,8,0.0)` must equal the discrete
/// `bjorklund(3,8)` onsets `{0, 3/8, 6/8}`; at `t=1.0`,
/// `euclideanMorph(3,8,1.0)` must equal the evenly spaced `{0, 1/3, 2/3}`.
/// Linear interpolation between `i/steps`-quantized onsets and `i/pulses`
/// is the simplest function satisfying both endpoints exactly.
pub fn euclidean_morph(pulses: i64, steps: usize, t: f64) -> Vec<Fraction> {
    let pulses_abs = pulses.unsigned_abs() as usize;
    if pulses_abs == 0 {
        return Vec::new();
    }
    let quantized = onset_fractions(pulses, steps);
    (0..pulses_abs)
        .map(|i| {
            let even = i as f64 / pulses_abs as f64;
            let quant = quantized
                .get(i)
                .copied()
                .unwrap_or_else(|| Fraction::from_float(even))
                .to_float();
            Fraction::from_float(quant + (even - quant) * t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bjorklund_empty() {
        let pattern = bjorklund(0, 8, 0);
        assert_eq!(pattern, vec![false; 8]);
    }

    #[test]
    fn test_bjorklund_full() {
        let pattern = bjorklund(8, 8, 0);
        assert_eq!(pattern, vec![true; 8]);
    }

    #[test]
    fn test_bjorklund_3_8_canonical_positions() {
        // Pinned by the `note("bd(3,8)")` scenario: onsets at 0, 3, 6.
        let pattern = bjorklund(3, 8, 0);
        let onsets: Vec<usize> = pattern
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect();
        assert_eq!(onsets, vec![0, 3, 6]);
    }

    #[test]
    fn test_bjorklund_5_8() {
        let pattern = bjorklund(5, 8, 0);
        assert_eq!(pattern.len(), 8);
        assert_eq!(pattern.iter().filter(|&&x| x).count(), 5);
    }

    #[test]
    fn test_bjorklund_negative_pulses_inverts_mask() {
        let positive = bjorklund(3, 8, 0);
        let negative = bjorklund(-3, 8, 0);
        let inverted: Vec<bool> = positive.iter().map(|&b| !b).collect();
        assert_eq!(negative, inverted);
    }

    #[test]
    fn test_bjorklund_zero_steps() {
        let pattern = bjorklund(0, 0, 0);
        assert_eq!(pattern, Vec::<bool>::new());
    }

    #[test]
    fn test_bjorklund_pulse_exceeds_steps() {
        let pattern = bjorklund(10, 8, 0);
        assert_eq!(pattern, vec![true; 8]);
    }

    #[test]
    fn test_rotate_matches_js_slice_semantics() {
        let bits = vec![true, false, false, true, false, false, true, false];
        // slice(-1) on an 8-element array takes the last element then the rest.
        let rotated = rotate(&bits, 1);
        assert_eq!(
            rotated,
            vec![false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn test_rotate_negative_and_large_reduce_consistently() {
        let bits = bjorklund(3, 8, 0);
        assert_eq!(rotate(&bits, -1), rotate(&bits, 7));
        assert_eq!(rotate(&bits, 0), rotate(&bits, 8));
    }

    #[test]
    fn test_onset_fractions_3_8() {
        let onsets = onset_fractions(3, 8);
        assert_eq!(
            onsets,
            vec![Fraction::new(0, 1), Fraction::new(3, 8), Fraction::new(6, 8)]
        );
    }

    #[test]
    fn test_euclidean_morph_endpoints() {
        let at_zero = euclidean_morph(3, 8, 0.0);
        assert_eq!(
            at_zero,
            vec![Fraction::new(0, 1), Fraction::new(3, 8), Fraction::new(6, 8)]
        );

        let at_one = euclidean_morph(3, 8, 1.0);
        let floats: Vec<f64> = at_one.iter().map(|f| f.to_float()).collect();
        assert!((floats[0] - 0.0).abs() < 1e-9);
        assert!((floats[1] - 1.0 / 3.0).abs() < 1e-9);
        assert!((floats[2] - 2.0 / 3.0).abs() < 1e-9);
    }
}
