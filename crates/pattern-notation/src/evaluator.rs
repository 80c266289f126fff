/// Evaluator for mini notation AST
///
/// Converts parsed AST nodes into executable pattern-core patterns
use crate::ast::*;
use crate::error::{ParseError, Result};
use pattern_core::{choose, choose_weighted, fastcat, polymeter, pure, silence, slowcat, stack, timecat, Fraction, Pattern, State, TimeSpan, Value};

/// Evaluate an AST node into a Pattern
pub fn evaluate(ast: &Ast) -> Result<Pattern> {
    match ast {
        Ast::Atom(atom) => eval_atom(atom),
        Ast::Pattern(pattern) => eval_pattern(pattern),
        Ast::Element(element) => eval_element(element),
        Ast::Operator(op) => eval_operator(op),
        Ast::Command(_) => Ok(silence()), // Commands don't produce patterns
    }
}

/// Evaluate an atom into a constant pattern
fn eval_atom(atom: &AtomNode) -> Result<Pattern> {
    match &atom.value {
        AtomValue::Number(n) => Ok(pure(Value::Number(*n)).split_queries()),
        AtomValue::String(s) => Ok(pure(Value::String(s.clone())).split_queries()),
        AtomValue::Silence => Ok(silence()),
    }
}

/// Evaluate a pattern node with alignment
fn eval_pattern(pattern: &PatternNode) -> Result<Pattern> {
    // Handle empty patterns
    if pattern.children.is_empty() {
        return Ok(silence());
    }

    // Apply alignment
    let result = match pattern.alignment {
        Alignment::Fastcat => {
            // Each child may carry an `@`-weight (default 1); weight
            // determines its proportional share of the cycle, so this
            // always goes through `timecat` rather than plain `fastcat`
            // (equal weights make the two equivalent).
            let weighted: Result<Vec<_>> = pattern
                .children
                .iter()
                .map(|child| {
                    let weight = Fraction::from_float(extract_weight(child));
                    let pat = evaluate(child)?;
                    Ok((weight, pat))
                })
                .collect();
            timecat(weighted?)
        }
        Alignment::Stack => {
            let child_patterns: Result<Vec<_>> = pattern
                .children
                .iter()
                .map(evaluate)
                .collect();
            stack(child_patterns?)
        }
        Alignment::PolymeterSlowcat => {
            let child_patterns: Result<Vec<_>> = pattern
                .children
                .iter()
                .map(evaluate)
                .collect();
            slowcat(child_patterns?)
        }
        Alignment::Rand => {
            // Extract weights and evaluate patterns. The node's randomness
            // is keyed by `(ctx.randomSeed, cycle, node_salt)`, where
            // `node_salt` is assigned once per `choose`/`choose_weighted`
            // call by `pattern_core::prng::next_node_salt` — the parser's
            // per-`|`-site `pattern.seed` counter is no longer threaded
            // through as an argument.
            let patterns_with_weights: Result<Vec<_>> = pattern
                .children
                .iter()
                .map(|child| {
                    let weight = extract_weight(child);
                    let pat = evaluate(child)?;
                    Ok((pat, weight))
                })
                .collect();

            let patterns_with_weights = patterns_with_weights?;

            // Check if any weights are non-default (> 1.0)
            let has_weights = patterns_with_weights.iter().any(|(_, w)| *w > 1.0);

            if has_weights {
                choose_weighted(patterns_with_weights)
            } else {
                // All weights are 1.0, use unweighted choose
                let child_patterns = patterns_with_weights.into_iter().map(|(p, _)| p).collect();
                choose(child_patterns)
            }
        }
        Alignment::Polymeter => {
            let child_patterns: Result<Vec<_>> = pattern
                .children
                .iter()
                .map(evaluate)
                .collect();
            polymeter(child_patterns?)
        }
        Alignment::Feet => {
            // Feet/dot operator: like fastcat but children are treated as complete sub-patterns
            // "a . b c" is equivalent to "[a] [b c]"
            // Each dot-separated section gets equal time in the cycle
            let child_patterns: Result<Vec<_>> = pattern
                .children
                .iter()
                .map(evaluate)
                .collect();
            fastcat(child_patterns?)
        }
    };

    Ok(result)
}

/// Evaluate an element with operators applied
fn eval_element(element: &ElementNode) -> Result<Pattern> {
    let mut pattern = evaluate(&element.source)?;

    // Apply operators in sequence
    // Note: reps is redundant with Replicate operator, so we ignore it here
    for op in &element.ops {
        pattern = apply_slice_op(pattern, op)?;
    }

    // `element.weight` is read by the parent `Pattern`/sequence node
    // (`extract_weight`), not applied here: a bare element carries no
    // opinion about its own proportional share, only its container does.

    Ok(pattern)
}

/// Apply a slice operator to a pattern
fn apply_slice_op(pattern: Pattern, op: &SliceOp) -> Result<Pattern> {
    match op {
        SliceOp::Stretch { amount, op_type } => {
            // For now, we only handle numeric stretch amounts
            // Pattern-based stretch would require applicative pattern operations
            let amount_val = extract_number(amount)?;
            match op_type {
                StretchType::Fast => Ok(pattern.fast(amount_val)),
                StretchType::Slow => Ok(pattern.slow(amount_val)),
            }
        }
        SliceOp::Replicate { amount } => Ok(pattern.replicate(*amount)),
        SliceOp::Bjorklund {
            pulse,
            step,
            rotation,
        } => {
            let pulse_val = extract_number(pulse)? as i64;
            let step_val = extract_number(step)? as usize;
            let rotation_val = rotation
                .as_ref()
                .map(|r| extract_number(r).map(|v| v as i64))
                .transpose()?
                .unwrap_or(0);

            Ok(pattern.euclid(pulse_val, step_val, rotation_val))
        }
        SliceOp::DegradeBy { amount, seed: _ } => {
            // The parser assigns each `?` site a distinct counter value for
            // AST fidelity, but `degrade_by`'s randomness is keyed by the
            // combinator's own node salt (assigned at construction time),
            // not by this counter.
            let degrade_amount = amount.unwrap_or(0.5);
            Ok(pattern.degrade_by(degrade_amount))
        }
        SliceOp::Tail { element } => {
            // Tail operator (:) appends another pattern to this one
            // "a:b" means [a, b] - concatenate patterns within a cycle
            let tail_pattern = evaluate(element)?;
            Ok(pattern.tail(tail_pattern))
        }
        SliceOp::Range { element } => {
            // Range operator: start..end expands to [start, start+1, ..., end]
            // Extract start from the source pattern (must be a number)
            let start = extract_number_from_pattern(&pattern)?;
            let end = extract_number(element)?;

            // Create a sequence of numbers from start to end (inclusive)
            let mut numbers = Vec::new();
            if start <= end {
                let mut current = start;
                while current <= end {
                    numbers.push(current);
                    current += 1.0;
                }
            } else {
                // Descending range
                let mut current = start;
                while current >= end {
                    numbers.push(current);
                    current -= 1.0;
                }
            }

            // Convert to patterns and fastcat them
            let patterns: Vec<Pattern> = numbers
                .into_iter()
                .map(|n| pure(Value::Number(n)).split_queries())
                .collect();

            Ok(fastcat(patterns))
        }
    }
}

/// Evaluate top-level operators
fn eval_operator(op: &OperatorNode) -> Result<Pattern> {
    let source_pattern = evaluate(&op.source)?;

    match op.op_type {
        OperatorType::Fast => match &op.args {
            OperatorArgs::Number(n) => Ok(source_pattern.fast(*n)),
            _ => Err(ParseError::custom(
                "Fast operator requires numeric argument",
                Some(op.span),
            )),
        },
        OperatorType::Slow => match &op.args {
            OperatorArgs::Number(n) => Ok(source_pattern.slow(*n)),
            _ => Err(ParseError::custom(
                "Slow operator requires numeric argument",
                Some(op.span),
            )),
        },
        OperatorType::Bjorklund => match &op.args {
            OperatorArgs::Bjorklund {
                pulse,
                step,
                rotation,
            } => Ok(source_pattern.euclid(
                *pulse as i64,
                *step as usize,
                rotation.map(|r| r as i64).unwrap_or(0),
            )),
            _ => Err(ParseError::custom(
                "Bjorklund operator requires pulse, step, and optional rotation",
                Some(op.span),
            )),
        },
        OperatorType::Scale => match &op.args {
            OperatorArgs::String(scale_name) => Ok(source_pattern.scale(scale_name.clone())),
            _ => Err(ParseError::custom(
                "Scale operator requires string argument",
                Some(op.span),
            )),
        },
        OperatorType::Struct => match &op.args {
            OperatorArgs::Pattern(structure_ast) => {
                // Evaluate the structure pattern
                let structure_pattern = evaluate(structure_ast)?;
                Ok(source_pattern.struct_(structure_pattern))
            }
            _ => Err(ParseError::custom(
                "Struct operator requires pattern argument",
                Some(op.span),
            )),
        },
        OperatorType::Shift => match &op.args {
            OperatorArgs::Number(n) => Ok(source_pattern.shift(*n)),
            _ => Err(ParseError::custom(
                "Shift operator requires numeric argument",
                Some(op.span),
            )),
        },
        OperatorType::Target => match &op.args {
            OperatorArgs::String(target_name) => Ok(source_pattern.target(target_name.clone())),
            _ => Err(ParseError::custom(
                "Target operator requires string argument",
                Some(op.span),
            )),
        },
    }
}

/// Helper function to extract a number from an AST node
fn extract_number(ast: &Ast) -> Result<f64> {
    match ast {
        Ast::Atom(atom) => match &atom.value {
            AtomValue::Number(n) => Ok(*n),
            _ => Err(ParseError::custom(
                "Expected number, got non-numeric atom",
                Some(atom.span),
            )),
        },
        // Handle Element nodes that wrap simple atoms
        Ast::Element(element) if element.ops.is_empty() => {
            extract_number(&element.source)
        }
        _ => Err(ParseError::custom(
            "Expected number, got complex expression",
            Some(ast.span()),
        )),
    }
}

/// Helper function to extract a number from a Pattern by querying it
/// Returns the numeric value if the pattern produces exactly one numeric event
fn extract_number_from_pattern(pattern: &Pattern) -> Result<f64> {
    let state = State::new(TimeSpan::new(Fraction::from_int(0), Fraction::from_int(1)));
    let haps = pattern.query(state);

    if haps.len() != 1 {
        return Err(ParseError::custom(
            "Range operator requires source to be a single number",
            None,
        ));
    }

    match &haps[0].value {
        Value::Number(n) => Ok(*n),
        _ => Err(ParseError::custom(
            "Range operator requires source to be a number",
            None,
        )),
    }
}

/// Helper function to extract weight from an AST node
/// Returns the weight value, defaulting to 1.0 if no weight is found
fn extract_weight(ast: &Ast) -> f64 {
    match ast {
        // Pattern nodes: check if they have a single element and extract its weight
        Ast::Pattern(pattern) => {
            if pattern.children.len() == 1 {
                extract_weight(&pattern.children[0])
            } else {
                1.0
            }
        }
        // Element nodes have weight directly
        Ast::Element(element) => element.weight,
        // Other nodes have default weight
        _ => 1.0,
    }
}
