//! Core types and utilities for Strudel pattern language
//!
//! This crate provides the foundational types and functions for working with
//! Strudel-style patterns in Rust. It includes pattern combinators, timing
//! utilities, and value types that form the basis of the Strudel ecosystem.
//!
//! # Examples
//!
//! ```
//! use pattern_core::{pure, sequence, fastcat, Value};
//!
//! // Create a simple pattern
//! let pattern = sequence(vec![
//!     pure(Value::String("bd".into())),
//!     pure(Value::String("sd".into())),
//! ]);
//! ```
//!
//! # Main Components
//!
//! - **Pattern**: The core pattern type
//! - **Value**: Values that patterns can contain (strings, numbers, etc.)
//! - **Hap**: A pattern event with timing and value
//! - **TimeSpan**: Represents time intervals
//! - **Combinators**: Functions for combining and transforming patterns
//! - **Transform**: The seam a host scripting layer plugs into

pub mod combinators;
pub mod error;
pub mod euclid;
pub mod fraction;
pub mod hap;
pub mod pattern;
pub mod prng;
pub mod state;
pub mod timespan;
pub mod transform;
pub mod value;

pub use combinators::{
    aligned, arrange, bind, choose, choose_weighted, control, fastcat, first_of, gap, last_of,
    polymeter, polyrhythm, pure, randrun, sequence, signal, silence, slowcat, stack,
    static_pattern, timecat,
};
pub use error::{CoreError, Result};
pub use euclid::{bjorklund, euclidean_morph};
pub use fraction::Fraction;
pub use hap::{Context, Hap};
pub use pattern::Pattern;
pub use state::State;
pub use timespan::TimeSpan;
pub use transform::{ScriptError, Transform};
pub use value::Value;
