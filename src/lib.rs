//! # derivviz
//!
//! A regular expression to DFA compiler built on Brzozowski's derivatives.
//!
//! This library provides functionality to:
//! - Parse regular expressions into syntax trees
//! - Simplify and differentiate regular expressions
//! - Build DFAs directly from the derivatives of a regular expression
//! - Match strings against the constructed automata
//! - Export the automata as Graphviz descriptions or JSON
//! - Visualize the automata state machine

pub mod derivative;
pub mod dfa;
pub mod fa;
pub mod regex;
pub mod visualizer;

// Re-export commonly used functions for convenience
pub use dfa::{construct_dfa, DFA};
pub use fa::FA;
pub use regex::{parse_regex, RegExError, Regex};
pub use visualizer::visualize;
