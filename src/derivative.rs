/* Brzozowski derivatives over the regex syntax tree. Every derivative is simplified before it
 * is handed back, which keeps the set of distinct derivatives of a pattern finite and lets the
 * DFA builder use the simplified expressions directly as states. */

use crate::regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

impl Regex {
    /// Returns true if the language of the expression contains the empty string
    pub fn is_nullable(&self) -> bool {
        match self {
            Regex::EmptySet => false,
            Regex::Epsilon => true,
            Regex::Literal(_) => false,
            Regex::Union(left, right) => left.is_nullable() || right.is_nullable(),
            Regex::Concat(left, right) => left.is_nullable() && right.is_nullable(),
            Regex::Star(_) => true,
        }
    }

    /// Rewrite the expression into its normal form. Unions are flattened, stripped of
    /// empty sets and deduplicated in first seen order, and the identities of the empty set
    /// and the empty string are applied to concatenations and stars.
    pub fn simplify(&self) -> Regex {
        match self {
            Regex::Union(_, _) => simplify_union(self),
            Regex::Concat(left, right) => {
                let left = left.simplify();
                let right = right.simplify();

                if matches!(left, Regex::EmptySet) || matches!(right, Regex::EmptySet) {
                    Regex::EmptySet
                } else if matches!(left, Regex::Epsilon) {
                    right
                } else if matches!(right, Regex::Epsilon) {
                    left
                } else {
                    Regex::concat(left, right)
                }
            }
            Regex::Star(inner) => match inner.simplify() {
                Regex::EmptySet | Regex::Epsilon => Regex::Epsilon,
                inner => Regex::star(inner),
            },
            Regex::EmptySet | Regex::Epsilon | Regex::Literal(_) => self.clone(),
        }
    }

    /// Applies a symbol to a regex. The result matches everything that may follow the
    /// symbol, like going from regex(abab) to regex(bab) on seeing an a.
    pub fn derivative(&self, symbol: char) -> Regex {
        self.derive(symbol, true)
    }

    /// `star_shortcut` toggles the fixed point a* -> a* on the symbol a. The result is the
    /// same expression either way, the shortcut only skips building it.
    pub(crate) fn derive(&self, symbol: char, star_shortcut: bool) -> Regex {
        match self {
            Regex::EmptySet | Regex::Epsilon => Regex::EmptySet,
            Regex::Literal(ch) => {
                if *ch == symbol {
                    Regex::Epsilon
                } else {
                    Regex::EmptySet
                }
            }
            Regex::Union(left, right) => Regex::union(
                left.derive(symbol, star_shortcut),
                right.derive(symbol, star_shortcut),
            )
            .simplify(),
            Regex::Concat(left, right) => {
                let new = Regex::Concat(Rc::new(left.derive(symbol, star_shortcut)), right.clone());

                if left.is_nullable() {
                    Regex::union(new, right.derive(symbol, star_shortcut)).simplify()
                } else {
                    new.simplify()
                }
            }
            Regex::Star(inner) => {
                if star_shortcut && matches!(inner.as_ref(), Regex::Literal(ch) if *ch == symbol) {
                    return self.clone();
                }
                Regex::Concat(
                    Rc::new(inner.derive(symbol, star_shortcut)),
                    Rc::new(self.clone()),
                )
                .simplify()
            }
        }
    }

    /// The symbols of every literal in the expression, in sorted order
    pub fn alphabet(&self) -> BTreeSet<char> {
        let mut alphabet = BTreeSet::new();
        self.search_alphabet(&mut alphabet);
        alphabet
    }

    fn search_alphabet(&self, alphabet: &mut BTreeSet<char>) {
        match self {
            Regex::EmptySet | Regex::Epsilon => {}
            Regex::Literal(ch) => {
                alphabet.insert(*ch);
            }
            Regex::Star(inner) => inner.search_alphabet(alphabet),
            Regex::Union(left, right) | Regex::Concat(left, right) => {
                left.search_alphabet(alphabet);
                right.search_alphabet(alphabet);
            }
        }
    }
}

fn simplify_union(regex: &Regex) -> Regex {
    let mut operands = Vec::new();
    flatten_union(regex, &mut operands);

    let mut seen = HashSet::new();
    let mut unique = operands
        .into_iter()
        .filter(|operand| !matches!(operand, Regex::EmptySet))
        .filter(|operand| seen.insert(operand.canonical_key()));

    match unique.next() {
        None => Regex::EmptySet,
        Some(first) => unique.fold(first, Regex::union),
    }
}

fn flatten_union(regex: &Regex, operands: &mut Vec<Regex>) {
    match regex {
        Regex::Union(left, right) => {
            flatten_union(left, operands);
            flatten_union(right, operands);
        }
        _ => match regex.simplify() {
            // A simplified union is a chain of simplified operands, splice them in
            simplified @ Regex::Union(_, _) => push_union_spine(&simplified, operands),
            simplified => operands.push(simplified),
        },
    }
}

fn push_union_spine(regex: &Regex, operands: &mut Vec<Regex>) {
    match regex {
        Regex::Union(left, right) => {
            push_union_spine(left, operands);
            push_union_spine(right, operands);
        }
        _ => operands.push(regex.clone()),
    }
}
