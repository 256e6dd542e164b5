/* Recursive descent parser for the pattern syntax, and the regex syntax tree the derivative
 * engine works on. Good resource for parsing regex at
 * https://matt.might.net/articles/parsing-regex-with-recursive-descent/ */

use color_eyre::eyre::{Report, Result};
use std::fmt;
use std::rc::Rc;

/// A regular expression over single characters. Sub expressions are shared, so cloning a
/// regex is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Regex {
    EmptySet,
    Epsilon,
    Literal(char),
    Union(Rc<Regex>, Rc<Regex>),
    Concat(Rc<Regex>, Rc<Regex>),
    Star(Rc<Regex>),
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegExError {
    UnexpectedCharacterError(usize, char),
    MissingParenthesisError(usize),
    TrailingInputError(usize, char),
    InvalidBuildInputError(String),
    StartStateNotFoundError(String),
}

impl std::fmt::Display for RegExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegExError::UnexpectedCharacterError(pos, ch) => {
                write!(f, "Error: Unexpected character {} at position {}", ch, pos)
            }
            RegExError::MissingParenthesisError(pos) => {
                write!(f, "Error: Expected closing parenthesis at position {}", pos)
            }
            RegExError::TrailingInputError(pos, ch) => write!(
                f,
                "Error: Unexpected trailing character {} at position {}",
                ch, pos
            ),
            RegExError::InvalidBuildInputError(regex) => write!(
                f,
                "Error: Cannot build a DFA for {}, the pattern must match a non-empty string",
                regex
            ),
            RegExError::StartStateNotFoundError(regex) => {
                write!(f, "Error: No DFA state found for start expression {}", regex)
            }
        }
    }
}

impl std::error::Error for RegExError {}

impl Regex {
    pub fn literal(ch: char) -> Self {
        Regex::Literal(ch)
    }

    pub fn union(left: Regex, right: Regex) -> Self {
        Regex::Union(Rc::new(left), Rc::new(right))
    }

    pub fn concat(left: Regex, right: Regex) -> Self {
        Regex::Concat(Rc::new(left), Rc::new(right))
    }

    pub fn star(inner: Regex) -> Self {
        Regex::Star(Rc::new(inner))
    }

    /// Structural fingerprint of the expression in prefix notation. Every tag has a fixed
    /// arity and a literal always takes exactly one character, so two expressions share a
    /// key only when their trees are identical.
    ///
    /// Keys are only meaningful for comparing simplified expressions.
    pub fn canonical_key(&self) -> String {
        let mut key = String::new();
        self.write_key(&mut key);
        key
    }

    fn write_key(&self, key: &mut String) {
        match self {
            Regex::EmptySet => key.push('0'),
            Regex::Epsilon => key.push('e'),
            Regex::Literal(ch) => {
                key.push('\'');
                key.push(*ch);
            }
            Regex::Union(left, right) => {
                key.push('|');
                left.write_key(key);
                right.write_key(key);
            }
            Regex::Concat(left, right) => {
                key.push('.');
                left.write_key(key);
                right.write_key(key);
            }
            Regex::Star(inner) => {
                key.push('*');
                inner.write_key(key);
            }
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regex::EmptySet => write!(f, "∅"),
            Regex::Epsilon => write!(f, "ε"),
            Regex::Literal(ch) => write!(f, "{ch}"),
            Regex::Union(left, right) => write!(f, "({left}|{right})"),
            Regex::Concat(left, right) => write!(f, "{left}{right}"),
            Regex::Star(inner) => match inner.as_ref() {
                // Already a single symbol or parenthesized
                Regex::Literal(_) | Regex::Union(_, _) => write!(f, "{inner}*"),
                _ => write!(f, "({inner})*"),
            },
        }
    }
}

// If these characters are found where an atom is expected the pattern is invalid
fn nchar_is_valid(nchar: char) -> bool {
    !matches!(nchar, '*' | '|' | ')')
}

fn parse_base(regex: &[char], start: usize) -> Result<(Regex, usize)> {
    let nchar = match regex.get(start) {
        // Nothing left where an atom was expected, this matches only the empty string
        None => return Ok((Regex::Epsilon, start)),
        Some(&nchar) => nchar,
    };

    if nchar == '(' {
        let (inner_regex, new_start) = parse_union(regex, start + 1)?; // Consume the lparen
        if regex.get(new_start) != Some(&')') {
            let err = Report::new(RegExError::MissingParenthesisError(new_start));
            return Err(err);
        }
        Ok((inner_regex, new_start + 1)) // Consume the rparen
    } else if nchar_is_valid(nchar) {
        Ok((Regex::literal(nchar), start + 1))
    } else {
        let err = Report::new(RegExError::UnexpectedCharacterError(start, nchar));
        Err(err)
    }
}

fn parse_factor(regex: &[char], start: usize) -> Result<(Regex, usize)> {
    let (base, new_start) = parse_base(regex, start)?;

    // At most one star per atom, a second one is left for the caller to reject
    if regex.get(new_start) == Some(&'*') {
        Ok((Regex::star(base), new_start + 1))
    } else {
        Ok((base, new_start))
    }
}

fn parse_term(regex: &[char], start: usize) -> Result<(Regex, usize)> {
    let (factor, new_start) = parse_factor(regex, start)?;

    match regex.get(new_start) {
        None | Some(')') | Some('|') => Ok((factor, new_start)),
        Some(_) => {
            let (next_term, new_start) = parse_term(regex, new_start)?;
            Ok((Regex::concat(factor, next_term), new_start))
        }
    }
}

fn parse_union(regex: &[char], start: usize) -> Result<(Regex, usize)> {
    let (term, new_start) = parse_term(regex, start)?;

    if regex.get(new_start) == Some(&'|') {
        let (next_regex, new_start) = parse_union(regex, new_start + 1)?;
        Ok((Regex::union(term, next_regex), new_start))
    } else {
        Ok((term, new_start))
    }
}

/// Parse a pattern into its syntax tree. The empty pattern denotes the empty string.
pub fn parse_regex(pattern: &str) -> Result<Regex> {
    let regex: Vec<char> = pattern.chars().collect();

    if regex.is_empty() {
        return Ok(Regex::Epsilon);
    }

    let (syntax_tree, new_start) = parse_union(&regex, 0)?;

    if let Some(&nchar) = regex.get(new_start) {
        let err = Report::new(RegExError::TrailingInputError(new_start, nchar));
        return Err(err);
    }

    Ok(syntax_tree)
}

#[cfg(test)]
mod regex_tests {
    use super::*;

    fn lit(ch: char) -> Regex {
        Regex::literal(ch)
    }

    fn parse_error(pattern: &str) -> RegExError {
        let result = parse_regex(pattern);
        assert!(result.is_err(), "Expected error for {:?}, got {:?}", pattern, result);
        match result.unwrap_err().downcast::<RegExError>() {
            Ok(err) => err,
            Err(report) => panic!("Expected RegExError, got {:?}", report),
        }
    }

    #[test]
    fn test_regex_simple_base() {
        assert_eq!(parse_regex("a").unwrap(), lit('a'));
    }

    #[test]
    fn test_regex_group_base() {
        assert_eq!(parse_regex("(a)").unwrap(), lit('a'));
        assert_eq!(parse_regex("((a))").unwrap(), lit('a'));
    }

    #[test]
    fn test_empty_pattern() {
        assert_eq!(parse_regex("").unwrap(), Regex::Epsilon);
    }

    #[test]
    fn test_regex_star() {
        assert_eq!(parse_regex("a*").unwrap(), Regex::star(lit('a')));
        assert_eq!(
            parse_regex("(ab)*").unwrap(),
            Regex::star(Regex::concat(lit('a'), lit('b')))
        );
    }

    #[test]
    fn test_union_is_right_associative() {
        assert_eq!(
            parse_regex("a|b|c").unwrap(),
            Regex::union(lit('a'), Regex::union(lit('b'), lit('c')))
        );
    }

    #[test]
    fn test_concatenation_is_right_associative() {
        assert_eq!(
            parse_regex("abc").unwrap(),
            Regex::concat(lit('a'), Regex::concat(lit('b'), lit('c')))
        );
    }

    #[test]
    fn test_concatenation_binds_tighter_than_union() {
        assert_eq!(
            parse_regex("ab|c").unwrap(),
            Regex::union(Regex::concat(lit('a'), lit('b')), lit('c'))
        );
    }

    #[test]
    fn test_nested_pattern() {
        let expected = Regex::concat(
            Regex::star(Regex::union(lit('a'), lit('b'))),
            Regex::concat(lit('a'), Regex::concat(lit('b'), lit('b'))),
        );
        assert_eq!(parse_regex("(a|b)*abb").unwrap(), expected);
    }

    #[test]
    fn test_trailing_alternative_is_epsilon() {
        assert_eq!(
            parse_regex("a|").unwrap(),
            Regex::union(lit('a'), Regex::Epsilon)
        );
    }

    #[test]
    fn test_any_other_character_is_literal() {
        assert_eq!(
            parse_regex("+?").unwrap(),
            Regex::concat(lit('+'), lit('?'))
        );
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        assert_eq!(parse_error("(a"), RegExError::MissingParenthesisError(2));
    }

    #[test]
    fn test_unexpected_rparen() {
        assert_eq!(parse_error("a)"), RegExError::TrailingInputError(1, ')'));
    }

    #[test]
    fn test_leading_star() {
        assert_eq!(parse_error("*a"), RegExError::UnexpectedCharacterError(0, '*'));
    }

    #[test]
    fn test_double_star() {
        assert_eq!(parse_error("a**"), RegExError::UnexpectedCharacterError(2, '*'));
    }

    #[test]
    fn test_leading_alternative() {
        assert_eq!(parse_error("|a"), RegExError::UnexpectedCharacterError(0, '|'));
    }

    #[test]
    fn test_empty_group() {
        assert_eq!(parse_error("()"), RegExError::UnexpectedCharacterError(1, ')'));
    }

    #[test]
    fn test_positions_count_characters() {
        assert_eq!(parse_error("éé)"), RegExError::TrailingInputError(2, ')'));
    }

    #[test]
    fn test_canonical_key_distinguishes_structure() {
        let left_deep = Regex::union(Regex::union(lit('a'), lit('b')), lit('c'));
        let right_deep = Regex::union(lit('a'), Regex::union(lit('b'), lit('c')));
        assert_ne!(left_deep.canonical_key(), right_deep.canonical_key());

        assert_ne!(
            Regex::union(lit('a'), lit('b')).canonical_key(),
            Regex::union(lit('b'), lit('a')).canonical_key()
        );

        // A literal that looks like a tag must not collide with the tag itself
        assert_ne!(lit('0').canonical_key(), Regex::EmptySet.canonical_key());
        assert_ne!(
            Regex::star(lit('e')).canonical_key(),
            Regex::star(Regex::Epsilon).canonical_key()
        );
    }

    #[test]
    fn test_canonical_key_is_deterministic() {
        let regex = parse_regex("(a|b)*abb").unwrap();
        assert_eq!(regex.canonical_key(), regex.clone().canonical_key());
        assert_eq!(regex.canonical_key(), ".*|'a'b.'a.'b'b");
    }

    #[test]
    fn test_display() {
        assert_eq!(parse_regex("(a|b)*abb").unwrap().to_string(), "(a|b)*abb");
        assert_eq!(parse_regex("(ab)*").unwrap().to_string(), "(ab)*");
        assert_eq!(Regex::EmptySet.to_string(), "∅");
        assert_eq!(Regex::Epsilon.to_string(), "ε");
    }
}
