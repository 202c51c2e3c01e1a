// Comparison operators and the symbol registry shared by the tokenizer and parser.
use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;

use crate::core::collation;
use crate::core::error::{Error, ErrorKind};
use crate::core::table::KeyedTable;

pub const LIKE_KEYWORD: &str = "LIKE";
pub const WILDCARD: char = '*';

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Like,
}

const ALL: [ComparisonOperator; 7] = [
    ComparisonOperator::Greater,
    ComparisonOperator::Less,
    ComparisonOperator::GreaterOrEqual,
    ComparisonOperator::LessOrEqual,
    ComparisonOperator::Equal,
    ComparisonOperator::NotEqual,
    ComparisonOperator::Like,
];

static REGISTRY: Lazy<KeyedTable<&'static str, ComparisonOperator>> = Lazy::new(|| {
    let mut table = KeyedTable::new();
    for op in ALL {
        let inserted = table.put(op.symbol(), op);
        debug_assert!(matches!(inserted, Ok(None)), "operator symbols are non-empty and distinct");
    }
    table
});

impl ComparisonOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Like => LIKE_KEYWORD,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        REGISTRY.get(symbol).copied()
    }

    /// Applies the operator to a field value and a query literal.
    ///
    /// Ordering operators use the Croatian collation. `Like` fails with a
    /// syntax error when the pattern holds more than one wildcard.
    pub fn satisfied(self, value: &str, literal: &str) -> Result<bool, Error> {
        let satisfied = match self {
            Self::Equal => collation::equals(value, literal),
            Self::NotEqual => !collation::equals(value, literal),
            Self::Less => collation::compare(value, literal) == Ordering::Less,
            Self::LessOrEqual => collation::compare(value, literal) != Ordering::Greater,
            Self::Greater => collation::compare(value, literal) == Ordering::Greater,
            Self::GreaterOrEqual => collation::compare(value, literal) != Ordering::Less,
            Self::Like => like(value, literal)?,
        };
        Ok(satisfied)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// True when `c` can appear in a punctuation operator symbol.
pub fn is_symbol_char(c: char) -> bool {
    REGISTRY
        .iter()
        .any(|(symbol, _)| !symbol.starts_with(char::is_alphabetic) && symbol.contains(c))
}

fn like(value: &str, pattern: &str) -> Result<bool, Error> {
    if pattern.matches(WILDCARD).count() > 1 {
        return Err(Error::new(ErrorKind::Syntax)
            .with_message(format!(
                "pattern of LIKE may contain at most one '{WILDCARD}': {pattern}"
            ))
            .with_hint("Use a single wildcard, e.g. lastName LIKE \"B*ć\"."));
    }
    match pattern.split_once(WILDCARD) {
        Some((prefix, suffix)) => Ok(value.starts_with(prefix) && value.ends_with(suffix)),
        None => Ok(value == pattern),
    }
}
