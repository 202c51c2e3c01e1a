// Record filters: the conjunctive query filter and the trait the store scans with.
use crate::core::error::Error;
use crate::core::parser::{ConditionalExpression, Query};
use crate::core::record::Record;

pub trait Filter {
    fn accepts(&self, record: &Record) -> Result<bool, Error>;
}

impl<F> Filter for F
where
    F: Fn(&Record) -> bool,
{
    fn accepts(&self, record: &Record) -> Result<bool, Error> {
        Ok(self(record))
    }
}

/// Accepts a record iff every expression holds. An empty list accepts everything.
#[derive(Clone, Debug, Default)]
pub struct QueryFilter {
    expressions: Vec<ConditionalExpression>,
}

impl QueryFilter {
    pub fn new(expressions: Vec<ConditionalExpression>) -> Self {
        Self { expressions }
    }

    pub fn expressions(&self) -> &[ConditionalExpression] {
        &self.expressions
    }
}

impl From<Query> for QueryFilter {
    fn from(query: Query) -> Self {
        Self::new(query.into_expressions())
    }
}

impl Filter for QueryFilter {
    fn accepts(&self, record: &Record) -> Result<bool, Error> {
        for expression in &self.expressions {
            if !expression.matches(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
