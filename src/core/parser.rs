//! Purpose: Compile query text into a conjunctive list of conditional expressions.
//! Exports: `ConditionalExpression`, `Query`, `parse_query`.
//! Role: Drives the tokenizer, owns its quote-mode switching, and validates expression triples.
//! Invariants: Every expression is exactly (attribute, operator, literal); `AND` separates them.
//! Invariants: Attribute names resolve through the schema registry; unknown names are syntax errors.
use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::lexer::{Token, TokenKind, Tokenizer};
use crate::core::operator::ComparisonOperator;
use crate::core::record::Record;
use crate::core::schema::{FieldGetter, Schema};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConditionalExpression {
    pub getter: FieldGetter,
    pub operator: ComparisonOperator,
    pub literal: String,
}

impl ConditionalExpression {
    pub fn matches(&self, record: &Record) -> Result<bool, Error> {
        self.operator
            .satisfied(self.getter.get(record)?, &self.literal)
    }
}

/// A compiled query: expressions are implicitly joined with `AND`.
#[derive(Clone, Debug)]
pub struct Query {
    expressions: Vec<ConditionalExpression>,
}

impl Query {
    pub fn compile(text: &str, schema: &Schema) -> Result<Self, Error> {
        let expressions = parse_query(text, schema)?;
        debug!(expressions = expressions.len(), "query compiled");
        Ok(Self { expressions })
    }

    pub fn expressions(&self) -> &[ConditionalExpression] {
        &self.expressions
    }

    pub fn into_expressions(self) -> Vec<ConditionalExpression> {
        self.expressions
    }

    /// The key literal when the query is a single `=` on the primary key.
    pub fn index_key(&self) -> Option<&str> {
        match self.expressions.as_slice() {
            [only] if only.getter.is_primary_key() && only.operator == ComparisonOperator::Equal => {
                Some(only.literal.as_str())
            }
            _ => None,
        }
    }
}

pub fn parse_query(text: &str, schema: &Schema) -> Result<Vec<ConditionalExpression>, Error> {
    let mut lexer = Tokenizer::new(text);
    let mut pending = Vec::with_capacity(3);
    let mut expressions = Vec::new();

    loop {
        let token = lexer.next_token()?;
        match token.kind {
            TokenKind::Quote => lexer.set_mode(lexer.mode().toggled()),
            TokenKind::And => {
                expressions.push(build_expression(&pending, schema)?);
                pending.clear();
            }
            TokenKind::End => {
                expressions.push(build_expression(&pending, schema)?);
                return Ok(expressions);
            }
            _ => pending.push(token),
        }
    }
}

fn build_expression(tokens: &[Token], schema: &Schema) -> Result<ConditionalExpression, Error> {
    let [field, operator, literal] = tokens else {
        return Err(syntax(format!("invalid expression: {}", join(tokens)))
            .with_hint("Each expression is written as attribute operator \"literal\"."));
    };
    if field.kind != TokenKind::Attribute {
        return Err(syntax(format!(
            "the left-hand side must be an attribute: {field}"
        )));
    }
    if operator.kind != TokenKind::Operator {
        return Err(syntax(format!(
            "the middle token must be an operator: {operator}"
        )));
    }
    if literal.kind != TokenKind::Literal {
        return Err(syntax(format!(
            "the right-hand side must be a literal: {literal}"
        )));
    }

    let getter = schema.getter(field.text()).ok_or_else(|| {
        syntax(format!("unknown attribute: {}", field.text()))
            .with_hint(format!("Known attributes: {}", schema.column_names().join(", ")))
    })?;
    let operator = ComparisonOperator::from_symbol(operator.text())
        .ok_or_else(|| syntax(format!("unknown operator: {}", operator.text())))?;

    Ok(ConditionalExpression {
        getter,
        operator,
        literal: literal.text().to_string(),
    })
}

fn syntax(message: String) -> Error {
    Error::new(ErrorKind::Syntax).with_message(message)
}

fn join(tokens: &[Token]) -> String {
    let parts = tokens.iter().map(Token::to_string).collect::<Vec<_>>();
    format!("[{}]", parts.join(", "))
}
