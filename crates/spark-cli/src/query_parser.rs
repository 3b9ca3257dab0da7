use std::str::FromStr;

use chrono::NaiveDate;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::PrattParser;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use spark_core::models::{TaskPriority, TaskStatus};
use spark_core::query::{DueDate, Filter, Operator, Query};

#[derive(Parser)]
#[grammar = "filter.pest"]
pub struct FilterParser;

lazy_static::lazy_static! {
    static ref PRATT_PARSER: PrattParser<Rule> = {
        use pest::pratt_parser::{Assoc::*, Op};
        use Rule::*;

        PrattParser::new()
            .op(Op::infix(or, Left))
            .op(Op::infix(and, Left))
            .op(Op::prefix(not))
    };
}

#[derive(Error, Debug)]
pub enum QueryParseError {
    #[error("Could not parse filter: {0}")]
    Pest(#[from] Box<pest::error::Error<Rule>>),
    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),
    #[error("Unknown rule: {0:?}")]
    UnknownRule(Rule),
    #[error("Invalid status value: {0}")]
    InvalidStatus(String),
    #[error("Invalid priority value: {0}")]
    InvalidPriority(String),
    #[error("Invalid due value: {0} (expected today, tomorrow, overdue or none)")]
    InvalidDue(String),
    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

fn parse_date(value: &str) -> Result<NaiveDate, QueryParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| QueryParseError::InvalidDate(value.to_string()))
}

fn build_filter(pair: Pair<Rule>) -> Result<Filter, QueryParseError> {
    let text = pair.as_str().to_string();
    let mut inner = pair.into_inner();
    let (key, value) = match (inner.next(), inner.next()) {
        (Some(key), Some(value)) => (key.as_str().to_lowercase(), value.as_str().trim_matches('"')),
        _ => return Err(QueryParseError::InvalidFilter(text)),
    };

    let filter = match key.as_str() {
        "project" => Filter::Project(value.to_string()),
        "area" => Filter::Area(value.to_string()),
        "status" => Filter::Status(
            TaskStatus::from_str(value)
                .map_err(|_| QueryParseError::InvalidStatus(value.to_string()))?,
        ),
        "priority" => Filter::Priority(
            TaskPriority::from_str(value)
                .map_err(|_| QueryParseError::InvalidPriority(value.to_string()))?,
        ),
        "due" => Filter::Due(match value.to_lowercase().as_str() {
            "today" => DueDate::Today,
            "tomorrow" => DueDate::Tomorrow,
            "overdue" => DueDate::Overdue,
            "none" => DueDate::None,
            _ => return Err(QueryParseError::InvalidDue(value.to_string())),
        }),
        "before" => Filter::Before(parse_date(value)?),
        "after" => Filter::After(parse_date(value)?),
        _ => {
            return Err(QueryParseError::InvalidFilter(format!(
                "Unknown filter key: {}",
                key
            )))
        }
    };
    Ok(filter)
}

fn build_ast(pairs: Pairs<Rule>) -> Result<Query, QueryParseError> {
    PRATT_PARSER
        .map_primary(|primary| match primary.as_rule() {
            Rule::filter_expression => build_filter(primary).map(Query::Filter),
            Rule::expression => build_ast(primary.into_inner()),
            rule => Err(QueryParseError::UnknownRule(rule)),
        })
        .map_prefix(|op, rhs| match op.as_rule() {
            Rule::not => Ok(Query::Not(Box::new(rhs?))),
            rule => Err(QueryParseError::UnknownRule(rule)),
        })
        .map_infix(|lhs, op, rhs| {
            let op = match op.as_rule() {
                Rule::and => Operator::And,
                Rule::or => Operator::Or,
                rule => return Err(QueryParseError::UnknownRule(rule)),
            };
            Ok(Query::Binary {
                op,
                left: Box::new(lhs?),
                right: Box::new(rhs?),
            })
        })
        .parse(pairs)
}

/// Parses a filter query. Blank input means "no filter".
pub fn parse_query(input: &str) -> Result<Option<Query>, QueryParseError> {
    let mut pairs = FilterParser::parse(Rule::filter_query, input).map_err(Box::new)?;
    let expression = pairs
        .next()
        .and_then(|query| query.into_inner().find(|p| p.as_rule() == Rule::expression));
    match expression {
        Some(expression) => build_ast(expression.into_inner()).map(Some),
        None => Ok(None),
    }
}
