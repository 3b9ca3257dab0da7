use chrono::NaiveDate;

use crate::models::{TaskPriority, TaskStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Filter(Filter),
    Not(Box<Query>),
    Binary {
        op: Operator,
        left: Box<Query>,
        right: Box<Query>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Project name, case-insensitive.
    Project(String),
    /// Area name, case-insensitive. Matches tasks filed directly in the area
    /// and tasks in projects inside it.
    Area(String),
    Status(TaskStatus),
    Priority(TaskPriority),
    Due(DueDate),
    /// Due strictly before the date.
    Before(NaiveDate),
    /// Due strictly after the date.
    After(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDate {
    Today,
    Tomorrow,
    Overdue,
    None,
}

impl Query {
    pub fn and(left: Query, right: Query) -> Query {
        Query::Binary {
            op: Operator::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Query, right: Query) -> Query {
        Query::Binary {
            op: Operator::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
