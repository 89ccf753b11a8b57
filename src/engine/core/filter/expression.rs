use serde::{Deserialize, Serialize};

use crate::engine::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn holds(&self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Eq => ord == Equal,
            CompareOp::Neq => ord != Equal,
            CompareOp::Gt => ord == Greater,
            CompareOp::Gte => ord != Less,
            CompareOp::Lt => ord == Less,
            CompareOp::Lte => ord != Greater,
        }
    }
}

/// Unbound predicate tree over column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    In {
        field: String,
        values: Vec<Value>,
    },
    IsNull(String),
    IsNotNull(String),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    True,
}

impl Expression {
    pub fn compare(field: &str, op: CompareOp, value: Value) -> Self {
        Expression::Compare {
            field: field.to_string(),
            op,
            value,
        }
    }

    pub fn eq(field: &str, value: Value) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    pub fn in_list(field: &str, values: Vec<Value>) -> Self {
        Expression::In {
            field: field.to_string(),
            values,
        }
    }

    pub fn and(self, other: Expression) -> Self {
        Expression::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expression) -> Self {
        Expression::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Expression::Not(Box::new(self))
    }

    /// Column names in order of first appearance, without repeats.
    pub fn fields(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<String>) {
        match self {
            Expression::Compare { field, .. }
            | Expression::In { field, .. }
            | Expression::IsNull(field)
            | Expression::IsNotNull(field) => {
                if !out.iter().any(|o| o.eq_ignore_ascii_case(field)) {
                    out.push(field.clone());
                }
            }
            Expression::And(l, r) | Expression::Or(l, r) => {
                l.collect_fields(out);
                r.collect_fields(out);
            }
            Expression::Not(inner) => inner.collect_fields(out),
            Expression::True => {}
        }
    }
}
