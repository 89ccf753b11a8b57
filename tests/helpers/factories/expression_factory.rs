use crate::engine::core::filter::{CompareOp, Expression};
use crate::engine::types::Value;

pub struct ExpressionFactory {
    field: String,
    op: CompareOp,
    value: Value,
}

impl ExpressionFactory {
    pub fn new() -> Self {
        Self {
            field: "id".into(),
            op: CompareOp::Eq,
            value: Value::String("id-001".into()),
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_op(mut self, op: CompareOp) -> Self {
        self.op = op;
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    pub fn create(self) -> Expression {
        Expression::Compare {
            field: self.field,
            op: self.op,
            value: self.value,
        }
    }
}
