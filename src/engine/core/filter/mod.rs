pub mod expression;
pub mod expression_filter;
pub mod filter_executor;
pub mod filter_row;

pub use expression::{CompareOp, Expression};
pub use expression_filter::ExpressionFilter;
pub use filter_executor::FilterExecutor;
pub use filter_row::FilterRow;
