pub mod decimal;
pub mod no_dictionary;
pub mod value;

pub use decimal::Decimal;
pub use value::{MEMBER_DEFAULT_VAL, Value};
