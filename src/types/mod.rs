pub mod value;

pub use value::{ArrayItems, Field, FieldId, StrView, Value, ValueType};
