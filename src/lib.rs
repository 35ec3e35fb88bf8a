//! Parser for a small configuration language of scalars, strings, booleans,
//! homogeneous arrays, nested objects and `vec2`/`vec3`/`vec4` float vectors.
//!
//! Parsing happens inside a caller-provided [`Arena`] with a fixed byte
//! budget. String values are views into the arena's copy of the source, and
//! the resulting [`Document`] is queried with dot paths or walked with a
//! [`FieldIter`].
//!
//! ```
//! use field_parser::{estimate_memory, parse, Arena, IterMode};
//!
//! let source = r#"window = { title = "main"; size = vec2(1920, 1080); };"#;
//! let mut arena = Arena::with_capacity(estimate_memory(source));
//! let document = parse(source, &mut arena).unwrap();
//!
//! assert_eq!(document.root().get_str("window.title"), Some("main"));
//! assert_eq!(document.root().get_vec2("window.size"), Some([1920.0, 1080.0]));
//! assert_eq!(document.iter(IterMode::Recursive).count(), 3);
//! ```

pub mod arena;
pub mod constants;
pub mod decode;
pub mod error;
pub mod num;
pub mod options;
pub mod query;
pub mod text;
pub mod types;

pub use crate::arena::{Arena, ArenaItem, Slice};
pub use crate::constants::MAX_PATH_LENGTH;
pub use crate::decode::{estimate_memory, parse, parse_with_options};
pub use crate::error::{ErrorCode, OutOfMemory, ParseError};
pub use crate::options::ParseOptions;
pub use crate::query::{ArrayRef, Document, FieldIter, Fields, IterMode, Node};
pub use crate::text::string::copy_to_cstr;
pub use crate::types::{ArrayItems, Field, FieldId, StrView, Value, ValueType};

pub type Result<T> = std::result::Result<T, ParseError>;
