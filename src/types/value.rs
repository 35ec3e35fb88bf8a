use std::fmt;

use crate::arena::Slice;

/// Index of a field node inside its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(u32);

impl FieldId {
    pub(crate) fn new(index: u32) -> Self {
        FieldId(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A byte range into the arena's copy of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StrView {
    start: u32,
    len: u32,
}

impl StrView {
    pub(crate) fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    pub fn start(self) -> usize {
        self.start as usize
    }

    pub fn len(self) -> usize {
        self.len as usize
    }

    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    pub fn range(self) -> std::ops::Range<usize> {
        self.start()..self.start() + self.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Empty,
    String,
    Int,
    Float,
    Bool,
    Array,
    Vec2,
    Vec3,
    Vec4,
    Object,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Empty => "empty",
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::Array => "array",
            ValueType::Vec2 => "vec2",
            ValueType::Vec3 => "vec3",
            ValueType::Vec4 => "vec4",
            ValueType::Object => "object",
        }
    }

    /// Component count for the vector types.
    pub fn arity(self) -> Option<usize> {
        match self {
            ValueType::Vec2 => Some(2),
            ValueType::Vec3 => Some(3),
            ValueType::Vec4 => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Homogeneous array storage. The element type is fixed by the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayItems {
    Empty,
    String(Slice<StrView>),
    Int(Slice<i32>),
    Float(Slice<f32>),
    Bool(Slice<bool>),
}

impl ArrayItems {
    pub fn element_type(self) -> ValueType {
        match self {
            ArrayItems::Empty => ValueType::Empty,
            ArrayItems::String(_) => ValueType::String,
            ArrayItems::Int(_) => ValueType::Int,
            ArrayItems::Float(_) => ValueType::Float,
            ArrayItems::Bool(_) => ValueType::Bool,
        }
    }

    pub fn len(self) -> usize {
        match self {
            ArrayItems::Empty => 0,
            ArrayItems::String(items) => items.len(),
            ArrayItems::Int(items) => items.len(),
            ArrayItems::Float(items) => items.len(),
            ArrayItems::Bool(items) => items.len(),
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    String(StrView),
    Int(i32),
    Float(f32),
    Bool(bool),
    Array(ArrayItems),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// First member of the object, `None` for `{}`.
    Object(Option<FieldId>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Empty => ValueType::Empty,
            Value::String(_) => ValueType::String,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Bool(_) => ValueType::Bool,
            Value::Array(_) => ValueType::Array,
            Value::Vec2(_) => ValueType::Vec2,
            Value::Vec3(_) => ValueType::Vec3,
            Value::Vec4(_) => ValueType::Vec4,
            Value::Object(_) => ValueType::Object,
        }
    }

    /// Vector components as a flat slice of exactly the vector's arity.
    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            Value::Vec2(components) => Some(components.as_slice()),
            Value::Vec3(components) => Some(components.as_slice()),
            Value::Vec4(components) => Some(components.as_slice()),
            _ => None,
        }
    }
}

/// One `key = value;` entry of an object's member list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub key: StrView,
    pub value: Value,
    pub next: Option<FieldId>,
    /// The field whose value is the object holding this one.
    pub parent: Option<FieldId>,
}

impl Field {
    pub(crate) fn new(key: StrView, parent: Option<FieldId>) -> Self {
        Self {
            key,
            value: Value::Empty,
            next: None,
            parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_str_view_range() {
        let view = StrView::new(4, 3);
        assert_eq!(view.start(), 4);
        assert_eq!(view.len(), 3);
        assert_eq!(view.range(), 4..7);
        assert!(!view.is_empty());
        assert!(StrView::default().is_empty());
    }

    #[rstest::rstest]
    #[case(Value::Empty, ValueType::Empty)]
    #[case(Value::String(StrView::new(0, 1)), ValueType::String)]
    #[case(Value::Int(-5), ValueType::Int)]
    #[case(Value::Float(0.5), ValueType::Float)]
    #[case(Value::Bool(true), ValueType::Bool)]
    #[case(Value::Array(ArrayItems::Empty), ValueType::Array)]
    #[case(Value::Vec2([1.0, 2.0]), ValueType::Vec2)]
    #[case(Value::Vec3([1.0, 2.0, 3.0]), ValueType::Vec3)]
    #[case(Value::Vec4([1.0, 2.0, 3.0, 4.0]), ValueType::Vec4)]
    #[case(Value::Object(None), ValueType::Object)]
    fn test_value_type(#[case] value: Value, #[case] expected: ValueType) {
        assert_eq!(value.value_type(), expected);
    }

    #[rstest::rstest]
    fn test_vector_as_floats() {
        let value = Value::Vec3([1.0, 2.5, 3.0]);
        assert_eq!(value.as_floats(), Some(&[1.0, 2.5, 3.0][..]));
        assert_eq!(Value::Vec4([0.0; 4]).as_floats().map(<[f32]>::len), Some(4));
        assert_eq!(Value::Int(1).as_floats(), None);
    }

    #[rstest::rstest]
    fn test_arity() {
        assert_eq!(ValueType::Vec2.arity(), Some(2));
        assert_eq!(ValueType::Vec3.arity(), Some(3));
        assert_eq!(ValueType::Vec4.arity(), Some(4));
        assert_eq!(ValueType::Float.arity(), None);
        assert_eq!(ValueType::Vec3.to_string(), "vec3");
    }

    #[rstest::rstest]
    fn test_empty_array_items() {
        assert_eq!(ArrayItems::Empty.element_type(), ValueType::Empty);
        assert_eq!(ArrayItems::Empty.len(), 0);
        assert!(ArrayItems::Empty.is_empty());
    }
}
