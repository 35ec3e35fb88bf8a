//! Read-only views over a parsed document.
//!
//! Everything here borrows the arena immutably, so a [`Document`] can be
//! shared freely while the borrow checker keeps the arena from being reset
//! underneath it.

mod iter;

use std::fmt;

use smallvec::SmallVec;

use crate::arena::Arena;
use crate::constants::MAX_PATH_LENGTH;
use crate::text::string::copy_to_cstr;
use crate::types::{ArrayItems, Field, FieldId, StrView, Value, ValueType};

pub use iter::{FieldIter, IterMode};

#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    arena: &'a Arena,
    root: Option<FieldId>,
}

impl<'a> Document<'a> {
    pub(crate) fn new(arena: &'a Arena, root: Option<FieldId>) -> Self {
        Self { arena, root }
    }

    pub fn root(&self) -> Fields<'a> {
        Fields::new(self.arena, self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn iter(&self, mode: IterMode) -> FieldIter<'a> {
        self.root().iter(mode)
    }

    pub fn arena(&self) -> &'a Arena {
        self.arena
    }

    /// Resolves a view handed out by this document.
    pub fn str(&self, view: StrView) -> &'a str {
        self.arena.str(view)
    }

    /// Length-then-bytes comparison of a view against `text`.
    pub fn str_eq(&self, view: StrView, text: &str) -> bool {
        view.len() == text.len() && self.arena.str(view) == text
    }
}

/// One object's member list: the document root or the contents of a nested
/// object. Lookups start here.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    arena: &'a Arena,
    head: Option<FieldId>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(arena: &'a Arena, head: Option<FieldId>) -> Self {
        Self { arena, head }
    }

    pub fn first(&self) -> Option<Node<'a>> {
        Node::load(self.arena, self.head?)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.iter(IterMode::Fields).count()
    }

    pub fn iter(&self, mode: IterMode) -> FieldIter<'a> {
        FieldIter::new(self.arena, self.head, mode)
    }

    /// Single-level lookup. No dots are interpreted; first match wins.
    pub fn get_field(&self, key: &str) -> Option<Node<'a>> {
        self.iter(IterMode::Fields).find(|node| node.key_matches(key))
    }

    /// Walks a dot-separated path. Every segment but the last must name an
    /// object; empty segments are skipped.
    pub fn resolve(&self, path: &str) -> Option<Node<'a>> {
        if path.is_empty() || path.len() > MAX_PATH_LENGTH {
            return None;
        }
        let mut segments = path.split('.').filter(|segment| !segment.is_empty()).peekable();
        let mut fields = *self;
        loop {
            let segment = segments.next()?;
            let node = fields.get_field(segment)?;
            if segments.peek().is_none() {
                return Some(node);
            }
            fields = node.as_object()?;
        }
    }

    pub fn has(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// [`ValueType::Empty`] when the path does not resolve.
    pub fn value_type(&self, path: &str) -> ValueType {
        self.resolve(path)
            .map_or(ValueType::Empty, |node| node.value_type())
    }

    pub fn get_str(&self, path: &str) -> Option<&'a str> {
        self.resolve(path)?.as_str()
    }

    pub fn get_str_view(&self, path: &str) -> Option<StrView> {
        match *self.resolve(path)?.value() {
            Value::String(view) => Some(view),
            _ => None,
        }
    }

    /// Copies a string value plus a NUL terminator into `buf`. Returns the
    /// string length; nothing is written when it does not fit.
    pub fn copy_str(&self, path: &str, buf: &mut [u8]) -> Option<usize> {
        copy_to_cstr(self.get_str(path)?, buf)
    }

    pub fn get_int(&self, path: &str) -> Option<i32> {
        self.resolve(path)?.as_int()
    }

    pub fn get_float(&self, path: &str) -> Option<f32> {
        self.resolve(path)?.as_float()
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.resolve(path)?.as_bool()
    }

    pub fn get_array(&self, path: &str) -> Option<ArrayRef<'a>> {
        self.resolve(path)?.as_array()
    }

    pub fn array_len(&self, path: &str) -> Option<usize> {
        self.get_array(path).map(|array| array.len())
    }

    pub fn get_vec2(&self, path: &str) -> Option<[f32; 2]> {
        self.resolve(path)?.as_vec2()
    }

    pub fn get_vec3(&self, path: &str) -> Option<[f32; 3]> {
        self.resolve(path)?.as_vec3()
    }

    pub fn get_vec4(&self, path: &str) -> Option<[f32; 4]> {
        self.resolve(path)?.as_vec4()
    }

    /// Copies the components of any vector into `out` and returns how many
    /// there are. Fails without writing when `out` is too short.
    pub fn get_vec_components(&self, path: &str, out: &mut [f32]) -> Option<usize> {
        let node = self.resolve(path)?;
        let components = node.value().as_floats()?;
        out.get_mut(..components.len())?
            .copy_from_slice(components);
        Some(components.len())
    }

    pub fn get_object(&self, path: &str) -> Option<Fields<'a>> {
        self.resolve(path)?.as_object()
    }
}

impl<'a> IntoIterator for Fields<'a> {
    type Item = Node<'a>;
    type IntoIter = FieldIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter(IterMode::Fields)
    }
}

/// A single field node together with the arena it lives in.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    arena: &'a Arena,
    id: FieldId,
    field: &'a Field,
}

impl<'a> Node<'a> {
    pub(crate) fn load(arena: &'a Arena, id: FieldId) -> Option<Self> {
        let field = arena.field(id)?;
        Some(Self { arena, id, field })
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn field(&self) -> &'a Field {
        self.field
    }

    pub fn key(&self) -> &'a str {
        self.arena.str(self.field.key)
    }

    pub fn key_view(&self) -> StrView {
        self.field.key
    }

    fn key_matches(&self, key: &str) -> bool {
        self.field.key.len() == key.len() && self.key() == key
    }

    pub fn value(&self) -> &'a Value {
        &self.field.value
    }

    pub fn value_type(&self) -> ValueType {
        self.field.value.value_type()
    }

    pub fn next(&self) -> Option<Node<'a>> {
        Node::load(self.arena, self.field.next?)
    }

    /// The field owning the object this node belongs to.
    pub fn parent(&self) -> Option<Node<'a>> {
        Node::load(self.arena, self.field.parent?)
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self.field.value {
            Value::String(view) => Some(self.arena.str(view)),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self.field.value {
            Value::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self.field.value {
            Value::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.field.value {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<ArrayRef<'a>> {
        match self.field.value {
            Value::Array(items) => Some(ArrayRef {
                arena: self.arena,
                items,
            }),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<[f32; 2]> {
        match self.field.value {
            Value::Vec2(components) => Some(components),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self.field.value {
            Value::Vec3(components) => Some(components),
            _ => None,
        }
    }

    pub fn as_vec4(&self) -> Option<[f32; 4]> {
        match self.field.value {
            Value::Vec4(components) => Some(components),
            _ => None,
        }
    }

    /// The members of an object value, possibly empty.
    pub fn as_object(&self) -> Option<Fields<'a>> {
        match self.field.value {
            Value::Object(head) => Some(Fields::new(self.arena, head)),
            _ => None,
        }
    }

    /// Keys from the root down to this node.
    ///
    /// A chain can never hold more ancestors than the arena holds fields, so
    /// the walk is bounded by that count whatever depth the parse allowed.
    fn path_keys(&self) -> Option<SmallVec<[&'a str; 16]>> {
        let limit = self.arena.field_count();
        let mut keys: SmallVec<[&'a str; 16]> = SmallVec::new();
        let mut cursor = Some(*self);
        while let Some(node) = cursor {
            if keys.len() == limit {
                return None;
            }
            keys.push(node.key());
            cursor = node.parent();
        }
        keys.reverse();
        Some(keys)
    }

    /// Writes the dot-joined path to this node into `buf`, NUL-terminated.
    /// Returns the path length; nothing is written when it does not fit.
    pub fn write_path(&self, buf: &mut [u8]) -> Option<usize> {
        let keys = self.path_keys()?;
        let len = keys.iter().map(|key| key.len()).sum::<usize>() + keys.len() - 1;
        if len >= buf.len() {
            return None;
        }
        let mut offset = 0;
        for (index, key) in keys.iter().enumerate() {
            if index > 0 {
                buf[offset] = b'.';
                offset += 1;
            }
            buf[offset..offset + key.len()].copy_from_slice(key.as_bytes());
            offset += key.len();
        }
        buf[offset] = 0;
        Some(len)
    }

    pub fn path(&self) -> Option<String> {
        Some(self.path_keys()?.join("."))
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("key", &self.key())
            .field("value", &self.field.value)
            .finish()
    }
}

/// A homogeneous array value resolved against its arena.
#[derive(Debug, Clone, Copy)]
pub struct ArrayRef<'a> {
    arena: &'a Arena,
    items: ArrayItems,
}

impl<'a> ArrayRef<'a> {
    pub fn items(&self) -> ArrayItems {
        self.items
    }

    /// [`ValueType::Empty`] for `[]`.
    pub fn element_type(&self) -> ValueType {
        self.items.element_type()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_ints(&self) -> Option<&'a [i32]> {
        match self.items {
            ArrayItems::Int(slice) => Some(self.arena.slice(slice)),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&'a [f32]> {
        match self.items {
            ArrayItems::Float(slice) => Some(self.arena.slice(slice)),
            _ => None,
        }
    }

    pub fn as_bools(&self) -> Option<&'a [bool]> {
        match self.items {
            ArrayItems::Bool(slice) => Some(self.arena.slice(slice)),
            _ => None,
        }
    }

    pub fn as_str_views(&self) -> Option<&'a [StrView]> {
        match self.items {
            ArrayItems::String(slice) => Some(self.arena.slice(slice)),
            _ => None,
        }
    }

    pub fn str_at(&self, index: usize) -> Option<&'a str> {
        let view = *self.as_str_views()?.get(index)?;
        Some(self.arena.str(view))
    }

    /// String elements in order; empty for any other element type.
    pub fn strs(&self) -> impl Iterator<Item = &'a str> + 'a {
        let arena = self.arena;
        self.as_str_views()
            .unwrap_or(&[])
            .iter()
            .map(move |view| arena.str(*view))
    }
}
