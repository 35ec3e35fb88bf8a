use std::iter::FusedIterator;

use crate::arena::Arena;
use crate::types::{FieldId, Value};

use super::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterMode {
    /// Direct siblings of the starting field only.
    #[default]
    Fields,
    /// Pre-order walk through every nested object.
    Recursive,
}

/// Lazy walk over a field list using only `next` and `parent` links.
///
/// In recursive mode a node is yielded before its children, empty objects
/// are yielded once, and the walk never climbs above the level it started
/// on.
#[derive(Debug, Clone)]
pub struct FieldIter<'a> {
    arena: &'a Arena,
    mode: IterMode,
    current: Option<FieldId>,
    parent: Option<FieldId>,
    depth: usize,
    last: Option<(FieldId, usize)>,
}

impl<'a> FieldIter<'a> {
    pub fn new(arena: &'a Arena, start: Option<FieldId>, mode: IterMode) -> Self {
        let parent = start
            .and_then(|id| arena.field(id))
            .and_then(|field| field.parent);
        Self {
            arena,
            mode,
            current: start,
            parent,
            depth: 0,
            last: None,
        }
    }

    pub fn mode(&self) -> IterMode {
        self.mode
    }

    /// Depth of the most recently yielded node, zero for the starting level.
    pub fn depth(&self) -> usize {
        self.last.map_or(0, |(_, depth)| depth)
    }

    /// The most recently yielded node.
    pub fn last_node(&self) -> Option<Node<'a>> {
        Node::load(self.arena, self.last?.0)
    }

    /// Writes the dot path of the most recently yielded node into `buf`;
    /// see [`Node::write_path`].
    pub fn write_path(&self, buf: &mut [u8]) -> Option<usize> {
        self.last_node()?.write_path(buf)
    }

    pub fn path(&self) -> Option<String> {
        self.last_node()?.path()
    }

    fn step(&mut self, id: FieldId, next: Option<FieldId>, value: &Value) {
        if let (IterMode::Recursive, Value::Object(Some(first))) = (self.mode, value) {
            self.parent = Some(id);
            self.current = Some(*first);
            self.depth += 1;
            return;
        }
        self.current = next;
        if self.current.is_some() || self.mode == IterMode::Fields {
            return;
        }
        let arena = self.arena;
        while self.depth > 0 {
            let Some(parent) = self.parent.and_then(|parent| arena.field(parent)) else {
                break;
            };
            self.current = parent.next;
            self.parent = parent.parent;
            self.depth -= 1;
            if self.current.is_some() {
                break;
            }
        }
    }
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = Node::load(self.arena, self.current?)?;
        self.last = Some((node.id(), self.depth));
        let field = node.field();
        self.step(node.id(), field.next, &field.value);
        Some(node)
    }
}

impl FusedIterator for FieldIter<'_> {}
