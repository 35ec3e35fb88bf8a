//! Fixed-budget bump arena.
//!
//! Storage lives in typed pools addressed by index handles, while every
//! allocation is charged against a byte cursor with the usual align-then-bump
//! arithmetic. Nothing is freed individually; [`Arena::reset`] drops
//! everything at once and invalidates every handle issued so far.

use std::fmt;
use std::marker::PhantomData;
use std::mem::{align_of, size_of};

use tracing::trace;

use crate::error::OutOfMemory;
use crate::types::{Field, FieldId, StrView};

/// A contiguous run of `T` items inside an arena pool.
pub struct Slice<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Slice<T> {
    fn new(start: u32, len: u32) -> Self {
        Self {
            start,
            len,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn range(&self) -> std::ops::Range<usize> {
        let start = self.start as usize;
        start..start + self.len as usize
    }
}

impl<T> Clone for Slice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slice<T> {}

impl<T> PartialEq for Slice<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.len == other.len
    }
}

impl<T> Eq for Slice<T> {}

impl<T> fmt::Debug for Slice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slice")
            .field("start", &self.start)
            .field("len", &self.len)
            .finish()
    }
}

/// Item types that can be bulk-allocated as array storage.
pub trait ArenaItem: Copy + Default + 'static {
    fn pool(arena: &Arena) -> &[Self];
    fn pool_mut(arena: &mut Arena) -> &mut Vec<Self>;
}

macro_rules! arena_item {
    ($ty:ty, $pool:ident) => {
        impl ArenaItem for $ty {
            fn pool(arena: &Arena) -> &[Self] {
                &arena.$pool
            }

            fn pool_mut(arena: &mut Arena) -> &mut Vec<Self> {
                &mut arena.$pool
            }
        }
    };
}

arena_item!(StrView, strings);
arena_item!(i32, ints);
arena_item!(f32, floats);
arena_item!(bool, bools);

#[derive(Debug, Default)]
pub struct Arena {
    capacity: usize,
    cursor: usize,
    source: String,
    fields: Vec<Field>,
    strings: Vec<StrView>,
    ints: Vec<i32>,
    floats: Vec<f32>,
    bools: Vec<bool>,
}

impl Arena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn used(&self) -> usize {
        self.cursor
    }

    pub fn available(&self) -> usize {
        self.capacity - self.cursor
    }

    pub fn reset(&mut self) {
        trace!(capacity = self.capacity, used = self.cursor, "arena reset");
        self.cursor = 0;
        self.source.clear();
        self.fields.clear();
        self.strings.clear();
        self.ints.clear();
        self.floats.clear();
        self.bools.clear();
    }

    /// Bumps the cursor to the next multiple of `align`, then past `size`
    /// bytes, returning the aligned offset. The cursor is untouched on failure.
    pub fn alloc_raw(&mut self, size: usize, align: usize) -> Result<usize, OutOfMemory> {
        let exhausted = OutOfMemory {
            requested: size,
            available: self.available(),
        };
        let aligned = align_up(self.cursor, align.max(1).next_power_of_two()).ok_or(exhausted)?;
        let end = aligned.checked_add(size).ok_or(exhausted)?;
        if end > self.capacity {
            return Err(exhausted);
        }
        self.cursor = end;
        Ok(aligned)
    }

    /// Charges the footprint of one transient `T` against the budget.
    pub fn charge<T>(&mut self) -> Result<(), OutOfMemory> {
        self.alloc_raw(size_of::<T>(), align_of::<T>()).map(|_| ())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn store_source(&mut self, text: &str) -> Result<(), OutOfMemory> {
        if u32::try_from(text.len()).is_err() {
            return Err(OutOfMemory {
                requested: text.len(),
                available: self.available(),
            });
        }
        self.alloc_raw(text.len(), 1)?;
        self.source.clear();
        self.source.push_str(text);
        Ok(())
    }

    /// Lends the source copy out so a scanner can borrow it while the pools
    /// are being filled. Must be paired with [`Arena::restore_source`].
    pub(crate) fn take_source(&mut self) -> String {
        std::mem::take(&mut self.source)
    }

    pub(crate) fn restore_source(&mut self, source: String) {
        self.source = source;
    }

    pub fn str(&self, view: StrView) -> &str {
        self.source.get(view.range()).unwrap_or("")
    }

    pub fn alloc_field(&mut self, field: Field) -> Result<FieldId, OutOfMemory> {
        let index = u32::try_from(self.fields.len()).map_err(|_| OutOfMemory {
            requested: size_of::<Field>(),
            available: self.available(),
        })?;
        self.charge::<Field>()?;
        self.fields.push(field);
        Ok(FieldId::new(index))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id.index())
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.get_mut(id.index())
    }

    /// Allocates `len` default-initialised items in one contiguous run.
    pub fn alloc_slice<T: ArenaItem>(&mut self, len: usize) -> Result<Slice<T>, OutOfMemory> {
        let exhausted = OutOfMemory {
            requested: len.saturating_mul(size_of::<T>()),
            available: self.available(),
        };
        let start = u32::try_from(T::pool(self).len()).map_err(|_| exhausted)?;
        let count = u32::try_from(len).map_err(|_| exhausted)?;
        let size = len.checked_mul(size_of::<T>()).ok_or(exhausted)?;
        self.alloc_raw(size, align_of::<T>())?;
        let pool = T::pool_mut(self);
        pool.resize(pool.len() + len, T::default());
        Ok(Slice::new(start, count))
    }

    pub fn slice<T: ArenaItem>(&self, slice: Slice<T>) -> &[T] {
        T::pool(self).get(slice.range()).unwrap_or(&[])
    }

    pub fn slice_mut<T: ArenaItem>(&mut self, slice: Slice<T>) -> &mut [T] {
        let pool = T::pool_mut(self);
        match pool.get_mut(slice.range()) {
            Some(items) => items,
            None => &mut [],
        }
    }
}

/// `align` must be a power of two.
#[inline]
fn align_up(offset: usize, align: usize) -> Option<usize> {
    Some(offset.checked_add(align - 1)? & !(align - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(0, 4, 0)]
    #[case(1, 4, 4)]
    #[case(4, 4, 4)]
    #[case(5, 8, 8)]
    #[case(9, 1, 9)]
    fn test_align_up(#[case] offset: usize, #[case] align: usize, #[case] expected: usize) {
        assert_eq!(align_up(offset, align), Some(expected));
    }

    #[rstest::rstest]
    fn test_align_up_overflow() {
        assert_eq!(align_up(usize::MAX, 8), None);
    }

    #[rstest::rstest]
    fn test_alloc_raw_bumps_and_aligns() {
        let mut arena = Arena::with_capacity(32);
        assert_eq!(arena.alloc_raw(3, 1), Ok(0));
        assert_eq!(arena.alloc_raw(4, 4), Ok(4));
        assert_eq!(arena.used(), 8);
        assert_eq!(arena.available(), 24);
    }

    #[rstest::rstest]
    fn test_alloc_raw_failure_has_no_side_effects() {
        let mut arena = Arena::with_capacity(16);
        arena.alloc_raw(10, 1).unwrap();
        let error = arena.alloc_raw(8, 4).unwrap_err();
        assert_eq!(error.requested, 8);
        assert_eq!(error.available, 6);
        assert_eq!(arena.used(), 10);
        assert_eq!(arena.alloc_raw(6, 1), Ok(10));
        assert_eq!(arena.available(), 0);
    }

    #[rstest::rstest]
    fn test_alloc_raw_rejects_overflowing_sizes() {
        let mut arena = Arena::with_capacity(16);
        arena.alloc_raw(1, 1).unwrap();
        assert!(arena.alloc_raw(usize::MAX, 1).is_err());
        assert_eq!(arena.used(), 1);
    }

    #[rstest::rstest]
    fn test_reset_reclaims_everything() {
        let mut arena = Arena::with_capacity(1024);
        arena.store_source("key = 1;").unwrap();
        let id = arena
            .alloc_field(Field::new(StrView::new(0, 3), None))
            .unwrap();
        assert!(arena.field(id).is_some());
        assert!(arena.used() > 0);

        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.source(), "");
        assert!(arena.field(id).is_none());
    }

    #[rstest::rstest]
    fn test_fields_are_charged() {
        let mut arena = Arena::with_capacity(size_of::<Field>() * 2);
        arena.alloc_field(Field::new(StrView::default(), None)).unwrap();
        arena.alloc_field(Field::new(StrView::default(), None)).unwrap();
        assert!(arena
            .alloc_field(Field::new(StrView::default(), None))
            .is_err());
    }

    #[rstest::rstest]
    fn test_slices_are_contiguous_and_typed() {
        let mut arena = Arena::with_capacity(256);
        let ints = arena.alloc_slice::<i32>(3).unwrap();
        arena.slice_mut(ints).copy_from_slice(&[1, 2, 3]);
        let more = arena.alloc_slice::<i32>(2).unwrap();
        arena.slice_mut(more).copy_from_slice(&[4, 5]);
        let flags = arena.alloc_slice::<bool>(2).unwrap();
        arena.slice_mut(flags)[1] = true;

        assert_eq!(arena.slice(ints), &[1, 2, 3]);
        assert_eq!(arena.slice(more), &[4, 5]);
        assert_eq!(arena.slice(flags), &[false, true]);
        assert_eq!(ints.len(), 3);
    }

    #[rstest::rstest]
    fn test_slice_charges_exact_size() {
        let mut arena = Arena::with_capacity(64);
        arena.alloc_raw(1, 1).unwrap();
        arena.alloc_slice::<f32>(4).unwrap();
        assert_eq!(arena.used(), 4 + 16);
        assert!(arena.alloc_slice::<StrView>(6).is_err());
        assert_eq!(arena.used(), 20);
    }

    #[rstest::rstest]
    fn test_str_resolves_views() {
        let mut arena = Arena::with_capacity(64);
        arena.store_source("name = \"Ada\";").unwrap();
        assert_eq!(arena.str(StrView::new(0, 4)), "name");
        assert_eq!(arena.str(StrView::new(8, 3)), "Ada");
        assert_eq!(arena.str(StrView::new(60, 3)), "");
    }
}
