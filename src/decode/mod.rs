mod parser;
mod scanner;

use std::mem::size_of;

use tracing::debug;

use crate::arena::Arena;
use crate::constants::ESTIMATE_OVERHEAD;
use crate::error::{ErrorCode, ParseError};
use crate::query::Document;
use crate::types::{Field, FieldId, StrView};
use crate::{ParseOptions, Result};

use parser::Parser;
use scanner::Token;

pub fn parse<'a>(source: &str, arena: &'a mut Arena) -> Result<Document<'a>> {
    parse_with_options(source, arena, &ParseOptions::default())
}

/// Resets `arena`, copies `source` into it and parses the whole document.
///
/// Fails with [`ErrorCode::InsufficientMemory`] before scanning anything when
/// the arena capacity is below [`estimate_memory`].
pub fn parse_with_options<'a>(
    source: &str,
    arena: &'a mut Arena,
    options: &ParseOptions,
) -> Result<Document<'a>> {
    let root = parse_root(source, arena, options)?;
    Ok(Document::new(arena, root))
}

/// Byte budget that always suffices to parse `source`.
///
/// Derived from the source length alone: every token is at least one byte,
/// every field at least four (`k=1;`) and every array item at least two.
/// Tokens inside arrays are scanned twice.
pub fn estimate_memory(source: &str) -> usize {
    let len = source.len();
    let tokens = len.saturating_add(1).saturating_mul(2);
    let fields = len / 4 + 1;
    let items = len / 2 + 1;
    len.saturating_add(tokens.saturating_mul(size_of::<Token>()))
        .saturating_add(fields.saturating_mul(size_of::<Field>() + 4))
        .saturating_add(items.saturating_mul(size_of::<StrView>()))
        .saturating_add(ESTIMATE_OVERHEAD)
}

fn parse_root(source: &str, arena: &mut Arena, options: &ParseOptions) -> Result<Option<FieldId>> {
    let required = estimate_memory(source);
    if arena.capacity() < required {
        debug!(
            capacity = arena.capacity(),
            required, "arena too small for source"
        );
        return Err(ParseError::at_start(ErrorCode::InsufficientMemory));
    }

    debug!(len = source.len(), capacity = arena.capacity(), "parsing document");
    arena.reset();
    arena
        .store_source(source)
        .map_err(|_| ParseError::at_start(ErrorCode::OutOfMemory))?;

    let text = arena.take_source();
    let result = Parser::new(text.as_bytes(), arena, options).parse_document();
    arena.restore_source(text);

    if result.is_ok() {
        debug!(used = arena.used(), "parsed document");
    }
    result
}
