use tracing::{debug, trace};

use crate::arena::{Arena, ArenaItem, Slice};
use crate::error::{ErrorCode, OutOfMemory, ParseError};
use crate::types::{ArrayItems, Field, FieldId, Value, ValueType};
use crate::{ParseOptions, Result};

use super::scanner::{LexError, Scanner, Token, TokenKind};

/// Recursive-descent parser building fields straight into an arena.
///
/// The first error is latched in `last_error`; every later failure report
/// hands back that same record so the caller always sees the original cause.
pub(crate) struct Parser<'s, 'a> {
    scanner: Scanner<'s>,
    arena: &'a mut Arena,
    current: Token,
    max_array_items: usize,
    max_depth: usize,
    depth: usize,
    last_error: Option<ParseError>,
}

impl<'s, 'a> Parser<'s, 'a> {
    pub fn new(source: &'s [u8], arena: &'a mut Arena, options: &ParseOptions) -> Self {
        Self {
            scanner: Scanner::new(source, options.max_digits),
            arena,
            current: Token::start(),
            max_array_items: options.max_array_items,
            max_depth: options.max_depth,
            depth: 0,
            last_error: None,
        }
    }

    #[cfg(test)]
    pub fn last_error(&self) -> Option<ParseError> {
        self.last_error
    }

    pub fn parse_document(&mut self) -> Result<Option<FieldId>> {
        self.advance()?;
        let root = self.parse_fields(None)?;
        self.expect(TokenKind::Eof)?;
        Ok(root)
    }

    fn fail(&mut self, code: ErrorCode) -> ParseError {
        if let Some(first) = self.last_error {
            return first;
        }
        let error = ParseError::new(code, self.current.line, self.current.column);
        debug!(%error, "parse failed");
        self.last_error = Some(error);
        error
    }

    fn out_of_memory(&mut self, err: OutOfMemory) -> ParseError {
        debug!(%err, "arena exhausted while parsing");
        self.fail(ErrorCode::OutOfMemory)
    }

    /// Pulls the next token, charging it to the arena. Lexer errors surface
    /// here so no caller ever inspects an error token.
    fn advance(&mut self) -> Result<()> {
        if let Err(err) = self.arena.charge::<Token>() {
            return Err(self.out_of_memory(err));
        }
        self.current = self.scanner.next_token();
        match self.current.kind {
            TokenKind::Error(LexError::NumberTooLong) => Err(self.fail(ErrorCode::InvalidNumber)),
            TokenKind::Error(_) => Err(self.fail(ErrorCode::UnexpectedToken)),
            _ => Ok(()),
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<()> {
        if self.current.kind != expected {
            return Err(self.fail(ErrorCode::UnexpectedToken));
        }
        self.advance()
    }

    /// Parses consecutive fields into a sibling list and returns its head.
    fn parse_fields(&mut self, owner: Option<FieldId>) -> Result<Option<FieldId>> {
        let mut head = None;
        let mut tail: Option<FieldId> = None;
        while let TokenKind::Key(key) = self.current.kind {
            let id = self
                .arena
                .alloc_field(Field::new(key, owner))
                .map_err(|err| self.out_of_memory(err))?;
            match tail.and_then(|prev| self.arena.field_mut(prev)) {
                Some(prev) => prev.next = Some(id),
                None => head = Some(id),
            }
            tail = Some(id);
            self.parse_field(id)?;
        }
        Ok(head)
    }

    fn parse_field(&mut self, id: FieldId) -> Result<()> {
        self.advance()?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_value(id)?;
        if let Some(field) = self.arena.field_mut(id) {
            field.value = value;
        }
        self.expect(TokenKind::Semicolon)
    }

    fn parse_value(&mut self, owner: FieldId) -> Result<Value> {
        let value = match self.current.kind {
            TokenKind::String(view) => Value::String(view),
            TokenKind::Int(value) => Value::Int(value),
            TokenKind::Float(value) => Value::Float(value),
            TokenKind::Bool(value) => Value::Bool(value),
            TokenKind::BraceLeft => return self.parse_object(owner),
            TokenKind::BracketLeft => return self.parse_array(),
            TokenKind::Vec(arity) => return self.parse_vector(arity),
            _ => return Err(self.fail(ErrorCode::UnexpectedToken)),
        };
        self.advance()?;
        Ok(value)
    }

    fn parse_object(&mut self, owner: FieldId) -> Result<Value> {
        if self.depth + 1 >= self.max_depth {
            return Err(self.fail(ErrorCode::MaxDepthExceeded));
        }
        self.advance()?;
        self.depth += 1;
        let head = self.parse_fields(Some(owner))?;
        self.depth -= 1;
        self.expect(TokenKind::BraceRight)?;
        Ok(Value::Object(head))
    }

    /// Two passes over the same tokens: the first fixes the element type and
    /// count, the second fills one exactly-sized buffer.
    fn parse_array(&mut self) -> Result<Value> {
        let checkpoint = self.scanner.checkpoint();
        self.advance()?;
        if self.current.kind == TokenKind::BracketRight {
            self.advance()?;
            return Ok(Value::Array(ArrayItems::Empty));
        }

        let element_type = self.check_element()?;
        let count = self.count_elements()?;
        trace!(%element_type, count, "array sized");

        self.scanner.restore(checkpoint);
        self.advance()?;
        let items = match element_type {
            ValueType::String => ArrayItems::String(self.fill_items(count, |kind| match kind {
                TokenKind::String(view) => Some(view),
                _ => None,
            })?),
            ValueType::Int => ArrayItems::Int(self.fill_items(count, |kind| match kind {
                TokenKind::Int(value) => Some(value),
                _ => None,
            })?),
            ValueType::Float => ArrayItems::Float(self.fill_items(count, |kind| match kind {
                TokenKind::Float(value) => Some(value),
                _ => None,
            })?),
            _ => ArrayItems::Bool(self.fill_items(count, |kind| match kind {
                TokenKind::Bool(value) => Some(value),
                _ => None,
            })?),
        };
        self.expect(TokenKind::BracketRight)?;
        Ok(Value::Array(items))
    }

    /// Classifies the current token as an array element.
    fn check_element(&mut self) -> Result<ValueType> {
        match self.current.kind {
            TokenKind::String(_) => Ok(ValueType::String),
            TokenKind::Int(_) => Ok(ValueType::Int),
            TokenKind::Float(_) => Ok(ValueType::Float),
            TokenKind::Bool(_) => Ok(ValueType::Bool),
            TokenKind::BraceLeft | TokenKind::BracketLeft | TokenKind::Vec(_) => {
                Err(self.fail(ErrorCode::ArrayNotSupportedType))
            }
            _ => Err(self.fail(ErrorCode::UnexpectedToken)),
        }
    }

    /// Counts elements from the current one up to the closing bracket,
    /// leaving `]` as the current token.
    fn count_elements(&mut self) -> Result<usize> {
        let mut count = 0;
        loop {
            self.check_element()?;
            count += 1;
            if count > self.max_array_items {
                return Err(self.fail(ErrorCode::ArrayTooManyItems));
            }
            self.advance()?;
            match self.current.kind {
                TokenKind::Comma => self.advance()?,
                TokenKind::BracketRight => return Ok(count),
                _ => return Err(self.fail(ErrorCode::UnexpectedToken)),
            }
        }
    }

    fn fill_items<T: ArenaItem>(
        &mut self,
        count: usize,
        extract: fn(TokenKind) -> Option<T>,
    ) -> Result<Slice<T>> {
        let slice = self
            .arena
            .alloc_slice::<T>(count)
            .map_err(|err| self.out_of_memory(err))?;
        for index in 0..count {
            if index > 0 {
                self.expect(TokenKind::Comma)?;
            }
            let Some(item) = extract(self.current.kind) else {
                return Err(self.fail(ErrorCode::ArrayTypeMismatch));
            };
            if let Some(slot) = self.arena.slice_mut(slice).get_mut(index) {
                *slot = item;
            }
            self.advance()?;
        }
        Ok(slice)
    }

    fn parse_vector(&mut self, arity: u8) -> Result<Value> {
        self.advance()?;
        self.expect(TokenKind::ParenLeft)?;
        let mut components = [0.0f32; 4];
        for (index, slot) in components.iter_mut().take(usize::from(arity)).enumerate() {
            if index > 0 {
                self.expect(TokenKind::Comma)?;
            }
            *slot = match self.current.kind {
                TokenKind::Int(value) => value as f32,
                TokenKind::Float(value) => value,
                _ => return Err(self.fail(ErrorCode::UnexpectedToken)),
            };
            self.advance()?;
        }
        self.expect(TokenKind::ParenRight)?;

        let [x, y, z, w] = components;
        Ok(match arity {
            2 => Value::Vec2([x, y]),
            3 => Value::Vec3([x, y, z]),
            _ => Value::Vec4([x, y, z, w]),
        })
    }
}
