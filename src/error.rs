use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The arena ran out of space in the middle of a parse.
    OutOfMemory,
    /// The arena capacity is below [`crate::estimate_memory`] for the source.
    InsufficientMemory,
    UnexpectedToken,
    InvalidNumber,
    ArrayTypeMismatch,
    ArrayNotSupportedType,
    ArrayTooManyItems,
    MaxDepthExceeded,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::OutOfMemory => "Out of memory",
            ErrorCode::InsufficientMemory => "Insufficient memory provided",
            ErrorCode::UnexpectedToken => "Unexpected token",
            ErrorCode::InvalidNumber => "Invalid number format",
            ErrorCode::ArrayTypeMismatch => "Array type mismatch",
            ErrorCode::ArrayNotSupportedType => "Unsupported array type",
            ErrorCode::ArrayTooManyItems => "Too many items in array",
            ErrorCode::MaxDepthExceeded => "Maximum nesting depth exceeded",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first error recorded during a parse, with the position of the token
/// that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{code} at line {line}, column {column}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    pub fn new(code: ErrorCode, line: u32, column: u32) -> Self {
        Self { code, line, column }
    }

    /// An error raised before any token was scanned.
    pub fn at_start(code: ErrorCode) -> Self {
        Self::new(code, 1, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("arena exhausted: requested {requested} bytes with {available} available")]
pub struct OutOfMemory {
    pub requested: usize,
    pub available: usize,
}
