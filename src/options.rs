use crate::constants::{DEFAULT_MAX_ARRAY_ITEMS, DEFAULT_MAX_DIGITS, MAX_DEPTH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Digit budget shared by the integer and fractional part of a literal.
    pub max_digits: usize,
    pub max_array_items: usize,
    /// Maximum number of nested object levels, counting the top level.
    pub max_depth: usize,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_digits(mut self, max_digits: usize) -> Self {
        self.max_digits = max_digits;
        self
    }

    pub fn with_max_array_items(mut self, max_array_items: usize) -> Self {
        self.max_array_items = max_array_items;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_digits: DEFAULT_MAX_DIGITS,
            max_array_items: DEFAULT_MAX_ARRAY_ITEMS,
            max_depth: MAX_DEPTH,
        }
    }
}
