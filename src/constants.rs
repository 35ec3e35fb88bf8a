pub const DEFAULT_MAX_DIGITS: usize = 15;

pub const DEFAULT_MAX_ARRAY_ITEMS: usize = 128;

pub const MAX_DEPTH: usize = 64;

pub const MAX_PATH_LENGTH: usize = 128;

/// Fixed slack added to every memory estimate.
pub const ESTIMATE_OVERHEAD: usize = 1024;

#[inline]
pub fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

#[inline]
pub fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
