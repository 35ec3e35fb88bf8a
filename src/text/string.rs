/// Copies `text` into `buf` followed by a NUL byte and returns the length of
/// `text`. Nothing is written unless the text and its terminator both fit.
pub fn copy_to_cstr(text: &str, buf: &mut [u8]) -> Option<usize> {
    let len = text.len();
    if len >= buf.len() {
        return None;
    }
    buf[..len].copy_from_slice(text.as_bytes());
    buf[len] = 0;
    Some(len)
}
