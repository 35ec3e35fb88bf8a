//! Digit-by-digit numeric conversion. Inputs are ASCII digit runs taken
//! straight from the source text; no intermediate buffer or library parser.

/// Multiply-by-ten-and-add accumulation. `None` when the result leaves the
/// `i32` range.
pub fn accumulate_int(digits: &[u8], negative: bool) -> Option<i32> {
    let limit = i64::from(i32::MAX) + 1;
    let mut value: i64 = 0;
    for &digit in digits {
        value = value * 10 + i64::from(digit.wrapping_sub(b'0'));
        if value > limit {
            return None;
        }
    }
    let value = if negative { -value } else { value };
    i32::try_from(value).ok()
}

/// Integer part first, then the fractional digits scaled by successive
/// powers of one tenth. Accumulates in `f64` and narrows once at the end.
pub fn accumulate_float(int_digits: &[u8], frac_digits: &[u8], negative: bool) -> f32 {
    let mut value = 0.0f64;
    for &digit in int_digits {
        value = value * 10.0 + f64::from(digit.wrapping_sub(b'0'));
    }
    let mut scale = 0.1f64;
    for &digit in frac_digits {
        value += f64::from(digit.wrapping_sub(b'0')) * scale;
        scale *= 0.1;
    }
    let value = if negative { -value } else { value };
    value as f32
}
