//! Masking of secrets for display.

/// Characters left visible at the start of a masked value.
pub const UNMASKED_CHARS: usize = 4;
/// Values longer than this are shortened and annotated with their length.
pub const MAX_MASKED_LEN: usize = 16;

/// Masks `value` with the default widths.
pub fn mask(value: &str) -> String {
    mask_with(value, UNMASKED_CHARS, MAX_MASKED_LEN)
}

/// Keeps the first `unmasked` characters of `value` and stars out the rest.
///
/// Values longer than `max_len` are cut to `max_len` characters and get a
/// `(N chars)` suffix with the original length.
pub fn mask_with(value: &str, unmasked: usize, max_len: usize) -> String {
    let value = value.trim();
    let len = value.chars().count();
    if len <= unmasked {
        return value.to_string();
    }

    if len > max_len {
        if max_len <= unmasked {
            return value.chars().take(max_len.max(1)).collect();
        }
        let head: String = value.chars().take(unmasked).collect();
        return format!("{head}{} ({len} chars)", "*".repeat(max_len - unmasked));
    }

    let head: String = value.chars().take(unmasked).collect();
    format!("{head}{}", "*".repeat(len - unmasked))
}
