//! Content signatures.
//!
//! A signature is `"{utf16_len}:{hash:08x}"` where the hash is a wrapping
//! `h * 31 + unit` over UTF-16 code units. It is not cryptographic: it only has
//! to tell whether the page context changed since the last analysis.

/// Compute the signature of `text`. Empty input has an empty signature.
pub fn signature(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut hash: u32 = 0;
    let mut len: usize = 0;
    for unit in text.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(u32::from(unit));
        len += 1;
    }

    format!("{len}:{hash:08x}")
}
