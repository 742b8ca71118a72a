//! Sequence-number extraction for exported slide filenames.
//!
//! Slide exporters name their output after the slide index, but the exact
//! shape varies by tool and locale:
//! - `Slide3.jpg` (PowerPoint, English)
//! - `幻灯片12.JPG` (PowerPoint, Chinese)
//! - `deck-007.png` (LibreOffice / pdftoppm style)
//!
//! The only contract is that each stem contains a decimal number. The first
//! run of ASCII digits is the sort key; anything after it is ignored.

/// Extract the first run of ASCII digits from a filename stem.
///
/// Returns `None` if the stem contains no digits, or if the digit run does
/// not fit in a `u64`.
///
/// - `"Slide3"` → `Some(3)`
/// - `"slide-007-final"` → `Some(7)`
/// - `"幻灯片12"` → `Some(12)`
/// - `"cover"` → `None`
pub fn sequence_number(stem: &str) -> Option<u64> {
    let start = stem.find(|c: char| c.is_ascii_digit())?;
    let digits = &stem[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}
