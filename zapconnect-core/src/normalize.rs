//! Phone number normalization
//!
//! Reduces whatever the user typed into the digit-only address used in the
//! deep-link path. No numbering-plan validation is done here: an input
//! without digits yields an empty string and the caller decides what to do.

/// Strip every character that is not an ASCII digit
///
/// # Examples
///
/// ```rust
/// use zapconnect_core::normalize;
///
/// assert_eq!(normalize("+1 (555) 019-9000"), "15550199000");
/// assert_eq!(normalize("call me"), "");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
