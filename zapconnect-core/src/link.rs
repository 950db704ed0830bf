//! WhatsApp deep-link construction
//!
//! Links have the fixed form `<base>/<digits>?text=<encoded body>`. The body
//! is escaped with URI-component rules, so spaces become `%20` rather than
//! `+` and reserved characters such as `&`, `=` and `?` never leak into the
//! query string.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Default deep-link host
pub const DEFAULT_BASE_URL: &str = "https://wa.me";

/// Characters left unescaped by URI-component encoding
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode text as a URI component
pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// Builds deep links against a configurable base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    /// Create a builder for the given base URL
    ///
    /// A trailing `/` on the base is dropped so it is never doubled.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// The base URL links are built against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the link for an already normalized number and a raw body
    ///
    /// Never fails. An empty `normalized` number is not rejected here.
    pub fn build(&self, normalized: &str, body: &str) -> String {
        format!(
            "{}/{}?text={}",
            self.base_url,
            normalized,
            encode_component(body)
        )
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Build a link against [`DEFAULT_BASE_URL`]
///
/// ```rust
/// use zapconnect_core::build_link;
///
/// assert_eq!(
///     build_link("15550199000", "Hello"),
///     "https://wa.me/15550199000?text=Hello"
/// );
/// ```
pub fn build_link(normalized: &str, body: &str) -> String {
    LinkBuilder::default().build(normalized, body)
}
