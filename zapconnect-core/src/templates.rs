//! Quick message templates

/// Built-in templates, in display order
pub const DEFAULT_TEMPLATES: [&str; 5] = [
    "Hi, I'm interested in your product.",
    "Can you share your location?",
    "I'll call you back later.",
    "Is this item still available?",
    "Hello! Just checking in.",
];

/// Default templates as owned strings
pub fn default_templates() -> Vec<String> {
    DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect()
}

/// Append `text` to `current`, separated by a space when `current` has text
pub fn insert_template(current: &str, text: &str) -> String {
    if current.is_empty() {
        text.to_string()
    } else {
        format!("{} {}", current, text)
    }
}
