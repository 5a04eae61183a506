/// Canonical comparison form: lower-case ASCII letters and digits, every other
/// run of characters collapsed to a single space, trimmed.
pub fn normalize(value: Option<&str>) -> String {
    let mut out = String::new();
    let mut pending_space = false;

    for c in value.unwrap_or_default().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_space = true;
        }
    }

    out
}

/// Non-empty whitespace separated tokens of an already normalized string.
pub fn tokens(normalized: &str) -> Vec<&str> {
    normalized.split(' ').filter(|t| !t.is_empty()).collect()
}
