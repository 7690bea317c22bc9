//! Unicode-safe text utilities for message handling.

/// Truncate `text` to at most `max_chars` Unicode scalar values,
/// appending `suffix` if truncation occurred.
pub fn truncate_chars(text: &str, max_chars: usize, suffix: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut result = text[..byte_idx].to_string();
            result.push_str(suffix);
            result
        }
        None => text.to_string(),
    }
}

/// First line of `text`, truncated for one-line listings
pub fn preview_line(text: &str, max_chars: usize) -> String {
    let first = text.lines().next().unwrap_or("");
    let truncated = truncate_chars(first, max_chars, "...");
    if text.lines().nth(1).is_some() && !truncated.ends_with("...") {
        format!("{truncated} ...")
    } else {
        truncated
    }
}

/// Validate message text before it is stored.
///
/// Returns `Err` with a user-facing error message when:
/// - `text` is empty or only whitespace
/// - `text` contains null bytes (`\0`)
/// - `text.len()` (in bytes) exceeds `max_bytes`
pub fn validate_message_text(text: &str, max_bytes: usize) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Message is empty.".to_string());
    }
    if text.contains('\0') {
        return Err(
            "Message contains null bytes (\\0) which are not allowed. \
             Remove null bytes and retry."
                .to_string(),
        );
    }
    if text.len() > max_bytes {
        return Err(format!(
            "Message size ({} bytes) exceeds maximum allowed ({} bytes). \
             Consider attaching it as a file instead.",
            text.len(),
            max_bytes,
        ));
    }
    Ok(())
}

/// Default maximum message size in bytes (1 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1_048_576;

const CODE_PREFIXES: &[&str] = &[
    "function ", "class ", "const ", "let ", "var ", "if ", "for ", "while ", "import ",
    "export ", "#include", "package ", "using ",
];

const CODE_MODIFIERS: &[&str] = &["public ", "private ", "protected "];

/// Heuristic: does this text look like source code?
///
/// True when it starts with a common statement keyword, a line starts with
/// an access modifier, or it contains a brace or semicolon.
pub fn looks_like_code(text: &str) -> bool {
    if CODE_PREFIXES.iter().any(|prefix| text.starts_with(prefix)) {
        return true;
    }
    if text.contains(['{', '}', ';']) {
        return true;
    }
    text.lines()
        .next()
        .map(str::trim_start)
        .is_some_and(|line| CODE_MODIFIERS.iter().any(|m| line.starts_with(m)))
}
