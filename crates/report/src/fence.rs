//! Code-fence stripping for model output.

/// Remove a wrapping code fence (```` ``` ```` or ```` ```html ````) from
/// generated text.
///
/// Both the opening and closing marker lines must be present; otherwise the
/// input is returned unchanged apart from whitespace trimming. Applying the
/// function twice yields the same result as applying it once.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    let has_closing = lines.len() >= 2 && lines[lines.len() - 1].trim() == "```";
    if !has_closing {
        return trimmed.to_string();
    }

    lines[1..lines.len() - 1].join("\n").trim().to_string()
}
