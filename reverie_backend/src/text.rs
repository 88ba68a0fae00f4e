//! Hygiene helpers for raw oracle output and caller text.

/// Strip reasoning tags like <think>...</think> from a completion.
///
/// Scratch-work can contain draft prompts or stray braces that would otherwise
/// be mistaken for the answer. An unclosed opening tag is dropped on its own.
pub fn strip_reasoning_tags(text: &str) -> String {
    let mut result = text.to_string();

    for (open_tag, close_tag) in [("<thinking>", "</thinking>"), ("<think>", "</think>")] {
        while let Some(start) = result.find(open_tag) {
            if let Some(end) = result[start..].find(close_tag) {
                let end_pos = start + end + close_tag.len();
                result.replace_range(start..end_pos, "");
            } else {
                result.replace_range(start..start + open_tag.len(), "");
            }
        }
    }

    result.trim().to_string()
}

/// Keep at most `max_chars` characters, marking the cut with "...".
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for (idx, ch) in input.chars().enumerate() {
        if idx >= max_chars {
            out.push_str("...");
            break;
        }
        out.push(ch);
    }
    out
}
