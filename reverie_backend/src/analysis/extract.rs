//! Recover the first balanced object literal from free-form model output.
//!
//! A single left-to-right scan tracks three things: whether we are inside a
//! quoted string, whether the previous character was an unconsumed backslash,
//! and the brace depth. Braces only count outside strings, so values such as
//! `"use {braces} carefully"` or `"say \"hi\" {"` do not disturb the match.

#[derive(Debug, Default)]
struct ScanState {
    in_string: bool,
    escaped: bool,
    depth: usize,
    start: Option<usize>,
}

/// Returns the slice from the first unquoted `{` through its matching `}`,
/// inclusive, or `None` if the text ends before the object closes.
pub fn extract_object(text: &str) -> Option<&str> {
    let mut state = ScanState::default();

    for (idx, ch) in text.char_indices() {
        if state.escaped {
            state.escaped = false;
            continue;
        }

        match ch {
            '\\' => state.escaped = true,
            '"' => state.in_string = !state.in_string,
            '{' if !state.in_string => {
                if state.start.is_none() {
                    state.start = Some(idx);
                }
                state.depth += 1;
            }
            '}' if !state.in_string && state.depth > 0 => {
                state.depth -= 1;
                if state.depth == 0 {
                    if let Some(start) = state.start {
                        return Some(&text[start..=idx]);
                    }
                }
            }
            _ => {}
        }
    }

    None
}
