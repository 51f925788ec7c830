//! Discord message size helpers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Pack whole lines into as few messages as possible without exceeding
/// `max_size` bytes per message.
///
/// Lines never straddle two messages unless a single line is longer than
/// `max_size`, in which case it is split on character boundaries.
pub fn pack_lines<S: AsRef<str>>(lines: &[S], max_size: usize) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current = String::new();

    for line in lines.iter().map(AsRef::as_ref) {
        let needed = if current.is_empty() {
            line.len()
        } else {
            current.len() + 1 + line.len()
        };

        if needed <= max_size {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            continue;
        }

        if !current.is_empty() {
            messages.push(std::mem::take(&mut current));
        }

        if line.len() <= max_size {
            current.push_str(line);
        } else {
            let mut pieces = split_on_chars(line, max_size);
            // Keep the tail open so short follow-up lines can join it.
            current = pieces.pop().unwrap_or_default();
            messages.extend(pieces);
        }
    }

    if !current.is_empty() {
        messages.push(current);
    }
    messages
}

/// Pack lines to fit in regular Discord messages
pub fn pack_for_message<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    pack_lines(lines, MESSAGE_LIMIT)
}

fn split_on_chars(line: &str, max_size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for ch in line.chars() {
        if current.len() + ch.len_utf8() > max_size && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
