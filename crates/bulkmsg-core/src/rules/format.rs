/// Canonical wire text: CRLF line endings, no non-breaking spaces, one space
/// after each colon and no runs of spaces. Applying it twice changes nothing.
pub fn format_message(text: &str) -> String {
    let text = text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{a0}', " ");
    collapse_spaces(&space_colons(&text)).replace('\n', "\r\n")
}

/// Puts a space after every colon except in `scheme://` and `HH:MM`.
pub(crate) fn space_colons(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut previous: Option<char> = None;
    for (index, ch) in text.char_indices() {
        out.push(ch);
        if ch == ':' {
            let rest = &text[index + 1..];
            let between_digits = previous.is_some_and(|p| p.is_ascii_digit())
                && rest.starts_with(|next: char| next.is_ascii_digit());
            if !rest.starts_with("//") && !between_digits {
                out.push(' ');
            }
        }
        previous = Some(ch);
    }
    out
}

pub(crate) fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if last_was_space {
                continue;
            }
            last_was_space = true;
        } else {
            last_was_space = false;
        }
        out.push(ch);
    }
    out
}
