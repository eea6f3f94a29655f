// Escaping for values that end up inside generated script literals

/// Scrub free text (station name, description, URL) before it goes in a literal.
/// Double quotes become apostrophes; CR and LF are dropped.
pub fn clean_up_string(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| if c == '"' { '\'' } else { c })
        .collect()
}

/// Render `raw` as a double-quoted script string literal.
///
/// A `#{` would start interpolation, so the literal is split between `#` and `{`
/// and rejoined with `^`.
pub fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    let mut previous = None;
    for c in raw.chars() {
        match c {
            '{' if previous == Some('#') => out.push_str("\" ^ \"{"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
        previous = Some(c);
    }
    out.push('"');
    out
}

/// Same as `quote(clean_up_string(raw))`.
pub fn quote_text(raw: &str) -> String {
    quote(&clean_up_string(raw))
}
