/// Width of `c` in half-width units: CJK ideographs, kana and full-width forms count 2.
pub fn char_weight(c: char) -> usize {
    match c {
        '\u{4e00}'..='\u{9fff}' | '\u{3040}'..='\u{30ff}' | '\u{ff00}'..='\u{ffef}' => 2,
        _ => 1,
    }
}

/// Total width of `s` in half-width units.
pub fn text_weight(s: &str) -> usize {
    s.chars().map(char_weight).sum()
}

/// Split `text` into lines no wider than `budget` half-width units.
///
/// Hard line breaks are kept (blank lines included); a line is broken before the character that
/// would overflow. A single character wider than the budget still gets its own line.
pub fn wrap_text(text: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let mut line = String::new();
        let mut width = 0usize;
        for c in raw.chars() {
            let w = char_weight(c);
            if width + w > budget && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                width = 0;
            }
            line.push(c);
            width += w;
        }
        lines.push(line);
    }
    // A trailing newline does not open a new line.
    if lines.len() > 1 && lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
