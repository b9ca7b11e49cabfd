//! Text helpers for operator-facing Telegram HTML messages.

/// Escape text for inclusion in a Telegram HTML message.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Truncate to at most `max` characters (not bytes), appending `...` when
/// anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate_chars("hello", 10), "hello");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let s = "チャンネル登録";
        assert_eq!(truncate_chars(s, 4), "チャンネ...");
    }
}
