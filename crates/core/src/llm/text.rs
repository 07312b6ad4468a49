/// Normalises model output into a single display line: strips Markdown
/// fences and wrapping quotes, collapses whitespace.
pub fn clean_text(raw: &str) -> Option<String> {
    let mut s = raw.trim();
    if s.starts_with("```") {
        s = s.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
        if let Some(end) = s.rfind("```") {
            s = &s[..end];
        }
    }
    let s = s.trim().trim_matches(|c| c == '"' || c == '“' || c == '”').trim();
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_and_quotes() {
        assert_eq!(
            clean_text("```\n\"Save ₹500 this week.\"\n```").as_deref(),
            Some("Save ₹500 this week.")
        );
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(
            clean_text("  Pay the\n EMI   first. ").as_deref(),
            Some("Pay the EMI first.")
        );
    }

    #[test]
    fn blank_output_is_none() {
        assert_eq!(clean_text(" \n "), None);
        assert_eq!(clean_text("```\n```"), None);
    }
}
