/// Split model output into insight bullets.
///
/// Blank lines are dropped and a leading `<digits>.` enumeration (with any
/// whitespace after it) is removed before trimming.
pub fn parse_insights(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| strip_enumeration(line).trim().to_string())
        .collect()
}

/// Only a prefix at the very start of the raw line counts; indented numbers
/// are left alone.
fn strip_enumeration(line: &str) -> &str {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    match line[digits..].strip_prefix('.') {
        Some(rest) if digits > 0 => rest.trim_start(),
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_markdown_list() {
        assert_eq!(
            parse_insights("1. **Trend A**\n\n2. Trend B"),
            vec!["**Trend A**".to_string(), "Trend B".to_string()]
        );
    }

    #[test]
    fn unnumbered_lines_are_kept_trimmed() {
        assert_eq!(
            parse_insights("  * **Peak** in March  \r\n\t\nPlain line"),
            vec!["* **Peak** in March".to_string(), "Plain line".to_string()]
        );
    }

    #[test]
    fn only_leading_enumeration_is_removed() {
        assert_eq!(parse_insights("12.Growth of 3.5%"), vec!["Growth of 3.5%".to_string()]);
        assert_eq!(parse_insights(" 3. indented"), vec!["3. indented".to_string()]);
        assert_eq!(parse_insights("2024 was strong"), vec!["2024 was strong".to_string()]);
    }

    #[test]
    fn empty_text_gives_no_insights() {
        assert!(parse_insights("\n \n").is_empty());
    }
}
