//! Prompt pattern helpers.

use regex::bytes::Regex;

/// Compile a prompt pattern, anchoring it to the end of output.
///
/// Interactive prompts such as `[confirm yes/no]:` are only meaningful when
/// they are the last thing the device printed.
pub fn compile_prompt_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let pattern = if pattern.ends_with('$') {
        pattern.to_string()
    } else {
        format!(r"{}\s*$", pattern)
    };

    Regex::new(&pattern)
}

/// Combine several prompt patterns into one alternation.
pub fn combine_patterns<'a>(
    patterns: impl IntoIterator<Item = &'a Regex>,
) -> Result<Regex, regex::Error> {
    let combined = patterns
        .into_iter()
        .map(|p| format!("(?:{})", p.as_str()))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_adds_anchor() {
        let pattern = compile_prompt_pattern(r"\[confirm yes/no\]:").unwrap();
        assert!(pattern.is_match(b"overwrite? [confirm yes/no]: "));
        assert!(!pattern.is_match(b"[confirm yes/no]: then more text"));
    }

    #[test]
    fn test_compile_keeps_anchor() {
        let pattern = compile_prompt_pattern(r"\[confirm yes/no\]:\s?$").unwrap();
        assert_eq!(pattern.as_str(), r"\[confirm yes/no\]:\s?$");
    }

    #[test]
    fn test_combine_patterns() {
        let a = Regex::new(r">\s?$").unwrap();
        let b = Regex::new(r"#\s?$").unwrap();
        let combined = combine_patterns([&a, &b]).unwrap();
        assert!(combined.is_match(b"rtr1>"));
        assert!(combined.is_match(b"rtr1#"));
        assert!(!combined.is_match(b"rtr1$"));
    }
}
