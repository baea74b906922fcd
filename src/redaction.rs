use once_cell::sync::Lazy;
use regex::Regex;

static CREDENTIAL_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b([a-z][a-z0-9+.\-]*://[^:/@\s]+):[^@/\s]+@").expect("valid regex"),
            "$1:[REDACTED]@",
        ),
        (
            Regex::new(r"(?i)\b(password|passwd|pwd|secret|token)=[^&\s]+").expect("valid regex"),
            "$1=[REDACTED]",
        ),
    ]
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionResult {
    pub content: String,
    pub redaction_count: usize,
}

pub fn redact(input: &str) -> RedactionResult {
    let mut content = input.to_string();
    let mut redaction_count = 0usize;

    for (pattern, replacement) in CREDENTIAL_PATTERNS.iter() {
        let matches = pattern.find_iter(&content).count();
        if matches == 0 {
            continue;
        }
        redaction_count += matches;
        content = pattern.replace_all(&content, *replacement).to_string();
    }

    RedactionResult {
        content,
        redaction_count,
    }
}

pub fn redact_str(input: &str) -> String {
    redact(input).content
}
