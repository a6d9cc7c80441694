use once_cell::sync::Lazy;
use regex::Regex;

pub fn is_ascii_no_spaces(id: &str) -> Result<(), String> {
    match !id.is_empty() && id.chars().all(|c| c.is_ascii() && !c.is_whitespace())
    {
        true => Ok(()),
        false => {
            Err("should be a non-empty ascii string without spaces".to_string())
        }
    }
}

/// Alias codes are the short display names tabulation software prints on
/// pairings, e.g. `Lexington BM` or `Harvard-Westlake AB`.
pub fn is_valid_alias_code(code: &str) -> Result<(), String> {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} &'.,/()-]{0,63}$").unwrap()
    });
    match RE.is_match(code) {
        true => Ok(()),
        false => Err("invalid alias code".to_string()),
    }
}

#[cfg(test)]
#[test]
fn test_ids() {
    assert!(is_ascii_no_spaces("0192c8e6-4c1b-7d2e").is_ok());
    assert!(is_ascii_no_spaces("").is_err());
    assert!(is_ascii_no_spaces("a b").is_err());
    assert!(is_ascii_no_spaces("é").is_err());
}

#[cfg(test)]
#[test]
fn test_alias_codes() {
    assert!(is_valid_alias_code("Harvard-Westlake AB").is_ok());
    assert!(is_valid_alias_code("St. Mark's MT").is_ok());
    assert!(is_valid_alias_code(" leading space").is_err());
    assert!(is_valid_alias_code("").is_err());
    assert!(is_valid_alias_code(&"A".repeat(65)).is_err());
}
