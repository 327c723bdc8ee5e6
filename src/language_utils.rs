//! Language utilities for ISO language code handling
//!
//! This module provides functions for validating, normalizing, and
//! matching ISO 639-1 (2-letter) and ISO 639-2 (3-letter) language codes,
//! plus the "auto" pseudo-code accepted as a source language.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Pseudo language code asking the service to detect the source language
pub const AUTO_DETECT: &str = "auto";

// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Whether the code asks for source language detection
pub fn is_auto(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(AUTO_DETECT)
}

/// Resolve a code to a language, accepting ISO 639-1, 639-2/T and 639-2/B
fn lookup(code: &str) -> Option<Language> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => {
            let part2t = PART2B_TO_PART2T
                .iter()
                .find(|(b, _)| *b == normalized_code)
                .map(|(_, t)| *t)
                .unwrap_or(normalized_code.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Validate that a code is a known ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<()> {
    lookup(code)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    if is_auto(code) {
        return Ok("the detected language".to_string());
    }

    let lang = lookup(code).ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;
    Ok(lang.to_name().to_string())
}
