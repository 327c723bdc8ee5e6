use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;

// @module: Subtitle document parsing and serialization

// @const: Blank-line block separator (line break, whitespace-only lines, line break)
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n").expect("block separator pattern is valid")
});

// @struct: One subtitle cue as raw lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleBlock {
    // @field: Lines exactly as they appeared in the document
    pub lines: Vec<String>,
}

impl SubtitleBlock {
    /// Creates a block from its raw lines
    pub fn new(lines: Vec<String>) -> Self {
        SubtitleBlock { lines }
    }

    /// Creates a well-formed block from an index, a timing line and text lines
    pub fn cue(index: usize, timing: &str, text: &[&str]) -> Self {
        let mut lines = Vec::with_capacity(text.len() + 2);
        lines.push(index.to_string());
        lines.push(timing.to_string());
        lines.extend(text.iter().map(|line| line.to_string()));
        SubtitleBlock { lines }
    }

    // @checks: At least 3 lines and a numeric first line
    pub fn is_well_formed(&self) -> bool {
        self.lines.len() >= 3 && is_index_line(&self.lines[0])
    }

    /// Index line of a well-formed block
    pub fn index_line(&self) -> Option<&str> {
        if self.is_well_formed() {
            Some(self.lines[0].as_str())
        } else {
            None
        }
    }

    /// Timing line of a well-formed block
    pub fn timing_line(&self) -> Option<&str> {
        if self.is_well_formed() {
            Some(self.lines[1].as_str())
        } else {
            None
        }
    }

    /// Display text lines; empty for opaque blocks
    pub fn text_lines(&self) -> &[String] {
        if self.is_well_formed() {
            &self.lines[2..]
        } else {
            &[]
        }
    }

    /// Number of display text lines
    pub fn text_line_count(&self) -> usize {
        self.text_lines().len()
    }

    // @returns: Translation payload, empty when there is nothing to translate
    pub fn payload(&self) -> String {
        let joined = self.text_lines().join("\n");
        if joined.trim().is_empty() {
            String::new()
        } else {
            joined
        }
    }

    /// Returns a copy with the text lines replaced; opaque blocks come back untouched
    pub fn with_text_lines(&self, text_lines: Vec<String>) -> Self {
        if !self.is_well_formed() {
            return self.clone();
        }

        let mut lines = Vec::with_capacity(text_lines.len() + 2);
        lines.push(self.lines[0].clone());
        lines.push(self.lines[1].clone());
        lines.extend(text_lines);
        SubtitleBlock { lines }
    }
}

impl fmt::Display for SubtitleBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

fn is_index_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}

/// Split raw document text into blocks on blank-line boundaries.
///
/// Never fails: groups that do not look like cues are kept as opaque blocks.
pub fn parse_blocks(raw: &str) -> Vec<SubtitleBlock> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    BLOCK_SEPARATOR
        .split(raw)
        .map(|group| {
            let lines = group.trim().lines().map(str::to_string).collect();
            SubtitleBlock::new(lines)
        })
        .collect()
}

/// Join blocks back into document text, one blank line between blocks
pub fn serialize_blocks(blocks: &[SubtitleBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.lines.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}
