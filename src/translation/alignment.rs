/*!
 * Alignment of translated text onto a block's original line grid.
 *
 * Translators routinely reflow a multi-line cue into more or fewer lines
 * than the source. The policy here picks, in order:
 *
 * 1. no text lines: keep the block as it is
 * 2. exactly as many non-blank lines as the source: use them position by position
 * 3. a `|||`-delimited reply: use the parts if their count is right,
 *    otherwise collapse (step 5) without trying truncation
 * 4. more lines than the source (and the source has several): keep the first ones
 * 5. anything else: collapse everything onto a single line
 *
 * The last step is the only one that changes the line count of a block.
 */

use log::debug;

use crate::subtitle_processor::SubtitleBlock;

/// Delimiter some services emit between segments of a multi-line reply.
///
/// Nothing in this crate produces it; the check only recovers replies that
/// happen to contain it.
pub const SEGMENT_DELIMITER: &str = "|||";

/// Result of aligning translated text against a source line count
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alignment {
    /// Source had no text lines, block is kept as it is
    Unchanged,
    /// Non-blank translated lines matched the source line count
    Exact(Vec<String>),
    /// Reply was split on [`SEGMENT_DELIMITER`]
    Delimited(Vec<String>),
    /// Extra translated lines were dropped
    Truncated(Vec<String>),
    /// Everything was joined onto one line
    Collapsed(String),
}

impl Alignment {
    /// Text lines to substitute into the block, `None` for [`Alignment::Unchanged`]
    pub fn into_lines(self) -> Option<Vec<String>> {
        match self {
            Alignment::Unchanged => None,
            Alignment::Exact(lines) | Alignment::Delimited(lines) | Alignment::Truncated(lines) => {
                Some(lines)
            }
            Alignment::Collapsed(line) => Some(vec![line]),
        }
    }

    /// Short name of the policy step, used in logs
    pub fn strategy(&self) -> &'static str {
        match self {
            Alignment::Unchanged => "unchanged",
            Alignment::Exact(_) => "exact",
            Alignment::Delimited(_) => "delimited",
            Alignment::Truncated(_) => "truncated",
            Alignment::Collapsed(_) => "collapsed",
        }
    }
}

/// Reconcile a translated blob with a source of `line_count` text lines
pub fn align_text_lines(line_count: usize, translated: &str) -> Alignment {
    if line_count == 0 {
        return Alignment::Unchanged;
    }

    let candidates: Vec<&str> = translated
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    if candidates.len() == line_count {
        return Alignment::Exact(candidates.iter().map(|line| line.to_string()).collect());
    }

    if translated.contains(SEGMENT_DELIMITER) {
        let parts: Vec<String> = translated
            .split(SEGMENT_DELIMITER)
            .map(|part| part.trim().to_string())
            .collect();
        if parts.len() == line_count {
            return Alignment::Delimited(parts);
        }
        return Alignment::Collapsed(candidates.join(" "));
    }

    if candidates.len() >= line_count && line_count > 1 {
        return Alignment::Truncated(
            candidates[..line_count].iter().map(|line| line.to_string()).collect(),
        );
    }

    Alignment::Collapsed(candidates.join(" "))
}

/// Substitute a translated blob into a block, keeping its index and timing lines
pub fn align_block(original: &SubtitleBlock, translated: &str) -> SubtitleBlock {
    let line_count = original.text_line_count();
    let alignment = align_text_lines(line_count, translated);

    if !matches!(alignment, Alignment::Unchanged | Alignment::Exact(_)) {
        debug!(
            "Block {}: {} translated line(s) for {} source line(s), aligned as {}",
            original.index_line().unwrap_or("?"),
            translated.lines().filter(|line| !line.trim().is_empty()).count(),
            line_count,
            alignment.strategy()
        );
    }

    match alignment.into_lines() {
        Some(lines) => original.with_text_lines(lines),
        None => original.clone(),
    }
}
