/*!
 * Tests for the line alignment cascade
 */

use srtlingo::subtitle_processor::SubtitleBlock;
use srtlingo::translation::alignment::SEGMENT_DELIMITER;
use srtlingo::translation::{Alignment, align_block, align_text_lines};

const TIMING: &str = "00:00:01,000 --> 00:00:02,000";

/// Test the single-line source with a single-line reply
#[test]
fn test_align_withSingleLine_shouldBeExact() {
    assert_eq!(align_text_lines(1, "Salut"), Alignment::Exact(vec!["Salut".into()]));
}

/// Test that blank lines in the reply never count as candidates
#[test]
fn test_align_withBlankLinesInReply_shouldIgnoreThem() {
    let alignment = align_text_lines(3, "\n a \n\n b\n\t\nc \n");
    assert_eq!(
        alignment,
        Alignment::Exact(vec![" a ".into(), " b".into(), "c ".into()])
    );
}

/// Test the delimiter step on a reply that came back on one line
#[test]
fn test_align_withDelimitedSingleLineReply_shouldSplit() {
    let reply = format!("Bonjour {} tout le monde", SEGMENT_DELIMITER);
    let alignment = align_text_lines(2, &reply);

    assert_eq!(alignment.strategy(), "delimited");
    assert_eq!(
        alignment.into_lines(),
        Some(vec!["Bonjour".to_string(), "tout le monde".to_string()])
    );
}

/// Test that the exact step wins over the delimiter step
#[test]
fn test_align_withDelimiterAndMatchingLines_shouldPreferExact() {
    let alignment = align_text_lines(2, "a|||b\nc");
    assert_eq!(alignment, Alignment::Exact(vec!["a|||b".into(), "c".into()]));
}

/// Test collapsing when the reply is shorter than the source
#[test]
fn test_align_withShortReply_shouldCollapse() {
    let alignment = align_text_lines(3, "one\ntwo");
    assert_eq!(alignment, Alignment::Collapsed("one two".into()));
}

/// Test that a block without text lines is left as it is
#[test]
fn test_alignBlock_withNoTextLines_shouldReturnOriginal() {
    let block = SubtitleBlock::new(vec!["1".into(), TIMING.into()]);
    assert_eq!(align_block(&block, "whatever"), block);
}

/// Test that alignment never touches the index or timing lines
#[test]
fn test_alignBlock_shouldPreserveHeaderLines() {
    let block = SubtitleBlock::cue(42, TIMING, &["a", "b", "c"]);

    for reply in ["x\ny\nz", "x|||y|||z", "x\ny\nz\nw", "x y"] {
        let aligned = align_block(&block, reply);
        assert_eq!(aligned.index_line(), Some("42"));
        assert_eq!(aligned.timing_line(), Some(TIMING));
    }
}
