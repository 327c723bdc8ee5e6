/*!
 * Tests for subtitle parsing and writing
 */

use srtlingo::subtitle_processor::{SubtitleBlock, parse_blocks, serialize_blocks};
use crate::common;

/// Test that a regular document parses into well-formed blocks
#[test]
fn test_parseBlocks_withSampleDocument_shouldFindThreeCues() {
    let blocks = parse_blocks(common::SAMPLE_SRT);

    assert_eq!(blocks.len(), 3);
    assert!(blocks.iter().all(SubtitleBlock::is_well_formed));
    assert_eq!(blocks[0].index_line(), Some("1"));
    assert_eq!(blocks[1].text_lines(), &["It contains".to_string(), "multiple lines.".to_string()]);
    assert_eq!(blocks[2].timing_line(), Some("00:00:10,000 --> 00:00:14,000"));
}

/// Test that malformed groups are kept as opaque blocks in their place
#[test]
fn test_parseBlocks_withMalformedGroups_shouldKeepThemOpaque() {
    let raw = "WEBVTT\n\n1\n00:00:01,000 --> 00:00:02,000\nHi\n\n7\n00:00:03,000 --> 00:00:04,000\n\nNOTE\nsome\nremark";
    let blocks = parse_blocks(raw);

    assert_eq!(blocks.len(), 4);
    assert!(!blocks[0].is_well_formed());
    assert!(blocks[1].is_well_formed());
    assert!(!blocks[2].is_well_formed(), "index and timing without text is opaque");
    assert!(!blocks[3].is_well_formed());
    assert_eq!(blocks[3].lines, vec!["NOTE", "some", "remark"]);
    assert_eq!(blocks[3].payload(), "");
}

/// Test that the writer never adds a trailing newline
#[test]
fn test_serializeBlocks_shouldJoinWithBlankLines() {
    let blocks = vec![
        SubtitleBlock::cue(1, "00:00:01,000 --> 00:00:02,000", &["A"]),
        SubtitleBlock::new(vec!["opaque".to_string()]),
        SubtitleBlock::cue(2, "00:00:03,000 --> 00:00:04,000", &["B", "C"]),
    ];

    assert_eq!(
        serialize_blocks(&blocks),
        "1\n00:00:01,000 --> 00:00:02,000\nA\n\nopaque\n\n2\n00:00:03,000 --> 00:00:04,000\nB\nC"
    );
    assert_eq!(serialize_blocks(&[]), "");
}

/// Test that parsing the writer's output gives the same blocks back
#[test]
fn test_parseBlocks_ofSerializedBlocks_shouldBeStable() {
    let raw = "\u{20}\n1\r\n00:00:01,000 --> 00:00:02,000\r\nA\r\n \r\n\r\n2\n00:00:03,000 --> 00:00:04,000\nB\n\n\n";
    let blocks = parse_blocks(raw);
    let written = serialize_blocks(&blocks);

    assert_eq!(parse_blocks(&written), blocks);
    assert!(!written.contains('\r'));
    assert!(!written.ends_with('\n'));
}

/// Test display formatting of a single block
#[test]
fn test_display_shouldPrintRawLines() {
    let block = SubtitleBlock::cue(5, "00:00:05,000 --> 00:00:06,000", &["Hello", "World"]);
    assert_eq!(block.to_string(), "5\n00:00:05,000 --> 00:00:06,000\nHello\nWorld");
}
