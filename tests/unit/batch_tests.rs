/*!
 * Tests for windowed batch translation and the recovery chain
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use srtlingo::errors::TranslationError;
use srtlingo::providers::mock::MockCapability;
use srtlingo::subtitle_processor::{SubtitleBlock, parse_blocks, serialize_blocks};
use srtlingo::translation::{BatchOptions, BatchTranslator, PayloadOutcome};
use crate::common;

const TIMING: &str = "00:00:01,000 --> 00:00:02,000";

fn translator(mock: &MockCapability, window_size: usize) -> BatchTranslator {
    BatchTranslator::new(Arc::new(mock.clone()), BatchOptions::unpaced(window_size))
}

/// Test that an identity capability leaves the document structurally identical
#[tokio::test]
async fn test_translateDocument_withIdentity_shouldKeepDocument() {
    common::init_logging();
    let mock = MockCapability::identity();
    let blocks = parse_blocks(common::SAMPLE_SRT);

    let translated = translator(&mock, 20).translate_document(&blocks).await.unwrap();

    assert_eq!(translated, blocks);
    assert_eq!(serialize_blocks(&translated), common::SAMPLE_SRT.trim());
    assert_eq!(mock.batch_calls(), 1);
}

/// Test the two-block scenario where the second reply comes back on one line
#[tokio::test]
async fn test_translateDocument_withReflowedReply_shouldCollapseSecondBlock() {
    let mock = MockCapability::identity().with_custom_reply(|text| text.replace('\n', " "));
    let blocks = vec![
        SubtitleBlock::cue(1, TIMING, &["Hello"]),
        SubtitleBlock::cue(2, TIMING, &["Good", "morning"]),
    ];

    let translated = translator(&mock, 20).translate_document(&blocks).await.unwrap();

    assert_eq!(translated[0], blocks[0]);
    assert_eq!(translated[1].lines, vec!["2", TIMING, "Good morning"]);
}

/// Test batch failure where the second single-item call fails too
#[tokio::test]
async fn test_translateDocument_withBatchAndItemFailure_shouldKeepOriginalForThatBlock() {
    let mock = MockCapability::prefixing("FR ")
        .failing_batch()
        .failing_on(&["Second"]);
    let blocks = vec![
        SubtitleBlock::cue(1, TIMING, &["First"]),
        SubtitleBlock::cue(2, TIMING, &["Second"]),
        SubtitleBlock::cue(3, TIMING, &["Third"]),
    ];

    let mut untranslated = 0;
    let translated = translator(&mock, 20)
        .translate_document_with_progress(&blocks, |p| untranslated += p.untranslated)
        .await
        .unwrap();

    assert_eq!(translated[0].text_lines(), &["FR First".to_string()]);
    assert_eq!(translated[1], blocks[1]);
    assert_eq!(translated[2].text_lines(), &["FR Third".to_string()]);
    assert_eq!(untranslated, 1);
    assert_eq!(mock.batch_calls(), 1);
    assert_eq!(mock.single_calls(), 3);
}

/// Test that opaque blocks are never sent and never changed
#[tokio::test]
async fn test_translateDocument_withOpaqueBlocks_shouldSendOnlyPayloads() {
    let mock = MockCapability::prefixing(">> ");
    let blocks = vec![
        SubtitleBlock::new(vec!["WEBVTT".into()]),
        SubtitleBlock::cue(1, TIMING, &["Hi"]),
        SubtitleBlock::new(vec!["1".into(), TIMING.into()]),
        SubtitleBlock::cue(2, TIMING, &["Bye"]),
    ];

    let translated = translator(&mock, 20).translate_document(&blocks).await.unwrap();

    assert_eq!(translated[0], blocks[0]);
    assert_eq!(translated[2], blocks[2]);
    assert_eq!(translated[1].text_lines(), &[">> Hi".to_string()]);
    assert_eq!(translated[3].text_lines(), &[">> Bye".to_string()]);
    assert_eq!(mock.batch_inputs(), vec![vec!["Hi".to_string(), "Bye".to_string()]]);
}

/// Test that a window made only of opaque blocks costs no call at all
#[tokio::test]
async fn test_translateDocument_withOpaqueOnlyWindow_shouldSkipBatchCall() {
    let mock = MockCapability::identity();
    let blocks = vec![
        SubtitleBlock::new(vec!["header".into()]),
        SubtitleBlock::new(vec!["still".into(), "header".into()]),
        SubtitleBlock::cue(1, TIMING, &["Text"]),
    ];

    translator(&mock, 2).translate_document(&blocks).await.unwrap();

    assert_eq!(mock.batch_calls(), 1);
    assert_eq!(mock.batch_inputs()[0], vec!["Text".to_string()]);
}

/// Test that multi-line payloads are sent with their line breaks
#[tokio::test]
async fn test_translateWindow_shouldJoinTextLinesWithNewline() {
    let mock = MockCapability::identity();
    let window = vec![SubtitleBlock::cue(1, TIMING, &["Good", "morning"])];

    let (blocks, outcomes) = translator(&mock, 20).translate_window(&window).await;

    assert_eq!(blocks, window);
    assert_eq!(outcomes, vec![PayloadOutcome::Translated("Good\nmorning".into())]);
}

/// Test that every capability failure still yields a complete document
#[tokio::test]
async fn test_translateDocument_withFailingCapability_shouldReturnOriginalDocument() {
    let mock = MockCapability::failing();
    let blocks = parse_blocks(common::SAMPLE_SRT);

    let translated = translator(&mock, 2).translate_document(&blocks).await.unwrap();

    assert_eq!(translated, blocks);
    assert_eq!(mock.batch_calls(), 2);
    assert_eq!(mock.single_calls(), 3);
}

/// Test that a flag raised mid-document stops before the next window
#[tokio::test]
async fn test_translateDocument_withFlagRaisedDuringRun_shouldCancel() {
    let mock = MockCapability::identity();
    let flag = Arc::new(AtomicBool::new(false));
    let blocks: Vec<SubtitleBlock> = (1..=6).map(|i| SubtitleBlock::cue(i, TIMING, &["x"])).collect();

    let raise = Arc::clone(&flag);
    let result = translator(&mock, 2)
        .with_cancel_flag(Arc::clone(&flag))
        .translate_document_with_progress(&blocks, |p| {
            if p.window_index == 0 {
                raise.store(true, Ordering::SeqCst);
            }
        })
        .await;

    assert!(matches!(
        result,
        Err(TranslationError::Cancelled { completed_windows: 1, total_windows: 3 })
    ));
    assert_eq!(mock.batch_calls(), 1);
}

/// Test that an empty document needs no call
#[tokio::test]
async fn test_translateDocument_withNoBlocks_shouldReturnEmpty() {
    let mock = MockCapability::identity();
    let translated = translator(&mock, 20).translate_document(&[]).await.unwrap();

    assert!(translated.is_empty());
    assert_eq!(mock.batch_calls(), 0);
}

/// Test that indented text survives an identity capability and a failed fallback alike
#[tokio::test]
async fn test_translateDocument_withIndentedText_shouldKeepBlocksIdentical() {
    let blocks = vec![
        SubtitleBlock::cue(1, TIMING, &["  - Hi", "  - Bye"]),
        SubtitleBlock::cue(2, TIMING, &["\tItalic aside"]),
    ];

    let identity = MockCapability::identity();
    let translated = translator(&identity, 20).translate_document(&blocks).await.unwrap();
    assert_eq!(translated, blocks);

    let failing = MockCapability::failing();
    let untouched = translator(&failing, 20).translate_document(&blocks).await.unwrap();
    assert_eq!(untouched, blocks);
}

fn paced(window_size: usize, window_pause_ms: u64, item_pause_ms: u64) -> BatchOptions {
    BatchOptions {
        window_size,
        window_pause: Duration::from_millis(window_pause_ms),
        item_pause: Duration::from_millis(item_pause_ms),
    }
}

/// Test that the window pause only runs between windows
#[tokio::test(start_paused = true)]
async fn test_translateDocument_withWindowPause_shouldPauseBetweenWindowsOnly() {
    let mock = MockCapability::identity();
    let translator = BatchTranslator::new(Arc::new(mock.clone()), paced(2, 200, 0));
    let blocks: Vec<SubtitleBlock> = (1..=6).map(|i| SubtitleBlock::cue(i, TIMING, &["x"])).collect();

    let start = tokio::time::Instant::now();
    translator.translate_document(&blocks).await.unwrap();
    let elapsed = start.elapsed();

    // Three windows, two pauses
    assert!(elapsed >= Duration::from_millis(400), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(600), "elapsed {:?}", elapsed);
    assert_eq!(mock.batch_calls(), 3);
}

/// Test that the item pause only runs between single-item fallback calls
#[tokio::test(start_paused = true)]
async fn test_recoverPayloads_withItemPause_shouldPauseBetweenFallbackCalls() {
    let mock = MockCapability::identity().failing_batch();
    let translator = BatchTranslator::new(Arc::new(mock.clone()), paced(20, 1000, 50));
    let payloads: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();

    let start = tokio::time::Instant::now();
    let outcomes = translator.recover_payloads(&payloads).await;
    let elapsed = start.elapsed();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(mock.single_calls(), 3);
    // Three calls, two pauses, and no window pause
    assert!(elapsed >= Duration::from_millis(100), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(150), "elapsed {:?}", elapsed);
}

/// Test that a working batch never waits on the item pause
#[tokio::test(start_paused = true)]
async fn test_recoverPayloads_withWorkingBatch_shouldNotPause() {
    let mock = MockCapability::identity();
    let translator = BatchTranslator::new(Arc::new(mock.clone()), paced(20, 1000, 50));

    let start = tokio::time::Instant::now();
    translator.recover_payloads(&["a".to_string(), "b".to_string()]).await;

    assert_eq!(start.elapsed(), Duration::ZERO);
}
