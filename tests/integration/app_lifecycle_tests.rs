/*!
 * Integration tests for the controller over real files
 */

use anyhow::Result;
use std::fs;
use std::sync::atomic::Ordering;

use srtlingo::app_controller::{FileOutcome, RunSummary};
use srtlingo::errors::{AppError, TranslationError};
use srtlingo::file_utils::FileManager;
use srtlingo::providers::mock::MockCapability;
use crate::common;

/// Test translating one file next to its input
#[tokio::test]
async fn test_translateFile_shouldWriteOutputNextToInput() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let mock = MockCapability::prefixing("FR: ");
    let controller = common::mock_controller(&mock);

    let outcome = controller.translate_file(&input, false).await?;

    let expected_output = temp_dir.path().join("movie_fr.srt");
    assert_eq!(
        outcome,
        FileOutcome::Translated {
            blocks: 3,
            untranslated: 0,
            output: expected_output.clone()
        }
    );
    let written = fs::read_to_string(&expected_output)?;
    assert!(written.contains("FR: This is a test subtitle."));
    assert!(written.contains("00:00:05,000 --> 00:00:09,000\nFR: It contains\nmultiple lines."));
    Ok(())
}

/// Test that an existing output is left alone unless forced
#[tokio::test]
async fn test_translateFile_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let existing = common::create_test_file(temp_dir.path(), "movie_fr.srt", "keep me")?;
    let mock = MockCapability::prefixing("FR: ");
    let controller = common::mock_controller(&mock);

    let skipped = controller.translate_file(&input, false).await?;
    assert_eq!(skipped, FileOutcome::Skipped { output: existing.clone() });
    assert_eq!(fs::read_to_string(&existing)?, "keep me");
    assert_eq!(mock.batch_calls(), 0);

    let forced = controller.translate_file(&input, true).await?;
    assert!(matches!(forced, FileOutcome::Translated { .. }));
    assert!(fs::read_to_string(&existing)?.starts_with("1\n"));
    Ok(())
}

/// Test that untranslatable blocks are counted but do not fail the document
#[tokio::test]
async fn test_translateFile_withFailingCapability_shouldStillWriteOriginalText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = common::mock_controller(&MockCapability::failing());

    let outcome = controller.translate_file(&input, false).await?;

    match outcome {
        FileOutcome::Translated { untranslated, output, .. } => {
            assert_eq!(untranslated, 3);
            assert_eq!(fs::read_to_string(output)?, common::SAMPLE_SRT.trim());
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    Ok(())
}

/// Test that one broken document does not stop the others
#[tokio::test]
async fn test_run_withMissingDocument_shouldContinueWithNext() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let first = common::create_test_subtitle(temp_dir.path(), "a.srt")?;
    let missing = temp_dir.path().join("gone.srt");
    let last = common::create_test_subtitle(temp_dir.path(), "c.srt")?;
    common::create_test_file(temp_dir.path(), "c_fr.srt", "done before")?;
    let controller = common::mock_controller(&MockCapability::identity());

    let summary = controller.run(&[first, missing, last], false).await;

    assert_eq!(
        summary,
        RunSummary { translated: 1, skipped: 1, failed: 1, cancelled: false }
    );
    assert!(!summary.is_success());
    assert!(temp_dir.path().join("a_fr.srt").exists());
    Ok(())
}

/// Test that a raised cancel flag stops the run before any document
#[tokio::test]
async fn test_run_withCancelledFlag_shouldSubmitNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let mock = MockCapability::identity();
    let controller = common::mock_controller(&mock);
    controller.cancel_flag().store(true, Ordering::SeqCst);

    let summary = controller.run(&[input], false).await;

    assert!(summary.cancelled);
    assert_eq!(summary.translated + summary.failed, 0);
    assert_eq!(mock.batch_calls(), 0);
    assert!(!temp_dir.path().join("movie_fr.srt").exists());
    Ok(())
}

/// Test that a cancelled document surfaces as a translation error
#[tokio::test]
async fn test_translateFile_withCancelledFlag_shouldFailWithoutWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = common::mock_controller(&MockCapability::identity());
    controller.cancel_flag().store(true, Ordering::SeqCst);

    let result = controller.translate_file(&input, false).await;

    assert!(matches!(
        result,
        Err(AppError::Translation(TranslationError::Cancelled { .. }))
    ));
    assert!(!FileManager::output_path(&input, "fr").exists());
    Ok(())
}

/// Test a directory run end to end
#[tokio::test]
async fn test_run_withExpandedDirectory_shouldTranslateEveryFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "s01/e01.srt")?;
    common::create_test_subtitle(temp_dir.path(), "s01/e02.srt")?;
    let mock = MockCapability::prefixing("fr ");
    let controller = common::mock_controller(&mock);

    let inputs = FileManager::expand_inputs(&[temp_dir.path()], "fr")?;
    let summary = controller.run(&inputs, false).await;

    assert_eq!(summary.translated, 2);
    assert!(summary.is_success());
    assert_eq!(mock.batch_calls(), 2);

    // A second pass over the directory ignores the new outputs and skips the inputs
    let inputs = FileManager::expand_inputs(&[temp_dir.path()], "fr")?;
    assert_eq!(inputs.len(), 2);
    let summary = controller.run(&inputs, false).await;
    assert_eq!(summary.skipped, 2);
    Ok(())
}
