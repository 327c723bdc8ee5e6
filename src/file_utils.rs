use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @const: Extension of the documents we translate
const SUBTITLE_EXTENSION: &str = "srt";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a subtitle document, dropping undecodable bytes and a leading BOM
    pub fn read_document<P: AsRef<Path>>(path: P) -> Result<String> {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("{:?} is not valid UTF-8, dropping undecodable bytes", path.as_ref());
                let bytes = e.into_bytes();
                let mut text = String::with_capacity(bytes.len());
                for chunk in bytes.utf8_chunks() {
                    text.push_str(chunk.valid());
                }
                text
            }
        };

        if let Some(rest) = text.strip_prefix('\u{FEFF}') {
            return Ok(rest.to_string());
        }
        Ok(text)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    // @checks: Subtitle extension, case-insensitive
    pub fn is_subtitle_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SUBTITLE_EXTENSION))
    }

    /// Find subtitle files in a directory, recursively, sorted by path
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_subtitle_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    // @generates: Output path for translated subtitle, next to the input
    pub fn output_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());

        input_file.with_file_name(format!("{}_{}.{}", stem, target_language, SUBTITLE_EXTENSION))
    }

    // @checks: File name already carries the target language suffix
    pub fn is_translation_output<P: AsRef<Path>>(path: P, target_language: &str) -> bool {
        let suffix = format!("_{}", target_language.to_lowercase());
        path.as_ref()
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().to_lowercase().ends_with(&suffix))
    }

    /// Expand input paths into the list of documents to translate
    ///
    /// Directories are scanned recursively, plain files must carry the
    /// subtitle extension, and duplicates (by canonical path) are dropped.
    /// Files that already are translations into `target_language` are
    /// skipped when they come from a directory scan.
    pub fn expand_inputs<P: AsRef<Path>>(inputs: &[P], target_language: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut seen = HashSet::new();

        for input in inputs {
            let input = input.as_ref();

            let candidates = if input.is_dir() {
                Self::find_subtitle_files(input)?
                    .into_iter()
                    .filter(|path| {
                        let keep = !Self::is_translation_output(path, target_language);
                        if !keep {
                            debug!("Skipping existing translation {:?}", path);
                        }
                        keep
                    })
                    .collect()
            } else if input.is_file() && Self::is_subtitle_file(input) {
                vec![input.to_path_buf()]
            } else {
                warn!("Ignoring {:?}: not a subtitle file or directory", input);
                Vec::new()
            };

            for path in candidates {
                let key = path.canonicalize().unwrap_or_else(|_| path.clone());
                if seen.insert(key) {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }
}
