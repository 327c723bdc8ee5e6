/*!
 * Translation of subtitle documents through a translation capability.
 *
 * - `batch`: windowing, capability calls and the fallback chain
 * - `alignment`: fitting translated text back onto each block's lines
 */

// Re-export main types for easier usage
pub use self::alignment::{Alignment, align_block, align_text_lines};
pub use self::batch::{BatchOptions, BatchTranslator, PayloadOutcome, WindowProgress};

// Submodules
pub mod alignment;
pub mod batch;
