use std::path::Path;

use super::translation_segment::TranslationSegment;

/// Domain interface for persisting a finished translation.
pub trait TranslationWriter: Send {
    fn write_translations(
        &self,
        path: &Path,
        segments: &[TranslationSegment],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
