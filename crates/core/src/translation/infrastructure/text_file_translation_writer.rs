use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::translation::domain::translation_segment::TranslationSegment;
use crate::translation::domain::translation_writer::TranslationWriter;

/// Writes one translated utterance per line as UTF-8, each line
/// newline-terminated, without headers or source text.
pub struct TextFileTranslationWriter;

impl TranslationWriter for TextFileTranslationWriter {
    fn write_translations(
        &self,
        path: &Path,
        segments: &[TranslationSegment],
    ) -> Result<(), Box<dyn std::error::Error>> {
        log::info!(
            "Writing {} translation(s) to {}",
            segments.len(),
            path.display()
        );
        let mut out = BufWriter::new(File::create(path)?);
        for segment in segments {
            log::debug!("Writing translation: {segment}");
            writeln!(out, "{}", single_line(&segment.translated_text))?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Keep one utterance on one line.
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
