use std::fmt;

/// One recognized utterance and its translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSegment {
    pub source_text: String,
    pub translated_text: String,
}

impl TranslationSegment {
    pub fn new(source_text: impl Into<String>, translated_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            translated_text: translated_text.into(),
        }
    }
}

/// `translated (original: source)`, the form used in the write log.
impl fmt::Display for TranslationSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (original: {})", self.translated_text, self.source_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pairs_translation_with_transcript() {
        let segment = TranslationSegment::new("你好世界", "Hello world");
        assert_eq!(segment.to_string(), "Hello world (original: 你好世界)");
    }
}
