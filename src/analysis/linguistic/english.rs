//! Bundled rule-based English model.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::linguistic::{Lexeme, LinguisticModel};
use crate::analysis::token_filter::{AlphabeticFilter, LemmaFilter, Lemmatizer, StopFilter};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::Result;

/// English annotation built from whitespace tokenization, the rule-based
/// lemmatizer and the default stop-word list.
///
/// ```
/// use tweet_sentiment::analysis::linguistic::{LinguisticModel, RuleBasedEnglish};
///
/// let model = RuleBasedEnglish::new();
/// let lexemes = model.annotate("she was loving 2 cats").unwrap();
///
/// assert_eq!(lexemes[1].lemma, "be");
/// assert!(lexemes[1].is_stop);
/// assert_eq!(lexemes[2].lemma, "love");
/// assert!(!lexemes[3].is_alpha);
/// assert_eq!(lexemes[4].lemma, "cat");
/// ```
pub struct RuleBasedEnglish {
    inner: PipelineAnalyzer,
    stop_words: StopFilter,
}

impl RuleBasedEnglish {
    pub fn new() -> Self {
        Self::with_parts(LemmaFilter::new(), StopFilter::new())
    }

    /// Build the model around a custom lemmatizer and stop-word set.
    pub fn with_lemmatizer(lemmatizer: Arc<dyn Lemmatizer>, stop_words: StopFilter) -> Self {
        Self::with_parts(LemmaFilter::with_lemmatizer(lemmatizer), stop_words)
    }

    fn with_parts(lemma_filter: LemmaFilter, stop_words: StopFilter) -> Self {
        // Non-alphabetic tokens are only marked so that they still show up
        // as lexemes; the lemma filter skips marked tokens.
        let inner = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(AlphabeticFilter::new().remove_stopped(false)))
            .add_filter(Arc::new(lemma_filter))
            .with_name("rule_based_english");

        RuleBasedEnglish { inner, stop_words }
    }
}

impl Default for RuleBasedEnglish {
    fn default() -> Self {
        Self::new()
    }
}

impl LinguisticModel for RuleBasedEnglish {
    fn annotate(&self, text: &str) -> Result<Vec<Lexeme>> {
        let lexemes = self
            .inner
            .analyze(text)?
            .map(|token| Lexeme {
                is_stop: self.stop_words.is_stop_token(&token),
                is_alpha: token.is_alpha(),
                text: token.original_text().to_string(),
                lemma: token.text,
            })
            .collect();

        Ok(lexemes)
    }

    fn name(&self) -> &'static str {
        "rule_based_english"
    }
}

impl Debug for RuleBasedEnglish {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleBasedEnglish")
            .field("inner", &self.inner)
            .field("stop_words", &self.stop_words.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token_filter::IdentityLemmatizer;

    #[test]
    fn test_annotate() {
        let model = RuleBasedEnglish::new();
        let lexemes = model.annotate("i love running 42").unwrap();

        assert_eq!(lexemes.len(), 4);
        assert_eq!(lexemes[0].text, "i");
        assert!(lexemes[0].is_stop);
        assert!(lexemes[1].is_content());
        assert_eq!(lexemes[2].text, "running");
        assert_eq!(lexemes[2].lemma, "run");
        assert!(!lexemes[3].is_alpha);
        assert_eq!(lexemes[3].lemma, "42");
    }

    #[test]
    fn test_lemma_stop_word_is_stop() {
        // "went" is not listed but its lemma "go" is.
        let model = RuleBasedEnglish::new();
        let lexemes = model.annotate("went").unwrap();

        assert_eq!(lexemes[0].lemma, "go");
        assert!(lexemes[0].is_stop);
    }

    #[test]
    fn test_empty_input() {
        let model = RuleBasedEnglish::new();
        assert!(model.annotate("").unwrap().is_empty());
        assert!(model.annotate("   ").unwrap().is_empty());
    }

    #[test]
    fn test_custom_lemmatizer() {
        let model = RuleBasedEnglish::with_lemmatizer(
            Arc::new(IdentityLemmatizer::new()),
            StopFilter::from_words(vec!["foo"]),
        );
        let lexemes = model.annotate("running foo").unwrap();

        assert_eq!(lexemes[0].lemma, "running");
        assert!(!lexemes[0].is_stop);
        assert!(lexemes[1].is_stop);
    }
}
