//! Social-media text normalizer.
//!
//! Cleans raw tweets with a fixed chain of char filters and reduces what is
//! left to content lemmas:
//!
//! 1. lower-case
//! 2. strip URLs (`scheme://...`, `http...`)
//! 3. strip `@mentions`
//! 4. strip `#` (the hashtag word stays)
//! 5. replace every other non-alphanumeric character with a space
//! 6. collapse whitespace
//! 7. annotate with a [`LinguisticModel`] and keep the lemmas of alphabetic,
//!    non-stop words
//!
//! The order matters: with punctuation replaced before URL stripping,
//! `http://x.co` would leak the tokens `x` and `co`.
//!
//! # Examples
//!
//! ```
//! use tweet_sentiment::analysis::analyzer::TweetNormalizer;
//!
//! let normalizer = TweetNormalizer::new().unwrap();
//! let tokens = normalizer.normalize("I LOVE this!!! #amazing http://x.co @bob").unwrap();
//!
//! assert_eq!(tokens, vec!["love", "amazing"]);
//! assert!(normalizer.normalize("").unwrap().is_empty());
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::{
    CollapseWhitespaceCharFilter, LowercaseCharFilter, PatternReplaceCharFilter,
};
use crate::analysis::linguistic::{LinguisticModel, RuleBasedEnglish};
use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::Result;

/// Deterministic, stateless text normalizer for short social-media posts.
#[derive(Clone)]
pub struct TweetNormalizer {
    /// Steps 1 to 6; only its char filters run, the model tokenizes.
    cleaner: PipelineAnalyzer,
    model: Arc<dyn LinguisticModel>,
}

impl TweetNormalizer {
    /// Create a normalizer backed by the bundled English model.
    pub fn new() -> Result<Self> {
        Self::with_model(Arc::new(RuleBasedEnglish::new()))
    }

    /// Create a normalizer backed by a custom linguistic model.
    pub fn with_model(model: Arc<dyn LinguisticModel>) -> Result<Self> {
        let cleaner = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::urls()?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::mentions()?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::hash_marks()?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::punctuation()?))
            .add_char_filter(Arc::new(CollapseWhitespaceCharFilter::new()))
            .with_name("tweet_cleaner");

        Ok(TweetNormalizer { cleaner, model })
    }

    /// The char-filter chain applied before annotation.
    pub fn cleaner(&self) -> &PipelineAnalyzer {
        &self.cleaner
    }

    /// The linguistic model used for lemmatization and stop-word tagging.
    pub fn model(&self) -> &Arc<dyn LinguisticModel> {
        &self.model
    }

    /// Apply steps 1 to 6 only.
    pub fn clean(&self, text: &str) -> String {
        self.cleaner.clean(text)
    }

    /// Normalize `text` into its ordered content lemmas.
    pub fn normalize(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }

    /// Normalize `text` and join the lemmas with single spaces.
    pub fn normalize_to_string(&self, text: &str) -> Result<String> {
        Ok(self.normalize(text)?.join(" "))
    }
}

impl Analyzer for TweetNormalizer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let cleaned = self.clean(text);
        let tokens: Vec<Token> = self
            .model
            .annotate(&cleaned)?
            .into_iter()
            .filter(|lexeme| lexeme.is_content())
            .enumerate()
            .map(|(position, lexeme)| {
                Token::new(lexeme.text, position)
                    .with_text(lexeme.lemma)
                    .with_token_type(TokenType::Alpha)
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        self.model.name()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Debug for TweetNormalizer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweetNormalizer")
            .field("cleaner", &self.cleaner)
            .field("model", &self.model.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::char_filter::CharFilter;

    fn normalizer() -> TweetNormalizer {
        TweetNormalizer::new().unwrap()
    }

    #[test]
    fn test_tweet_scenario() {
        let tokens = normalizer()
            .normalize("I LOVE this!!! #amazing http://x.co @bob")
            .unwrap();
        assert_eq!(tokens, vec!["love", "amazing"]);
    }

    #[test]
    fn test_empty_and_noise_only() {
        let n = normalizer();
        assert!(n.normalize("").unwrap().is_empty());
        assert!(n.normalize("!!! @someone https://t.co/xyz ...").unwrap().is_empty());
        assert_eq!(n.normalize_to_string("").unwrap(), "");
    }

    #[test]
    fn test_clean_steps() {
        let n = normalizer();
        assert_eq!(
            n.clean("  Check   THIS out: https://t.co/a1 via @news_bot #Win!  "),
            "check this out via win"
        );
    }

    #[test]
    fn test_clean_runs_cleaner_chain() {
        let n = normalizer();
        let cleaner = n.cleaner();
        let names: Vec<&str> = cleaner.char_filters().iter().map(|f| f.name()).collect();

        assert_eq!(names.len(), 6);
        assert_eq!(cleaner.pipeline_name(), "tweet_cleaner");
        let text = "RT @bob: LOVE it!!! #win http://x.co";
        assert_eq!(n.clean(text), cleaner.clean(text));
        assert_eq!(n.clean(text), "rt love it win");
    }

    #[test]
    fn test_order_preserved_and_lemmatized() {
        let tokens = normalizer()
            .normalize("Cats hated the rainy mornings, dogs were loving them")
            .unwrap();
        assert_eq!(tokens, vec!["cat", "hate", "rainy", "morning", "dog", "love"]);
    }

    #[test]
    fn test_numbers_and_mixed_tokens_dropped() {
        let tokens = normalizer().normalize("top 10 b2b deals 2day").unwrap();
        assert_eq!(tokens, vec!["deal"]);
    }

    #[test]
    fn test_contractions() {
        let tokens = normalizer()
            .normalize("I don't think it's bad, we'll see")
            .unwrap();
        assert_eq!(tokens, vec!["think", "bad"]);
    }

    #[test]
    fn test_idempotent() {
        let n = normalizer();
        let samples = [
            "I LOVE this!!! #amazing http://x.co @bob",
            "Worst. Flight. Ever. @airline lost my bags AGAIN",
            "so happy watching the games with friends :)",
            "Stopped by the café, tried the crêpes... meh",
            "RT @user: This is sooo goood!!! https://t.co/abc #blessed",
            "",
        ];

        for sample in samples {
            let once = n.normalize(sample).unwrap();
            let twice = n.normalize(&once.join(" ")).unwrap();
            assert_eq!(once, twice, "normalizing {sample:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let n = normalizer();
        let text = "Loving the new update, but the battery drains faster";
        assert_eq!(n.normalize(text).unwrap(), n.normalize(text).unwrap());
    }

    #[test]
    fn test_name_follows_model() {
        assert_eq!(normalizer().name(), "rule_based_english");
    }
}
