//! Lemmatizing token filter and lemmatizer implementations.

use std::sync::Arc;

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for lemmatization algorithms.
///
/// Implementations must be idempotent: `lemmatize(lemmatize(w)) ==
/// lemmatize(w)`. Normalized text is fed back through the same chain when a
/// model is trained on already-cleaned data, and a lemma that keeps shrinking
/// would change the features.
pub trait Lemmatizer: Send + Sync {
    /// Reduce a lower-cased word to its dictionary form.
    fn lemmatize(&self, word: &str) -> String;

    /// Get the name of this lemmatizer.
    fn name(&self) -> &'static str;
}

pub mod identity;
pub mod rule;

pub use identity::IdentityLemmatizer;
pub use rule::RuleLemmatizer;

/// Filter that replaces each token's text with its lemma.
///
/// Stopped tokens pass through untouched.
#[derive(Clone)]
pub struct LemmaFilter {
    lemmatizer: Arc<dyn Lemmatizer>,
}

impl std::fmt::Debug for LemmaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmaFilter")
            .field("lemmatizer", &self.lemmatizer.name())
            .finish()
    }
}

impl LemmaFilter {
    /// Create a new lemma filter with the rule-based English lemmatizer.
    pub fn new() -> Self {
        LemmaFilter {
            lemmatizer: Arc::new(RuleLemmatizer::new()),
        }
    }

    /// Create a lemma filter with a custom lemmatizer.
    pub fn with_lemmatizer(lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        LemmaFilter { lemmatizer }
    }

    /// The lemmatizer this filter applies.
    pub fn lemmatizer(&self) -> &Arc<dyn Lemmatizer> {
        &self.lemmatizer
    }
}

impl Default for LemmaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for LemmaFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    token
                } else {
                    let lemma = self.lemmatizer.lemmatize(&token.text);
                    token.with_text(lemma)
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lemma"
    }
}
