//! Linguistic annotation of cleaned text.
//!
//! A [`LinguisticModel`] splits already-cleaned text into [`Lexeme`]s and
//! tells, for each one, its lemma, whether it is purely alphabetic and whether
//! it is a stop word. The normalizer only relies on this narrow interface, so
//! the bundled [`RuleBasedEnglish`] model can be replaced by any other engine
//! (a statistical tagger, a dictionary lookup) without touching the rest of
//! the pipeline.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod english;

pub use english::RuleBasedEnglish;

/// One annotated word.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexeme {
    /// The surface form as it appeared in the input.
    pub text: String,
    /// The dictionary form.
    pub lemma: String,
    /// Whether every character of the surface form is alphabetic.
    pub is_alpha: bool,
    /// Whether the surface form or the lemma is a stop word.
    pub is_stop: bool,
}

impl Lexeme {
    /// Whether this lexeme contributes a feature: alphabetic and not a stop word.
    pub fn is_content(&self) -> bool {
        self.is_alpha && !self.is_stop
    }
}

/// Tokenization plus lemmatization and stop-word tagging.
pub trait LinguisticModel: Send + Sync {
    /// Annotate every whitespace-separated word of `text`, in order.
    fn annotate(&self, text: &str) -> Result<Vec<Lexeme>>;

    /// Stable identifier of this model, persisted with fitted vocabularies.
    fn name(&self) -> &'static str;
}
