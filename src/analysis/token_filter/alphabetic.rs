//! Alphabetic token filter.

use super::Filter;
use crate::analysis::token::{TokenStream, TokenType};
use crate::error::Result;

/// A filter that classifies every token with a [`TokenType`] and stops the
/// ones that are not purely alphabetic.
///
/// Like [`StopFilter`](super::StopFilter), it can drop the offending tokens or
/// only mark them, so that a later stage can still inspect them.
#[derive(Clone, Debug)]
pub struct AlphabeticFilter {
    remove_stopped: bool,
}

impl AlphabeticFilter {
    /// Create a filter that removes non-alphabetic tokens.
    pub fn new() -> Self {
        AlphabeticFilter {
            remove_stopped: true,
        }
    }

    /// Set whether to remove non-alphabetic tokens or just mark them as stopped.
    pub fn remove_stopped(mut self, remove: bool) -> Self {
        self.remove_stopped = remove;
        self
    }
}

impl Default for AlphabeticFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for AlphabeticFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let remove = self.remove_stopped;
        let filtered: Vec<_> = tokens
            .filter_map(|token| {
                let token_type = TokenType::detect(&token.text);
                let token = token.with_token_type(token_type);
                match (token_type == TokenType::Alpha, remove) {
                    (true, _) => Some(token),
                    (false, true) => None,
                    (false, false) => Some(token.stop()),
                }
            })
            .collect();

        Ok(Box::new(filtered.into_iter()))
    }

    fn name(&self) -> &'static str {
        "alphabetic"
    }
}
