//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows from the tokenizer through the token
//! filters. Filters either rewrite a token's text (lemmatization), classify it
//! ([`TokenType`]) or mark it as stopped so that later stages can drop it.
//!
//! # Examples
//!
//! ```
//! use tweet_sentiment::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("loving", 0, 0, 6).with_token_type(TokenType::Alpha);
//! let lemma = token.clone().with_text("love");
//!
//! assert_eq!(lemma.text, "love");
//! assert_eq!(lemma.original_text(), "loving");
//! assert!(lemma.is_alpha());
//! ```

use serde::{Deserialize, Serialize};

/// A single analyzed token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The current text of the token (after any rewriting filters).
    pub text: String,

    /// The position of the token in the token stream (0-based).
    pub position: usize,

    /// The byte offset where this token starts in the tokenized text.
    pub start_offset: usize,

    /// The byte offset where this token ends in the tokenized text.
    pub end_offset: usize,

    /// Whether this token has been marked as stopped by a filter.
    pub stopped: bool,

    /// Content classification, if a filter assigned one.
    pub token_type: Option<TokenType>,

    /// The surface form before the first rewrite, if the text was rewritten.
    pub original_text: Option<String>,
}

/// Classification of token content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Purely alphabetic text.
    Alpha,
    /// Purely numeric text.
    Num,
    /// Mixed letters and digits.
    Alphanum,
    /// Anything else.
    Other,
}

impl TokenType {
    /// Classify a word by its characters.
    pub fn detect(word: &str) -> TokenType {
        if word.is_empty() {
            TokenType::Other
        } else if word.chars().all(char::is_alphabetic) {
            TokenType::Alpha
        } else if word.chars().all(char::is_numeric) {
            TokenType::Num
        } else if word.chars().all(char::is_alphanumeric) {
            TokenType::Alphanum
        } else {
            TokenType::Other
        }
    }
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            stopped: false,
            token_type: None,
            original_text: None,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            start_offset,
            end_offset,
            ..Token::new(text, position)
        }
    }

    /// Replace the token text, remembering the first surface form.
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        let text = text.into();
        if text != self.text && self.original_text.is_none() {
            self.original_text = Some(std::mem::take(&mut self.text));
        }
        self.text = text;
        self
    }

    /// Set the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = Some(token_type);
        self
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check if this token is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether the token was classified as purely alphabetic.
    pub fn is_alpha(&self) -> bool {
        self.token_type == Some(TokenType::Alpha)
    }

    /// The surface form of the token before any rewriting filter ran.
    pub fn original_text(&self) -> &str {
        self.original_text.as_deref().unwrap_or(&self.text)
    }

    /// Get the length of the token text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A stream of tokens produced by tokenizers and transformed by filters.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;
