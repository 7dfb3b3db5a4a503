//! Feature extraction and classification.
//!
//! - [`tfidf`]: vocabulary learning and TF-IDF vectors
//! - [`logistic`]: multinomial logistic regression trained with L-BFGS
//! - [`label`]: class name to index mapping
//! - [`sparse`]: the sparse vector type shared by the above

pub mod label;
pub mod logistic;
pub mod sparse;
pub mod tfidf;

pub use label::LabelEncoder;
pub use logistic::{
    ClassWeight, ClassifierConfig, ConvergenceWarning, FitSummary, LogisticRegression,
};
pub use sparse::SparseVector;
pub use tfidf::{TfIdfVectorizer, VectorizerConfig, VectorizerState};
