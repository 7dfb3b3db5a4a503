//! Storage abstraction layer.
//!
//! Fitted components are persisted as named blobs through the [`Storage`]
//! trait. Two backends are provided: [`FileStorage`] for a directory on disk
//! and [`MemoryStorage`] for tests and embedding. [`ArtifactStore`] layers the
//! artifact format on top of either.

pub mod artifact;
pub mod file;
pub mod memory;
pub mod traits;

pub use artifact::*;
pub use file::*;
pub use memory::*;
pub use traits::*;
