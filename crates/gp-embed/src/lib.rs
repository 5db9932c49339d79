//! Embedding/similarity capability for greenprompt.
//!
//! The pipeline depends only on the [`Embedder`] trait, never on a concrete
//! model. The shipped provider is a deterministic hashed bag-of-words
//! embedder; real model backends implement the same trait.

pub mod distance;
pub mod error;
pub mod hash;
pub mod traits;

pub use error::{EmbedError, Result};
pub use hash::HashEmbedder;
pub use traits::{Embedder, FailingEmbedder};
