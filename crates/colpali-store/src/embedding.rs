//! Embedding generation.
//!
//! [`Embedder`] is the seam where a real ColPali model plugs in. The only
//! implementation shipped here is [`RandomEmbedder`], a stand-in that draws
//! independent uniform values in `[-0.5, 0.5)` and performs no semantic
//! computation.

use std::sync::Arc;

use rand::Rng;

use crate::types::Embedding;

/// Dimensionality of ColPali embeddings.
pub const EMBEDDING_DIMENSION: usize = 1024;

/// Number of characters of input shown in the generation log line.
const PREVIEW_CHARS: usize = 50;

/// Trait for text-to-vector embedding providers.
pub trait Embedder: Send + Sync {
    /// Embed a single text into a fixed-length vector.
    fn embed(&self, text: &str) -> Embedding;

    /// Length of every vector returned by [`embed`](Embedder::embed).
    fn dimension(&self) -> usize;

    /// Get the name of this embedder.
    fn name(&self) -> &str;
}

/// An embedder that can be shared across threads.
pub type SharedEmbedder = Arc<dyn Embedder>;

/// Placeholder embedder producing uniformly random, zero-centered vectors.
#[derive(Debug, Clone)]
pub struct RandomEmbedder {
    dimension: usize,
}

impl RandomEmbedder {
    /// Create an embedder producing [`EMBEDDING_DIMENSION`]-length vectors.
    pub fn new() -> Self {
        Self::with_dimension(EMBEDDING_DIMENSION)
    }

    /// Create an embedder for an index of a different size.
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Create a shared instance.
    pub fn shared() -> SharedEmbedder {
        Arc::new(Self::new())
    }
}

impl Default for RandomEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for RandomEmbedder {
    fn embed(&self, text: &str) -> Embedding {
        let mut rng = rand::rng();
        let embedding: Embedding = (0..self.dimension)
            .map(|_| rng.random_range(-0.5_f32..0.5_f32))
            .collect();

        tracing::debug!(
            embedder = self.name(),
            dimension = self.dimension,
            "Generated ColPali embedding for text: \"{}...\"",
            preview(text)
        );

        embedding
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Generate an embedding with the default [`RandomEmbedder`].
pub fn generate_embedding(text: &str) -> Embedding {
    RandomEmbedder::new().embed(text)
}

/// First [`PREVIEW_CHARS`] characters of `text`, split on a char boundary.
fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
