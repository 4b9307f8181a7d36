//! Discourse-aware segmentation: splits documents into size-bounded chunks
//! and tags each with an argumentative role, stance, themes, and citation
//! presence.

mod discourse;
mod segmenter;

pub use discourse::{DiscourseClassifier, LexiconClassifier};
pub use segmenter::{ChunkingConfig, split_recursive, split_semantic};

use pustaka_domain::DiscourseTags;

/// A segmented text unit with its discourse tags and position within the
/// parent document.
#[derive(Clone, Debug)]
pub struct DocumentChunk {
	pub chunk_index: u32,
	pub text: String,
	pub tags: DiscourseTags,
}

/// Segment a document and classify every resulting chunk.
pub fn segment(
	text: &str,
	cfg: &ChunkingConfig,
	classifier: &dyn DiscourseClassifier,
) -> Vec<DocumentChunk> {
	let chunks: Vec<DocumentChunk> = split_semantic(text, cfg)
		.into_iter()
		.enumerate()
		.map(|(index, chunk_text)| DocumentChunk {
			chunk_index: index as u32,
			tags: classifier.classify(&chunk_text),
			text: chunk_text,
		})
		.collect();

	tracing::debug!(chunks = chunks.len(), "Segmented document.");

	chunks
}
