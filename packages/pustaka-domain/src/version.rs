//! Embedding model/version provenance.
//!
//! Every ingested chunk is stamped with the model and a calendar-window
//! version so multiple embedding generations can coexist in the store.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Language, metadata::ChunkMetadata};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EmbeddingVersion {
	pub model_name: String,
	pub version: String,
	pub language_scope: Vec<Language>,
	pub dimension: Option<u32>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl EmbeddingVersion {
	/// Compact `model:version` form, e.g. `nomic-embed-text:2026-08`.
	pub fn compact(&self) -> String {
		format!("{}:{}", self.model_name, self.version)
	}
}

/// Stamps chunks with embedding provenance for the current calendar window.
#[derive(Clone, Debug)]
pub struct VersionTracker {
	model_name: String,
	current: String,
}
impl VersionTracker {
	pub fn new(model_name: impl Into<String>) -> Self {
		Self::at(model_name, OffsetDateTime::now_utc())
	}

	/// Construct for an explicit point in time; the version window has
	/// year-month granularity.
	pub fn at(model_name: impl Into<String>, now: OffsetDateTime) -> Self {
		Self { model_name: model_name.into(), current: version_window(now) }
	}

	pub fn model_name(&self) -> &str {
		&self.model_name
	}

	pub fn current_window(&self) -> &str {
		&self.current
	}

	pub fn current_version(
		&self,
		language_scope: Option<Vec<Language>>,
		dimension: Option<u32>,
		now: OffsetDateTime,
	) -> EmbeddingVersion {
		EmbeddingVersion {
			model_name: self.model_name.clone(),
			version: self.current.clone(),
			language_scope: language_scope.unwrap_or_else(|| vec![Language::Id, Language::En]),
			dimension,
			created_at: now,
		}
	}

	/// Stamp a chunk with the current model/version window.
	pub fn stamp(&self, metadata: &mut ChunkMetadata, now: OffsetDateTime) {
		metadata.embedding_model = Some(self.model_name.clone());
		metadata.embedding_version = Some(self.current.clone());
		metadata.embedding_created_at = Some(now);
	}

	/// Whether two embedding versions may coexist in the same store.
	///
	/// Always true today; integrators wanting stricter rules (e.g. matching
	/// vector dimension) should extend this check.
	pub fn supports_coexistence(&self, _old: &EmbeddingVersion, _new: &EmbeddingVersion) -> bool {
		true
	}

	/// Recover the version record stamped on a chunk, if any.
	pub fn version_from_metadata(metadata: &ChunkMetadata) -> Option<EmbeddingVersion> {
		let model_name = metadata.embedding_model.clone()?;
		let version = metadata.embedding_version.clone()?;

		Some(EmbeddingVersion {
			model_name,
			version,
			language_scope: Vec::new(),
			dimension: None,
			created_at: metadata.embedding_created_at.unwrap_or(OffsetDateTime::UNIX_EPOCH),
		})
	}
}

fn version_window(now: OffsetDateTime) -> String {
	format!("{:04}-{:02}", now.year(), u8::from(now.month()))
}
