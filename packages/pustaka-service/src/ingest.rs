//! Ingestion pipeline: curate, segment, enrich, stamp, then write to both
//! halves of the dual store.

use std::{fs, path::Path};

use time::OffsetDateTime;
use uuid::Uuid;
use walkdir::WalkDir;

use pustaka_chunking::segment;
use pustaka_domain::{ChunkMetadata, ProvenanceRecord};

use crate::{Result, Service};

const INGESTIBLE_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

/// Per-directory ingestion summary.
#[derive(Clone, Debug, Default)]
pub struct IngestReport {
	pub files: usize,
	pub chunks: usize,
	pub skipped: usize,
}

impl Service {
	/// Ingest raw text, optionally under curated provenance. Returns the
	/// vector ids of the chunks written to both stores.
	///
	/// Index writes abort the document; a metadata write that fails after
	/// its index write is a dual-store divergence and is logged with the
	/// orphaned vector id instead of aborting the rest of the document.
	pub async fn ingest_text(
		&self,
		text: &str,
		provenance: Option<&ProvenanceRecord>,
	) -> Result<Vec<String>> {
		let now = OffsetDateTime::now_utc();
		let chunks = segment(text, &self.chunking_config(), self.classifier.as_ref());
		let mut vector_ids = Vec::with_capacity(chunks.len());

		for chunk in chunks {
			let mut metadata = self.enricher.enrich(
				ChunkMetadata::default(),
				provenance,
				Some(&chunk.tags),
				Some(&chunk.text),
				now,
			);

			metadata.chunk_index = Some(chunk.chunk_index);

			self.tracker.stamp(&mut metadata, now);

			let vector_id = Uuid::new_v4().to_string();

			self.index.add(&vector_id, &chunk.text).await?;

			match self.store.add(&vector_id, &metadata).await {
				Ok(_) => vector_ids.push(vector_id),
				Err(err) => {
					// The vector exists without a metadata row; surface the
					// orphan id for reconciliation.
					tracing::error!(
						%vector_id,
						error = %err,
						"Metadata write failed after index write; stores diverged.",
					);
				},
			}
		}

		Ok(vector_ids)
	}

	/// Ingest a single file, deriving provenance from its path under the
	/// corpus root.
	pub async fn ingest_file(&self, path: &Path) -> Result<Vec<String>> {
		let text = fs::read_to_string(path)?;
		let provenance = self.curator.curate(path, Some(&text));

		tracing::info!(
			path = %path.display(),
			source_type = provenance.source_type.as_str(),
			"Ingesting file.",
		);

		self.ingest_text(&text, Some(&provenance)).await
	}

	/// Walk a directory and ingest every supported file. A failing file is
	/// logged and skipped; it never aborts the batch.
	pub async fn ingest_directory(&self, root: &Path) -> Result<IngestReport> {
		let mut report = IngestReport::default();

		for entry in WalkDir::new(root).into_iter().filter_map(|entry| entry.ok()) {
			if !entry.file_type().is_file() || !is_ingestible(entry.path()) {
				continue;
			}

			match self.ingest_file(entry.path()).await {
				Ok(vector_ids) => {
					report.files += 1;
					report.chunks += vector_ids.len();
				},
				Err(err) => {
					tracing::warn!(path = %entry.path().display(), error = %err, "Skipping file.");

					report.skipped += 1;
				},
			}
		}

		tracing::info!(
			files = report.files,
			chunks = report.chunks,
			skipped = report.skipped,
			"Directory ingestion finished.",
		);

		Ok(report)
	}
}

fn is_ingestible(path: &Path) -> bool {
	path.extension()
		.and_then(|extension| extension.to_str())
		.is_some_and(|extension| INGESTIBLE_EXTENSIONS.contains(&extension.to_lowercase().as_str()))
}
