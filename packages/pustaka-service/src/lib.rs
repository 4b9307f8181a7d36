//! Retrieval engine over the dual storage system.
//!
//! The similarity primitive is injected behind [`VectorIndex`]; this crate
//! owns everything downstream of it: ingestion, metadata join, strategy
//! dispatch, and context assembly.

pub mod context;
pub mod ingest;
pub mod retrieval;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

pub use context::{ContextBundle, ContextSummary};
pub use error::Error;
pub use ingest::IngestReport;
pub use retrieval::RetrievalStrategy;

use pustaka_chunking::{ChunkingConfig, DiscourseClassifier, LexiconClassifier};
use pustaka_config::Config;
use pustaka_domain::{ChunkMetadata, Curator, Enricher, VersionTracker};
use pustaka_storage::KnowledgeStore;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A similarity hit from the vector index, before the metadata join.
#[derive(Clone, Debug)]
pub struct VectorHit {
	pub vector_id: String,
	pub score: f32,
}

/// A retrieval result: a stored chunk with its similarity (or adjusted)
/// score and full metadata.
#[derive(Clone, Debug)]
pub struct ScoredChunk {
	pub vector_id: String,
	pub score: f32,
	pub metadata: ChunkMetadata,
}

/// The injected similarity side of the dual storage system.
///
/// Implementations own embedding and nearest-neighbor search; the engine
/// only assigns ids and consumes ranked hits.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn add<'a>(&'a self, vector_id: &'a str, text: &'a str) -> BoxFuture<'a, Result<()>>;

	fn search<'a>(&'a self, query: &'a str, k: u32) -> BoxFuture<'a, Result<Vec<VectorHit>>>;
}

pub struct Service {
	pub cfg: Config,
	pub store: KnowledgeStore,
	pub index: Arc<dyn VectorIndex>,
	curator: Curator,
	classifier: Arc<dyn DiscourseClassifier>,
	enricher: Enricher,
	tracker: VersionTracker,
}
impl Service {
	pub fn new(cfg: Config, store: KnowledgeStore, index: Arc<dyn VectorIndex>) -> Self {
		Self::with_classifier(cfg, store, index, Arc::new(LexiconClassifier::new()))
	}

	/// Construct with a caller-supplied discourse classifier, e.g. a lexicon
	/// tuned for another language community.
	pub fn with_classifier(
		cfg: Config,
		store: KnowledgeStore,
		index: Arc<dyn VectorIndex>,
		classifier: Arc<dyn DiscourseClassifier>,
	) -> Self {
		let curator = Curator::new(cfg.corpus.root.as_path());
		let tracker = VersionTracker::new(&cfg.embedding.model);

		Self { cfg, store, index, curator, classifier, enricher: Enricher, tracker }
	}

	/// Corpus statistics from the metadata store.
	pub async fn stats(&self) -> Result<pustaka_storage::StoreStats> {
		Ok(self.store.stats().await?)
	}

	pub(crate) fn chunking_config(&self) -> ChunkingConfig {
		ChunkingConfig {
			chunk_size: self.cfg.chunking.chunk_size,
			chunk_overlap: self.cfg.chunking.chunk_overlap,
		}
	}
}
