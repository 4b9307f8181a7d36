use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
	pub corpus: Corpus,
	pub chunking: Chunking,
	pub embedding: Embedding,
	pub storage: Storage,
	pub retrieval: Retrieval,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Corpus {
	/// Root of the knowledge base. The first path segment below this root
	/// decides a document's source type.
	pub root: PathBuf,
}
impl Default for Corpus {
	fn default() -> Self {
		Self { root: PathBuf::from("./knowledge_base") }
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Chunking {
	pub chunk_size: usize,
	pub chunk_overlap: usize,
}
impl Default for Chunking {
	fn default() -> Self {
		Self { chunk_size: 1_000, chunk_overlap: 200 }
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Embedding {
	pub model: String,
	pub dimension: u32,
	pub language_scope: Vec<String>,
}
impl Default for Embedding {
	fn default() -> Self {
		Self {
			model: "nomic-embed-text".to_string(),
			dimension: 768,
			language_scope: vec!["id".to_string(), "en".to_string()],
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Storage {
	pub sqlite: Sqlite,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Sqlite {
	pub path: String,
	pub pool_max_conns: u32,
}
impl Default for Sqlite {
	fn default() -> Self {
		Self { path: "./data/pustaka.db".to_string(), pool_max_conns: 4 }
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Retrieval {
	pub default_k: u32,
	/// Candidate multiplier for the metadata-filtering strategies
	/// (epistemic, discourse-balanced, theme-filtered).
	pub filter_oversample: u32,
	/// Candidate multiplier for authority-ranked retrieval.
	pub rank_oversample: u32,
	pub community_boost: f32,
	pub authority_weights: AuthorityWeights,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			default_k: 4,
			filter_oversample: 3,
			rank_oversample: 2,
			community_boost: 1.3,
			authority_weights: AuthorityWeights::default(),
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthorityWeights {
	pub situated: f32,
	pub academic: f32,
	pub media: f32,
	pub institutional: f32,
	pub archival: f32,
}
impl Default for AuthorityWeights {
	fn default() -> Self {
		Self { situated: 1.2, academic: 1.0, media: 0.9, institutional: 0.8, archival: 1.1 }
	}
}
