mod error;
mod types;

pub use error::{Error, Result};
pub use types::{AuthorityWeights, Chunking, Config, Corpus, Embedding, Retrieval, Sqlite, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.chunking.chunk_size == 0 {
		return Err(Error::Validation {
			message: "chunking.chunk_size must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.chunk_overlap >= cfg.chunking.chunk_size {
		return Err(Error::Validation {
			message: "chunking.chunk_overlap must be less than chunking.chunk_size.".to_string(),
		});
	}
	if cfg.embedding.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "embedding.model must be non-empty.".to_string(),
		});
	}
	if cfg.embedding.dimension == 0 {
		return Err(Error::Validation {
			message: "embedding.dimension must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.sqlite.path.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.sqlite.path must be non-empty.".to_string(),
		});
	}
	if cfg.storage.sqlite.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.sqlite.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.default_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.default_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.filter_oversample == 0 {
		return Err(Error::Validation {
			message: "retrieval.filter_oversample must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.rank_oversample == 0 {
		return Err(Error::Validation {
			message: "retrieval.rank_oversample must be greater than zero.".to_string(),
		});
	}
	if !cfg.retrieval.community_boost.is_finite() || cfg.retrieval.community_boost <= 0.0 {
		return Err(Error::Validation {
			message: "retrieval.community_boost must be a positive finite number.".to_string(),
		});
	}

	let weights = &cfg.retrieval.authority_weights;

	for (label, weight) in [
		("situated", weights.situated),
		("academic", weights.academic),
		("media", weights.media),
		("institutional", weights.institutional),
		("archival", weights.archival),
	] {
		if !weight.is_finite() || weight <= 0.0 {
			return Err(Error::Validation {
				message: format!(
					"retrieval.authority_weights.{label} must be a positive finite number."
				),
			});
		}
	}

	Ok(())
}
