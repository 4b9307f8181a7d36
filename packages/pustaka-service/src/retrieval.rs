//! Multi-strategy retrieval over the joined vector/metadata stores.
//!
//! Every strategy starts from an oversampled similarity search and then
//! filters, buckets, or re-ranks by metadata. Oversampling factors come
//! from configuration, not hard-coded multipliers.

use std::{cmp::Ordering, collections::BTreeMap};

use pustaka_config::AuthorityWeights;
use pustaka_domain::{AuthorityLevel, ChunkMetadata, DiscoursePosition, SourceType};
use pustaka_storage::MetadataFilter;

use crate::{Result, ScoredChunk, Service};

/// How a query's candidate pool is narrowed or re-ordered.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RetrievalStrategy {
	/// Pure similarity order, no metadata involvement.
	#[default]
	Standard,
	/// Conjunctive metadata filter over an oversampled pool.
	EpistemicFiltered(MetadataFilter),
	/// A few results from each curated source type, omitting empty sources.
	PluralPerspectives,
	/// Similarity re-weighted by authority level, optionally boosting
	/// situated knowledge.
	AuthorityRanked { boost_community: bool },
	/// At most a quarter of `k` per discourse stance bucket.
	DiscourseBalanced,
	/// Only chunks carrying every requested theme.
	ThemeFiltered(Vec<String>),
}
impl RetrievalStrategy {
	/// Resolve a strategy name; unrecognized names degrade to standard
	/// retrieval rather than failing the query.
	pub fn from_name(name: &str) -> Self {
		match name {
			"standard" => Self::Standard,
			"epistemic_filtered" => Self::EpistemicFiltered(MetadataFilter::default()),
			"plural_perspectives" => Self::PluralPerspectives,
			"authority_ranked" => Self::AuthorityRanked { boost_community: false },
			"discourse_balanced" => Self::DiscourseBalanced,
			"theme_filtered" => Self::ThemeFiltered(Vec::new()),
			_ => {
				tracing::warn!(name, "Unknown retrieval strategy; falling back to standard.");

				Self::Standard
			},
		}
	}
}

impl Service {
	/// Run a query under the given strategy.
	pub async fn retrieve(
		&self,
		query: &str,
		k: u32,
		strategy: &RetrievalStrategy,
	) -> Result<Vec<ScoredChunk>> {
		match strategy {
			RetrievalStrategy::Standard => self.search_scored(query, k).await,
			RetrievalStrategy::EpistemicFiltered(filter) =>
				self.epistemic_filtered(query, k, filter).await,
			RetrievalStrategy::PluralPerspectives => {
				let per_source = (k / SourceType::CURATED.len() as u32).max(1);
				let by_source = self.retrieve_plural(query, per_source).await?;

				Ok(by_source.into_values().flatten().collect())
			},
			RetrievalStrategy::AuthorityRanked { boost_community } =>
				self.authority_ranked(query, k, *boost_community).await,
			RetrievalStrategy::DiscourseBalanced => self.discourse_balanced(query, k).await,
			RetrievalStrategy::ThemeFiltered(themes) => {
				let filter = MetadataFilter { themes: themes.clone(), ..Default::default() };

				self.epistemic_filtered(query, k, &filter).await
			},
		}
	}

	/// One independent filtered retrieval per curated source type,
	/// requesting `k_per_source` chunks from each. Sources with no hits are
	/// omitted from the map.
	pub async fn retrieve_plural(
		&self,
		query: &str,
		k_per_source: u32,
	) -> Result<BTreeMap<SourceType, Vec<ScoredChunk>>> {
		let mut by_source = BTreeMap::new();

		for source in SourceType::CURATED {
			let filter = MetadataFilter { source_type: Some(source), ..Default::default() };
			let chunks = self.epistemic_filtered(query, k_per_source, &filter).await?;

			if !chunks.is_empty() {
				by_source.insert(source, chunks);
			}
		}

		Ok(by_source)
	}

	/// [`retrieve`](Self::retrieve) with the configured default result count.
	pub async fn retrieve_default(
		&self,
		query: &str,
		strategy: &RetrievalStrategy,
	) -> Result<Vec<ScoredChunk>> {
		self.retrieve(query, self.cfg.retrieval.default_k, strategy).await
	}

	/// Metadata-only lookup, bypassing the vector index entirely.
	pub async fn filter_documents(
		&self,
		filter: &MetadataFilter,
		limit: u32,
	) -> Result<Vec<String>> {
		Ok(self.store.query(filter, limit).await?)
	}

	/// Similarity search joined against the metadata store. A hit whose
	/// metadata row is missing is a dual-store divergence; it is logged and
	/// dropped from the results.
	pub(crate) async fn search_scored(&self, query: &str, k: u32) -> Result<Vec<ScoredChunk>> {
		let hits = self.index.search(query, k).await?;
		let mut scored = Vec::with_capacity(hits.len());

		for hit in hits {
			match self.store.get(&hit.vector_id).await? {
				Some(metadata) =>
					scored.push(ScoredChunk { vector_id: hit.vector_id, score: hit.score, metadata }),
				None => tracing::error!(
					vector_id = %hit.vector_id,
					"Similarity hit has no metadata row; stores diverged.",
				),
			}
		}

		Ok(scored)
	}

	async fn epistemic_filtered(
		&self,
		query: &str,
		k: u32,
		filter: &MetadataFilter,
	) -> Result<Vec<ScoredChunk>> {
		let pool =
			self.search_scored(query, k * self.cfg.retrieval.filter_oversample).await?;
		let mut matched: Vec<ScoredChunk> =
			pool.into_iter().filter(|chunk| matches_filter(filter, &chunk.metadata)).collect();

		matched.truncate(k as usize);

		Ok(matched)
	}

	async fn authority_ranked(
		&self,
		query: &str,
		k: u32,
		boost_community: bool,
	) -> Result<Vec<ScoredChunk>> {
		let mut pool =
			self.search_scored(query, k * self.cfg.retrieval.rank_oversample).await?;

		for chunk in &mut pool {
			let mut weight =
				authority_weight(&self.cfg.retrieval.authority_weights, chunk.metadata.authority_level);

			if boost_community && chunk.metadata.authority_level == AuthorityLevel::Situated {
				weight *= self.cfg.retrieval.community_boost;
			}

			chunk.score *= weight;
		}

		// Stable sort keeps similarity order among equal adjusted scores.
		pool.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
		pool.truncate(k as usize);

		Ok(pool)
	}

	async fn discourse_balanced(&self, query: &str, k: u32) -> Result<Vec<ScoredChunk>> {
		let pool =
			self.search_scored(query, k * self.cfg.retrieval.filter_oversample).await?;
		let per_bucket = (k as usize / DiscoursePosition::ALL.len()).max(1);
		let mut results = Vec::new();

		for position in DiscoursePosition::ALL {
			results.extend(
				pool.iter()
					.filter(|chunk| chunk.metadata.discourse_position == position)
					.take(per_bucket)
					.cloned(),
			);
		}

		results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
		results.truncate(k as usize);

		Ok(results)
	}
}

pub(crate) fn matches_filter(filter: &MetadataFilter, metadata: &ChunkMetadata) -> bool {
	filter.source_type.is_none_or(|value| metadata.source_type == value)
		&& filter.authority_level.is_none_or(|value| metadata.authority_level == value)
		&& filter.epistemic_origin.is_none_or(|value| metadata.epistemic_origin == value)
		&& filter.language.is_none_or(|value| metadata.language == value)
		&& filter.themes.iter().all(|theme| metadata.themes.contains(theme))
}

fn authority_weight(weights: &AuthorityWeights, level: AuthorityLevel) -> f32 {
	match level {
		AuthorityLevel::Situated => weights.situated,
		AuthorityLevel::Academic => weights.academic,
		AuthorityLevel::Institutional => weights.institutional,
		AuthorityLevel::Media => weights.media,
		AuthorityLevel::Archival => weights.archival,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_strategy_name_falls_back_to_standard() {
		assert_eq!(RetrievalStrategy::from_name("semantic_web"), RetrievalStrategy::Standard);
		assert_eq!(
			RetrievalStrategy::from_name("discourse_balanced"),
			RetrievalStrategy::DiscourseBalanced,
		);
	}

	#[test]
	fn theme_filter_requires_every_theme() {
		let filter = MetadataFilter {
			themes: vec!["culture".to_string(), "language".to_string()],
			..Default::default()
		};
		let mut metadata = ChunkMetadata { themes: vec!["culture".to_string()], ..Default::default() };

		assert!(!matches_filter(&filter, &metadata));

		metadata.themes.push("language".to_string());

		assert!(matches_filter(&filter, &metadata));
	}
}
