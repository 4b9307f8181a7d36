//! Context assembly: an authority-ranked primary set, a per-source plural
//! supplement, and an epistemic summary of everything retrieved.

use std::collections::BTreeMap;

use pustaka_domain::SourceType;

use crate::{Result, RetrievalStrategy, ScoredChunk, Service};

#[derive(Clone, Debug)]
pub struct ContextBundle {
	/// Authority-ranked results.
	pub primary: Vec<ScoredChunk>,
	/// One chunk per curated source with hits. A chunk may appear here and
	/// in `primary`; both views are kept as retrieved.
	pub perspectives: BTreeMap<SourceType, Vec<ScoredChunk>>,
	pub summary: ContextSummary,
}

/// Epistemic profile of a retrieved set: who is speaking, from what
/// standing, in what stance, and how often each theme recurs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContextSummary {
	pub by_source_type: BTreeMap<String, usize>,
	pub by_authority_level: BTreeMap<String, usize>,
	pub by_discourse_position: BTreeMap<String, usize>,
	pub theme_counts: BTreeMap<String, usize>,
}
impl ContextSummary {
	pub fn of(chunks: &[&ScoredChunk]) -> Self {
		let mut summary = Self::default();

		for chunk in chunks {
			let metadata = &chunk.metadata;

			*summary.by_source_type.entry(metadata.source_type.as_str().to_string()).or_default() +=
				1;
			*summary
				.by_authority_level
				.entry(metadata.authority_level.as_str().to_string())
				.or_default() += 1;
			*summary
				.by_discourse_position
				.entry(metadata.discourse_position.as_str().to_string())
				.or_default() += 1;

			for theme in &metadata.themes {
				*summary.theme_counts.entry(theme.clone()).or_default() += 1;
			}
		}

		summary
	}
}

impl Service {
	/// Assemble a retrieval context for a query: `k` authority-ranked
	/// chunks, optionally supplemented with one chunk per curated source,
	/// and summarized over everything retrieved.
	pub async fn assemble_context(
		&self,
		query: &str,
		k: u32,
		boost_community: bool,
		include_perspectives: bool,
	) -> Result<ContextBundle> {
		let primary = self
			.retrieve(query, k, &RetrievalStrategy::AuthorityRanked { boost_community })
			.await?;
		let perspectives = if include_perspectives {
			self.retrieve_plural(query, 1).await?
		} else {
			BTreeMap::new()
		};
		let union: Vec<&ScoredChunk> =
			primary.iter().chain(perspectives.values().flatten()).collect();
		let summary = ContextSummary::of(&union);

		Ok(ContextBundle { primary, perspectives, summary })
	}
}
