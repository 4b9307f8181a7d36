//! Chunk metadata model and the enrichment pass that merges curatorial,
//! discourse, and loader-supplied metadata into the stored shape.

use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
	Error, Language, Result,
	provenance::{AuthorityLevel, DEFAULT_INGEST_POLICY, EpistemicOrigin, ProvenanceRecord, SourceType},
};

const HIGH_SENSITIVITY_KEYWORDS: [&str; 9] = [
	"konflik",
	"kekerasan",
	"diskriminasi",
	"violence",
	"discrimination",
	"politik",
	"political",
	"kontroversial",
	"controversial",
];

const MEDIUM_SENSITIVITY_KEYWORDS: [&str; 5] = ["kritik", "debat", "critique", "debate", "polemik"];

/// Keyword hits required before a sensitivity tier applies.
const SENSITIVITY_THRESHOLD: usize = 2;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkRole {
	Argument,
	CounterArgument,
	Definition,
	Example,
	Narrative,
	Question,
	#[default]
	Unknown,
}
impl ChunkRole {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Argument => "argument",
			Self::CounterArgument => "counter_argument",
			Self::Definition => "definition",
			Self::Example => "example",
			Self::Narrative => "narrative",
			Self::Question => "question",
			Self::Unknown => "unknown",
		}
	}
}
impl FromStr for ChunkRole {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self> {
		match value {
			"argument" => Ok(Self::Argument),
			"counter_argument" => Ok(Self::CounterArgument),
			"definition" => Ok(Self::Definition),
			"example" => Ok(Self::Example),
			"narrative" => Ok(Self::Narrative),
			"question" => Ok(Self::Question),
			"unknown" => Ok(Self::Unknown),
			_ => Err(Error::UnknownVocabulary { field: "chunk_role", value: value.to_string() }),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoursePosition {
	Supportive,
	Critical,
	#[default]
	Neutral,
	Questioning,
}
impl DiscoursePosition {
	pub const ALL: [Self; 4] = [Self::Critical, Self::Supportive, Self::Neutral, Self::Questioning];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Supportive => "supportive",
			Self::Critical => "critical",
			Self::Neutral => "neutral",
			Self::Questioning => "questioning",
		}
	}
}
impl FromStr for DiscoursePosition {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self> {
		match value {
			"supportive" => Ok(Self::Supportive),
			"critical" => Ok(Self::Critical),
			"neutral" => Ok(Self::Neutral),
			"questioning" => Ok(Self::Questioning),
			_ => Err(Error::UnknownVocabulary {
				field: "discourse_position",
				value: value.to_string(),
			}),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
	#[default]
	Standard,
	Medium,
	High,
}
impl Sensitivity {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Standard => "standard",
			Self::Medium => "medium",
			Self::High => "high",
		}
	}
}
impl FromStr for Sensitivity {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self> {
		match value {
			"standard" => Ok(Self::Standard),
			"medium" => Ok(Self::Medium),
			"high" => Ok(Self::High),
			_ => Err(Error::UnknownVocabulary { field: "sensitivity", value: value.to_string() }),
		}
	}
}

/// Discourse tags attached to a chunk by the segmenter.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DiscourseTags {
	pub chunk_role: ChunkRole,
	pub discourse_position: DiscoursePosition,
	pub themes: Vec<String>,
	pub has_citation: bool,
}

/// The full metadata record carried by every retrievable chunk.
///
/// Closed-vocabulary fields are typed; anything outside the core schema
/// travels in [`extra`](Self::extra) and is persisted as text.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ChunkMetadata {
	pub title: String,
	pub source_type: SourceType,
	pub authority_level: AuthorityLevel,
	pub epistemic_origin: EpistemicOrigin,
	pub themes: Vec<String>,
	pub related_nodes: Vec<String>,
	pub discourse_position: DiscoursePosition,
	pub chunk_role: ChunkRole,
	pub language: Language,
	pub region: String,
	/// `None` means not yet assessed; enrichment always resolves it.
	pub sensitivity: Option<Sensitivity>,
	pub ingest_policy: String,
	pub has_citation: bool,
	pub folder_path: Option<String>,
	pub filename: Option<String>,
	pub chunk_index: Option<u32>,
	pub embedding_model: Option<String>,
	pub embedding_version: Option<String>,
	#[serde(with = "time::serde::rfc3339::option")]
	pub embedding_created_at: Option<OffsetDateTime>,
	#[serde(with = "time::serde::rfc3339::option")]
	pub ingested_at: Option<OffsetDateTime>,
	pub extra: BTreeMap<String, String>,
}
impl Default for ChunkMetadata {
	fn default() -> Self {
		Self {
			title: "Untitled".to_string(),
			source_type: SourceType::default(),
			authority_level: AuthorityLevel::default(),
			epistemic_origin: EpistemicOrigin::default(),
			themes: Vec::new(),
			related_nodes: Vec::new(),
			discourse_position: DiscoursePosition::default(),
			chunk_role: ChunkRole::default(),
			language: Language::default(),
			region: Language::default().region().to_string(),
			sensitivity: None,
			ingest_policy: DEFAULT_INGEST_POLICY.to_string(),
			has_citation: false,
			folder_path: None,
			filename: None,
			chunk_index: None,
			embedding_model: None,
			embedding_version: None,
			embedding_created_at: None,
			ingested_at: None,
			extra: BTreeMap::new(),
		}
	}
}
impl ChunkMetadata {
	/// Overlay curatorial provenance onto this record.
	pub fn apply_provenance(&mut self, record: &ProvenanceRecord) {
		self.title = record.title.clone();
		self.source_type = record.source_type;
		self.authority_level = record.authority_level;
		self.epistemic_origin = record.epistemic_origin;
		self.language = record.language;
		self.region = record.region.clone();
		self.ingest_policy = record.ingest_policy.clone();
		self.folder_path = Some(record.folder_path.clone());
		self.filename = Some(record.filename.clone());
	}

	/// Overlay discourse tags onto this record. Applied after provenance, so
	/// discourse wins on overlapping keys.
	pub fn apply_discourse(&mut self, tags: &DiscourseTags) {
		self.chunk_role = tags.chunk_role;
		self.discourse_position = tags.discourse_position;
		self.themes = tags.themes.clone();
		self.has_citation = tags.has_citation;
	}

	/// Merge a raw string field supplied by a caller (e.g. loader metadata).
	///
	/// Known closed-vocabulary keys are parsed and rejected wholesale on
	/// unknown values; known open fields are assigned; anything else lands in
	/// the [`extra`](Self::extra) map.
	pub fn merge_raw_field(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"source_type" => self.source_type = value.parse()?,
			"authority_level" => self.authority_level = value.parse()?,
			"epistemic_origin" => self.epistemic_origin = value.parse()?,
			"chunk_role" => self.chunk_role = value.parse()?,
			"discourse_position" => self.discourse_position = value.parse()?,
			"sensitivity" => self.sensitivity = Some(value.parse()?),
			"language" => {
				self.language = value.parse()?;
				self.region = self.language.region().to_string();
			},
			"title" => self.title = value.to_string(),
			"region" => self.region = value.to_string(),
			"ingest_policy" => self.ingest_policy = value.to_string(),
			"folder_path" => self.folder_path = Some(value.to_string()),
			"filename" => self.filename = Some(value.to_string()),
			"themes" => self.themes = decode_list(value),
			"related_nodes" => self.related_nodes = decode_list(value),
			_ => {
				self.extra.insert(key.to_string(), value.to_string());
			},
		}

		Ok(())
	}

	/// Append related node ids, skipping duplicates.
	pub fn add_relations(&mut self, ids: &[String]) {
		for id in ids {
			if !self.related_nodes.contains(id) {
				self.related_nodes.push(id.clone());
			}
		}
	}
}

/// Merges and normalizes metadata from all upstream pipeline stages.
///
/// Overlays apply in order base -> curatorial -> discourse. Missing fields
/// are back-filled with defaults; enrichment never fails by omission.
#[derive(Clone, Copy, Debug, Default)]
pub struct Enricher;
impl Enricher {
	pub fn enrich(
		&self,
		mut base: ChunkMetadata,
		curatorial: Option<&ProvenanceRecord>,
		discourse: Option<&DiscourseTags>,
		content: Option<&str>,
		now: OffsetDateTime,
	) -> ChunkMetadata {
		if let Some(record) = curatorial {
			base.apply_provenance(record);
		}
		if let Some(tags) = discourse {
			base.apply_discourse(tags);
		}
		if base.sensitivity.is_none() {
			base.sensitivity = Some(match content {
				Some(text) => self.infer_sensitivity(text),
				None => Sensitivity::Standard,
			});
		}
		if base.ingested_at.is_none() {
			base.ingested_at = Some(now);
		}

		base
	}

	/// Keyword-count heuristic: two or more high-sensitivity hits before two
	/// or more medium hits, else standard.
	pub fn infer_sensitivity(&self, content: &str) -> Sensitivity {
		let lowered = content.to_lowercase();
		let hits = |keywords: &[&str]| {
			keywords.iter().filter(|keyword| lowered.contains(*keyword)).count()
		};

		if hits(&HIGH_SENSITIVITY_KEYWORDS) >= SENSITIVITY_THRESHOLD {
			Sensitivity::High
		} else if hits(&MEDIUM_SENSITIVITY_KEYWORDS) >= SENSITIVITY_THRESHOLD {
			Sensitivity::Medium
		} else {
			Sensitivity::Standard
		}
	}
}

/// Serialize a list-valued field to its storage-safe string form.
pub fn encode_list(items: &[String]) -> String {
	serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Inverse of [`encode_list`]; malformed input decodes to an empty list.
pub fn decode_list(raw: &str) -> Vec<String> {
	serde_json::from_str(raw).unwrap_or_default()
}
