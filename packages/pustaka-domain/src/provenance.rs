//! Curatorial classification of document provenance.
//!
//! The first path segment under the corpus root decides a document's source
//! type; a fixed table then assigns authority level and epistemic origin.

use std::{
	path::{Component, Path, PathBuf},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Language, language};

/// Default ingestion policy tag applied by the curator.
pub const DEFAULT_INGEST_POLICY: &str = "cultural";

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
	Community,
	Academic,
	Media,
	Archival,
	#[default]
	General,
}
impl SourceType {
	/// The curated source types, i.e. every variant with a dedicated corpus
	/// folder. `general` is the fallback for everything else.
	pub const CURATED: [Self; 4] = [Self::Community, Self::Academic, Self::Media, Self::Archival];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Community => "community",
			Self::Academic => "academic",
			Self::Media => "media",
			Self::Archival => "archival",
			Self::General => "general",
		}
	}

	/// Total mapping from source type to authority level. Unmapped source
	/// types (currently only `general`) default to situated authority; this
	/// is a reviewable policy choice favoring non-institutional knowledge
	/// when provenance is unknown.
	pub fn authority_level(self) -> AuthorityLevel {
		match self {
			Self::Community => AuthorityLevel::Situated,
			Self::Academic => AuthorityLevel::Academic,
			Self::Media => AuthorityLevel::Media,
			Self::Archival => AuthorityLevel::Archival,
			Self::General => AuthorityLevel::Situated,
		}
	}

	/// Total mapping from source type to epistemic origin; `general` defaults
	/// to local knowledge, matching [`Self::authority_level`].
	pub fn epistemic_origin(self) -> EpistemicOrigin {
		match self {
			Self::Community => EpistemicOrigin::CommunityArchive,
			Self::Academic => EpistemicOrigin::AcademicResearch,
			Self::Media => EpistemicOrigin::MediaDiscourse,
			Self::Archival => EpistemicOrigin::HistoricalArchive,
			Self::General => EpistemicOrigin::LocalKnowledge,
		}
	}
}
impl FromStr for SourceType {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value {
			"community" => Ok(Self::Community),
			"academic" => Ok(Self::Academic),
			"media" => Ok(Self::Media),
			"archival" => Ok(Self::Archival),
			"general" => Ok(Self::General),
			_ => Err(Error::UnknownVocabulary { field: "source_type", value: value.to_string() }),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityLevel {
	#[default]
	Situated,
	Academic,
	Institutional,
	Media,
	Archival,
}
impl AuthorityLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Situated => "situated",
			Self::Academic => "academic",
			Self::Institutional => "institutional",
			Self::Media => "media",
			Self::Archival => "archival",
		}
	}
}
impl FromStr for AuthorityLevel {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value {
			"situated" => Ok(Self::Situated),
			"academic" => Ok(Self::Academic),
			"institutional" => Ok(Self::Institutional),
			"media" => Ok(Self::Media),
			"archival" => Ok(Self::Archival),
			_ =>
				Err(Error::UnknownVocabulary { field: "authority_level", value: value.to_string() }),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpistemicOrigin {
	#[default]
	LocalKnowledge,
	CommunityArchive,
	AcademicResearch,
	InstitutionalRecord,
	MediaDiscourse,
	HistoricalArchive,
}
impl EpistemicOrigin {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::LocalKnowledge => "local_knowledge",
			Self::CommunityArchive => "community_archive",
			Self::AcademicResearch => "academic_research",
			Self::InstitutionalRecord => "institutional_record",
			Self::MediaDiscourse => "media_discourse",
			Self::HistoricalArchive => "historical_archive",
		}
	}
}
impl FromStr for EpistemicOrigin {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value {
			"local_knowledge" => Ok(Self::LocalKnowledge),
			"community_archive" => Ok(Self::CommunityArchive),
			"academic_research" => Ok(Self::AcademicResearch),
			"institutional_record" => Ok(Self::InstitutionalRecord),
			"media_discourse" => Ok(Self::MediaDiscourse),
			"historical_archive" => Ok(Self::HistoricalArchive),
			_ =>
				Err(Error::UnknownVocabulary { field: "epistemic_origin", value: value.to_string() }),
		}
	}
}

/// Provenance metadata derived by the curatorial classifier.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ProvenanceRecord {
	pub title: String,
	pub source_type: SourceType,
	pub authority_level: AuthorityLevel,
	pub epistemic_origin: EpistemicOrigin,
	pub language: Language,
	pub region: String,
	pub ingest_policy: String,
	pub folder_path: String,
	pub filename: String,
}

/// Classifies document provenance from storage paths and content samples.
///
/// Pure function of its inputs and the fixed tables above; malformed paths
/// yield `general` metadata instead of failing.
#[derive(Clone, Debug)]
pub struct Curator {
	corpus_root: PathBuf,
}
impl Curator {
	pub fn new(corpus_root: impl Into<PathBuf>) -> Self {
		Self { corpus_root: corpus_root.into() }
	}

	/// Source type from the first path segment under the corpus root.
	///
	/// Paths outside the root, or whose first segment is not in the curated
	/// table, classify as `general`. Legacy format-based layouts
	/// (`pdf/`, `text/`, `markdown/`) land there too.
	pub fn classify_source(&self, path: &Path) -> SourceType {
		let Ok(relative) = path.strip_prefix(&self.corpus_root) else {
			return SourceType::General;
		};

		let first = relative.components().find_map(|component| match component {
			Component::Normal(segment) => segment.to_str(),
			_ => None,
		});

		match first {
			Some(segment) =>
				SourceType::CURATED.into_iter().find(|s| s.as_str() == segment).unwrap_or_default(),
			None => SourceType::General,
		}
	}

	/// Derive full provenance for a document at `path`, optionally sampling
	/// `content` for language detection.
	pub fn curate(&self, path: &Path, content: Option<&str>) -> ProvenanceRecord {
		let source_type = self.classify_source(path);
		let language = content.map(language::detect).unwrap_or_default();
		let filename =
			path.file_name().and_then(|name| name.to_str()).unwrap_or_default().to_string();
		let title = path
			.file_stem()
			.and_then(|stem| stem.to_str())
			.map(str::to_string)
			.unwrap_or_else(|| "Untitled".to_string());

		ProvenanceRecord {
			title,
			source_type,
			authority_level: source_type.authority_level(),
			epistemic_origin: source_type.epistemic_origin(),
			language,
			region: language.region().to_string(),
			ingest_policy: DEFAULT_INGEST_POLICY.to_string(),
			folder_path: self.folder_path(path),
			filename,
		}
	}

	/// Parent folder relative to the corpus root, or the absolute parent for
	/// paths outside it.
	fn folder_path(&self, path: &Path) -> String {
		let relative = path.strip_prefix(&self.corpus_root).unwrap_or(path);

		relative.parent().map(|p| p.to_string_lossy().into_owned()).unwrap_or_default()
	}
}
