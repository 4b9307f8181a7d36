pub mod language;
pub mod metadata;
pub mod provenance;
pub mod version;

pub use language::Language;
pub use metadata::{
	ChunkMetadata, ChunkRole, DiscoursePosition, DiscourseTags, Enricher, Sensitivity,
	decode_list, encode_list,
};
pub use provenance::{AuthorityLevel, Curator, EpistemicOrigin, ProvenanceRecord, SourceType};
pub use version::{EmbeddingVersion, VersionTracker};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Unknown {field} value: {value:?}.")]
	UnknownVocabulary { field: &'static str, value: String },
}
