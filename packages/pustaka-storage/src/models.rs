use time::OffsetDateTime;

#[derive(Debug, sqlx::FromRow)]
pub struct DocumentRow {
	pub doc_id: i64,
	pub vector_id: String,
	pub title: String,
	pub source_type: String,
	pub authority_level: String,
	pub epistemic_origin: String,
	pub language: String,
	pub region: String,
	pub discourse_position: String,
	pub chunk_role: String,
	pub sensitivity: String,
	pub ingest_policy: String,
	pub folder_path: Option<String>,
	pub filename: Option<String>,
	pub chunk_index: Option<i64>,
	pub has_citation: bool,
	pub related_nodes: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct EmbeddingVersionRow {
	pub version_id: i64,
	pub doc_id: i64,
	pub model: String,
	pub version: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct MetadataEntryRow {
	pub key: String,
	pub value: Option<String>,
}
