use std::collections::BTreeMap;

use sqlx::{QueryBuilder, Sqlite};
use time::OffsetDateTime;

use pustaka_domain::{
	AuthorityLevel, ChunkMetadata, EpistemicOrigin, Language, SourceType, decode_list, encode_list,
};

use crate::{
	Result,
	db::Db,
	models::{DocumentRow, EmbeddingVersionRow, MetadataEntryRow},
};

/// Conjunctive metadata filter; `themes` requires set containment, not
/// overlap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataFilter {
	pub source_type: Option<SourceType>,
	pub authority_level: Option<AuthorityLevel>,
	pub epistemic_origin: Option<EpistemicOrigin>,
	pub language: Option<Language>,
	pub themes: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct StoreStats {
	pub total_documents: i64,
	pub by_source_type: BTreeMap<String, i64>,
	pub by_authority_level: BTreeMap<String, i64>,
	pub total_themes: i64,
	pub total_relations: i64,
}

/// Durable metadata store keyed by the vector index's `vector_id`.
///
/// Every insert runs in its own transaction; a crash never leaves a
/// document row without its theme links.
pub struct KnowledgeStore {
	db: Db,
}
impl KnowledgeStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	/// Connect and apply the schema. Lifecycle is explicit; there is no
	/// process-wide lazy instance.
	pub async fn open(cfg: &pustaka_config::Sqlite) -> Result<Self> {
		let db = Db::connect(cfg).await?;

		db.ensure_schema().await?;

		Ok(Self { db })
	}

	pub async fn close(&self) {
		self.db.pool.close().await;
	}

	/// Insert a chunk's metadata, its theme links, its embedding-version
	/// record, and spill any open-map keys into the key/value side table.
	/// Returns the store-local document id.
	pub async fn add(&self, vector_id: &str, metadata: &ChunkMetadata) -> Result<i64> {
		let mut tx = self.db.pool.begin().await?;
		let created_at = metadata.ingested_at.unwrap_or_else(OffsetDateTime::now_utc);
		let doc_id: i64 = sqlx::query_scalar(
			"\
INSERT INTO documents (
	vector_id, title, source_type, authority_level, epistemic_origin,
	language, region, discourse_position, chunk_role, sensitivity,
	ingest_policy, folder_path, filename, chunk_index, has_citation,
	related_nodes, created_at
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
RETURNING doc_id",
		)
		.bind(vector_id)
		.bind(&metadata.title)
		.bind(metadata.source_type.as_str())
		.bind(metadata.authority_level.as_str())
		.bind(metadata.epistemic_origin.as_str())
		.bind(metadata.language.as_str())
		.bind(&metadata.region)
		.bind(metadata.discourse_position.as_str())
		.bind(metadata.chunk_role.as_str())
		.bind(metadata.sensitivity.unwrap_or_default().as_str())
		.bind(&metadata.ingest_policy)
		.bind(metadata.folder_path.as_deref())
		.bind(metadata.filename.as_deref())
		.bind(metadata.chunk_index.map(i64::from))
		.bind(metadata.has_citation)
		.bind(encode_list(&metadata.related_nodes))
		.bind(created_at)
		.fetch_one(&mut *tx)
		.await?;

		for name in &metadata.themes {
			sqlx::query("INSERT INTO themes (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
				.bind(name)
				.execute(&mut *tx)
				.await?;

			let theme_id: i64 = sqlx::query_scalar("SELECT theme_id FROM themes WHERE name = ?")
				.bind(name)
				.fetch_one(&mut *tx)
				.await?;

			sqlx::query("INSERT OR IGNORE INTO document_themes (doc_id, theme_id) VALUES (?, ?)")
				.bind(doc_id)
				.bind(theme_id)
				.execute(&mut *tx)
				.await?;
		}

		if let (Some(model), Some(version)) =
			(metadata.embedding_model.as_deref(), metadata.embedding_version.as_deref())
		{
			sqlx::query(
				"INSERT INTO embedding_versions (doc_id, model, version, created_at) VALUES (?, ?, ?, ?)",
			)
			.bind(doc_id)
			.bind(model)
			.bind(version)
			.bind(metadata.embedding_created_at.unwrap_or(created_at))
			.execute(&mut *tx)
			.await?;
		}

		for (key, value) in &metadata.extra {
			sqlx::query("INSERT INTO metadata (doc_id, key, value) VALUES (?, ?, ?)")
				.bind(doc_id)
				.bind(key)
				.bind(value)
				.execute(&mut *tx)
				.await?;
		}

		tx.commit().await?;

		tracing::debug!(vector_id, doc_id, "Stored chunk metadata.");

		Ok(doc_id)
	}

	/// Fetch a chunk's metadata with its theme set; `None` when unknown.
	pub async fn get(&self, vector_id: &str) -> Result<Option<ChunkMetadata>> {
		let Some(row) =
			sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE vector_id = ?")
				.bind(vector_id)
				.fetch_optional(&self.db.pool)
				.await?
		else {
			return Ok(None);
		};

		let themes: Vec<String> = sqlx::query_scalar(
			"\
SELECT t.name
FROM themes t
JOIN document_themes dt ON t.theme_id = dt.theme_id
WHERE dt.doc_id = ?
ORDER BY t.name",
		)
		.bind(row.doc_id)
		.fetch_all(&self.db.pool)
		.await?;
		let entries = sqlx::query_as::<_, MetadataEntryRow>(
			"SELECT key, value FROM metadata WHERE doc_id = ?",
		)
		.bind(row.doc_id)
		.fetch_all(&self.db.pool)
		.await?;
		let version = sqlx::query_as::<_, EmbeddingVersionRow>(
			"SELECT * FROM embedding_versions WHERE doc_id = ? ORDER BY version_id DESC LIMIT 1",
		)
		.bind(row.doc_id)
		.fetch_optional(&self.db.pool)
		.await?;

		let mut metadata = ChunkMetadata {
			title: row.title,
			source_type: row.source_type.parse()?,
			authority_level: row.authority_level.parse()?,
			epistemic_origin: row.epistemic_origin.parse()?,
			themes,
			related_nodes: decode_list(&row.related_nodes),
			discourse_position: row.discourse_position.parse()?,
			chunk_role: row.chunk_role.parse()?,
			language: row.language.parse()?,
			region: row.region,
			sensitivity: Some(row.sensitivity.parse()?),
			ingest_policy: row.ingest_policy,
			has_citation: row.has_citation,
			folder_path: row.folder_path,
			filename: row.filename,
			chunk_index: row.chunk_index.and_then(|index| u32::try_from(index).ok()),
			embedding_model: None,
			embedding_version: None,
			embedding_created_at: None,
			ingested_at: Some(row.created_at),
			extra: entries
				.into_iter()
				.map(|entry| (entry.key, entry.value.unwrap_or_default()))
				.collect(),
		};

		if let Some(version) = version {
			metadata.embedding_model = Some(version.model);
			metadata.embedding_version = Some(version.version);
			metadata.embedding_created_at = Some(version.created_at);
		}

		Ok(Some(metadata))
	}

	/// Create a directed relation between two stored chunks. Returns false
	/// without writing anything when either endpoint is unknown.
	pub async fn link(
		&self,
		from_vector_id: &str,
		to_vector_id: &str,
		relation_type: &str,
	) -> Result<bool> {
		let resolve = |vector_id: &str| {
			sqlx::query_scalar::<_, i64>("SELECT doc_id FROM documents WHERE vector_id = ?")
				.bind(vector_id.to_string())
				.fetch_optional(&self.db.pool)
		};
		let from_id = resolve(from_vector_id).await?;
		let to_id = resolve(to_vector_id).await?;
		let (Some(from_id), Some(to_id)) = (from_id, to_id) else {
			return Ok(false);
		};

		sqlx::query(
			"INSERT INTO relations (from_doc_id, to_doc_id, relation_type, created_at) VALUES (?, ?, ?, ?)",
		)
		.bind(from_id)
		.bind(to_id)
		.bind(relation_type)
		.bind(OffsetDateTime::now_utc())
		.execute(&self.db.pool)
		.await?;

		Ok(true)
	}

	/// Conjunctive filter query returning matching vector ids. Theme
	/// filtering is AND-semantics: every requested theme must be present on
	/// the same document.
	pub async fn query(&self, filter: &MetadataFilter, limit: u32) -> Result<Vec<String>> {
		let mut builder: QueryBuilder<Sqlite> =
			QueryBuilder::new("SELECT d.vector_id FROM documents d");

		if !filter.themes.is_empty() {
			builder.push(
				" JOIN document_themes dt ON d.doc_id = dt.doc_id \
 JOIN themes t ON dt.theme_id = t.theme_id \
 WHERE t.name IN (",
			);

			let mut names = builder.separated(", ");

			for name in &filter.themes {
				names.push_bind(name);
			}

			builder.push(")");
		} else {
			builder.push(" WHERE 1 = 1");
		}

		if let Some(source_type) = filter.source_type {
			builder.push(" AND d.source_type = ").push_bind(source_type.as_str());
		}
		if let Some(authority_level) = filter.authority_level {
			builder.push(" AND d.authority_level = ").push_bind(authority_level.as_str());
		}
		if let Some(epistemic_origin) = filter.epistemic_origin {
			builder.push(" AND d.epistemic_origin = ").push_bind(epistemic_origin.as_str());
		}
		if let Some(language) = filter.language {
			builder.push(" AND d.language = ").push_bind(language.as_str());
		}
		if !filter.themes.is_empty() {
			builder
				.push(" GROUP BY d.doc_id HAVING COUNT(DISTINCT t.theme_id) = ")
				.push_bind(filter.themes.len() as i64);
		}

		builder.push(" LIMIT ").push_bind(i64::from(limit));

		let rows: Vec<(String,)> = builder.build_query_as().fetch_all(&self.db.pool).await?;

		Ok(rows.into_iter().map(|(vector_id,)| vector_id).collect())
	}

	pub async fn stats(&self) -> Result<StoreStats> {
		let total_documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
			.fetch_one(&self.db.pool)
			.await?;
		let by_source_type: Vec<(String, i64)> = sqlx::query_as(
			"SELECT source_type, COUNT(*) FROM documents GROUP BY source_type",
		)
		.fetch_all(&self.db.pool)
		.await?;
		let by_authority_level: Vec<(String, i64)> = sqlx::query_as(
			"SELECT authority_level, COUNT(*) FROM documents GROUP BY authority_level",
		)
		.fetch_all(&self.db.pool)
		.await?;
		let total_themes: i64 =
			sqlx::query_scalar("SELECT COUNT(*) FROM themes").fetch_one(&self.db.pool).await?;
		let total_relations: i64 =
			sqlx::query_scalar("SELECT COUNT(*) FROM relations").fetch_one(&self.db.pool).await?;

		Ok(StoreStats {
			total_documents,
			by_source_type: by_source_type.into_iter().collect(),
			by_authority_level: by_authority_level.into_iter().collect(),
			total_themes,
			total_relations,
		})
	}
}
