//! Test infrastructure: throwaway SQLite stores and tracing setup.

use std::sync::Once;

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use pustaka_storage::KnowledgeStore;

static TRACING: Once = Once::new();

/// Install a test tracing subscriber honoring `RUST_LOG`. Safe to call from
/// every test; only the first call installs.
pub fn init_tracing() {
	TRACING.call_once(|| {
		tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::from_default_env())
			.with_test_writer()
			.init();
	});
}

/// A schema-initialized store backed by a temporary directory. The
/// directory (and the database inside it) is removed on drop.
pub struct TestStore {
	pub store: KnowledgeStore,
	pub sqlite: pustaka_config::Sqlite,
	_dir: TempDir,
}
impl TestStore {
	pub async fn new() -> Self {
		let dir = tempfile::tempdir().expect("create temp dir");
		let sqlite = pustaka_config::Sqlite {
			path: dir.path().join("pustaka.db").display().to_string(),
			pool_max_conns: 2,
		};
		let store = KnowledgeStore::open(&sqlite).await.expect("open test store");

		Self { store, sqlite, _dir: dir }
	}

	pub fn into_store(self) -> (KnowledgeStore, TempDir) {
		(self.store, self._dir)
	}
}
