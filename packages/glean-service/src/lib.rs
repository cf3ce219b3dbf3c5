pub mod annots_list;
pub mod filters;
pub mod page_data;
pub mod pg;
pub mod post_receive;

mod error;

pub use error::{Error, Result};
pub use page_data::FetchPageDataProcessor;
pub use post_receive::PostReceiveOutcome;

use std::{collections::HashSet, future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;

use glean_config::Config;
use glean_domain::{
	annotation::{Annotation, ListEntry, TagEntry},
	bounds::ListBounds,
	page::PageRecord,
};
use glean_providers::page::FetchedPage;
use glean_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to annotations and the collections keyed by annotation URL.
pub trait AnnotationStore
where
	Self: Send + Sync,
{
	/// Keys of `page_url`'s annotations in key order, bounded by creation time when given.
	fn page_annotation_keys<'a>(
		&'a self,
		page_url: &'a str,
		start: Option<OffsetDateTime>,
		end: Option<OffsetDateTime>,
		offset: usize,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<String>>>;

	/// Annotations whose `last_edited` lies in `[lower, upper]`, or `[lower, upper)` when
	/// `upper_inclusive` is false.
	fn annotations_edited_between<'a>(
		&'a self,
		lower: OffsetDateTime,
		upper: OffsetDateTime,
		upper_inclusive: bool,
	) -> BoxFuture<'a, Result<Vec<Annotation>>>;

	fn annotations_by_keys<'a>(&'a self, keys: &'a [String])
	-> BoxFuture<'a, Result<Vec<Annotation>>>;

	fn bookmarked_keys<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<HashSet<String>>>;

	fn tag_entries<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<Vec<TagEntry>>>;

	fn list_ids_by_name<'a>(&'a self, names: &'a [String]) -> BoxFuture<'a, Result<Vec<i64>>>;

	fn list_entries<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<Vec<ListEntry>>>;
}

pub trait PageStore
where
	Self: Send + Sync,
{
	fn upsert_page<'a>(&'a self, record: &'a PageRecord) -> BoxFuture<'a, Result<()>>;

	/// Stores `fav_icon` for `hostname` unless one is already stored.
	fn add_fav_icon_if_needed<'a>(
		&'a self,
		hostname: &'a str,
		fav_icon: &'a str,
	) -> BoxFuture<'a, Result<bool>>;
}

/// Append-only queue of URLs whose enrichment must be retried. Duplicates are allowed.
pub trait PageBacklog
where
	Self: Send + Sync,
{
	fn enqueue<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<()>>;
}

pub trait PageFetcher
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a glean_config::Fetcher,
		url: &'a str,
	) -> BoxFuture<'a, glean_providers::Result<FetchedPage>>;
}

#[derive(Clone)]
pub struct Collaborators {
	pub annotations: Arc<dyn AnnotationStore>,
	pub pages: Arc<dyn PageStore>,
	pub backlog: Arc<dyn PageBacklog>,
	pub fetcher: Arc<dyn PageFetcher>,
}
impl Collaborators {
	pub fn postgres(db: Arc<Db>) -> Self {
		let store = Arc::new(pg::PgStore::new(db));

		Self {
			annotations: store.clone(),
			pages: store.clone(),
			backlog: store,
			fetcher: Arc::new(NetworkFetcher),
		}
	}
}

pub struct GleanService {
	pub cfg: Config,
	pub collaborators: Collaborators,
	pub page_data: FetchPageDataProcessor,
}
impl GleanService {
	pub fn new(cfg: Config, db: Arc<Db>) -> Self {
		Self::with_collaborators(cfg, Collaborators::postgres(db))
	}

	pub fn with_collaborators(cfg: Config, collaborators: Collaborators) -> Self {
		let page_data =
			FetchPageDataProcessor::new(cfg.fetcher.clone(), collaborators.fetcher.clone());

		Self { cfg, collaborators, page_data }
	}

	pub fn list_bounds(&self) -> ListBounds {
		ListBounds {
			feature_floor: self.cfg.annotations.feature_floor,
			install_time: self.cfg.annotations.install_time,
			day_offset: self.cfg.annotations.day_offset(),
		}
	}

	/// Persists a processed page and, separately, its favicon.
	pub async fn store_page(&self, mut record: PageRecord) -> Result<()> {
		self.persist_fav_icon(&mut record).await;
		self.collaborators.pages.upsert_page(&record).await
	}

	/// Moves the favicon out of `record` into the favicon store. Failures are logged only.
	pub(crate) async fn persist_fav_icon(&self, record: &mut PageRecord) {
		let Some(fav_icon) = record.take_fav_icon() else {
			return;
		};

		if let Err(err) =
			self.collaborators.pages.add_fav_icon_if_needed(&record.hostname, &fav_icon).await
		{
			tracing::warn!(
				error = %err,
				hostname = %record.hostname,
				"Failed to store favicon."
			);
		}
	}
}

struct NetworkFetcher;
impl PageFetcher for NetworkFetcher {
	fn fetch<'a>(
		&'a self,
		cfg: &'a glean_config::Fetcher,
		url: &'a str,
	) -> BoxFuture<'a, glean_providers::Result<FetchedPage>> {
		Box::pin(glean_providers::page::fetch(cfg, url))
	}
}
