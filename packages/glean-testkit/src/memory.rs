//! In-memory collaborators for exercising the service without Postgres or the network.

use std::{
	collections::{HashMap, HashSet},
	sync::{
		Arc, Mutex, MutexGuard,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use time::OffsetDateTime;

use glean_domain::{
	annotation::{Annotation, ListEntry, TagEntry},
	page::PageRecord,
};
use glean_providers::page::FetchedPage;
use glean_service::{
	AnnotationStore, BoxFuture, Collaborators, PageBacklog, PageFetcher, PageStore, Result,
};

#[derive(Default)]
struct State {
	annotations: Vec<Annotation>,
	bookmarks: HashSet<String>,
	tags: Vec<TagEntry>,
	lists: Vec<(i64, String)>,
	list_entries: Vec<ListEntry>,
	pages: HashMap<String, PageRecord>,
	fav_icons: HashMap<String, String>,
	backlog: Vec<String>,
}

/// Annotation, page and backlog store kept in memory. Also counts key-listing calls.
#[derive(Default)]
pub struct MemoryStore {
	state: Mutex<State>,
	key_queries: AtomicUsize,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_annotation(&self, annotation: Annotation) {
		let mut state = self.lock();

		state.annotations.retain(|existing| existing.url != annotation.url);
		state.annotations.push(annotation);
	}

	pub fn bookmark(&self, url: &str) {
		self.lock().bookmarks.insert(url.to_string());
	}

	pub fn tag(&self, name: &str, url: &str) {
		let entry = TagEntry { name: name.to_string(), url: url.to_string() };
		let mut state = self.lock();

		if !state.tags.contains(&entry) {
			state.tags.push(entry);
		}
	}

	/// Adds `url` to the list called `name`, creating the list on first use.
	pub fn add_to_list(&self, name: &str, url: &str) -> i64 {
		let mut state = self.lock();
		let list_id = match state.lists.iter().find(|(_, list)| list == name) {
			Some((id, _)) => *id,
			None => {
				let id = state.lists.len() as i64 + 1;

				state.lists.push((id, name.to_string()));

				id
			},
		};
		let entry = ListEntry { list_id, url: url.to_string() };

		if !state.list_entries.contains(&entry) {
			state.list_entries.push(entry);
		}

		list_id
	}

	pub fn enqueued(&self) -> Vec<String> {
		self.lock().backlog.clone()
	}

	pub fn page(&self, url: &str) -> Option<PageRecord> {
		self.lock().pages.get(url).cloned()
	}

	pub fn fav_icon(&self, hostname: &str) -> Option<String> {
		self.lock().fav_icons.get(hostname).cloned()
	}

	pub fn key_queries(&self) -> usize {
		self.key_queries.load(Ordering::SeqCst)
	}

	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}

impl AnnotationStore for MemoryStore {
	fn page_annotation_keys<'a>(
		&'a self,
		page_url: &'a str,
		start: Option<OffsetDateTime>,
		end: Option<OffsetDateTime>,
		offset: usize,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		self.key_queries.fetch_add(1, Ordering::SeqCst);

		let mut keys: Vec<String> = self
			.lock()
			.annotations
			.iter()
			.filter(|annotation| annotation.page_url == page_url)
			.filter(|annotation| start.is_none_or(|start| annotation.created_at >= start))
			.filter(|annotation| end.is_none_or(|end| annotation.created_at <= end))
			.map(|annotation| annotation.url.clone())
			.collect();

		keys.sort();

		let keys = keys.into_iter().skip(offset).take(limit).collect();

		Box::pin(async move { Ok(keys) })
	}

	fn annotations_edited_between<'a>(
		&'a self,
		lower: OffsetDateTime,
		upper: OffsetDateTime,
		upper_inclusive: bool,
	) -> BoxFuture<'a, Result<Vec<Annotation>>> {
		let mut found: Vec<Annotation> = self
			.lock()
			.annotations
			.iter()
			.filter(|annotation| annotation.last_edited >= lower)
			.filter(|annotation| {
				annotation.last_edited < upper || (upper_inclusive && annotation.last_edited == upper)
			})
			.cloned()
			.collect();

		found.sort_by(|a, b| b.last_edited.cmp(&a.last_edited).then_with(|| a.url.cmp(&b.url)));

		Box::pin(async move { Ok(found) })
	}

	fn annotations_by_keys<'a>(
		&'a self,
		keys: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Annotation>>> {
		let found = self
			.lock()
			.annotations
			.iter()
			.filter(|annotation| keys.contains(&annotation.url))
			.cloned()
			.collect();

		Box::pin(async move { Ok(found) })
	}

	fn bookmarked_keys<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<HashSet<String>>> {
		let state = self.lock();
		let marked = keys.iter().filter(|key| state.bookmarks.contains(*key)).cloned().collect();

		Box::pin(async move { Ok(marked) })
	}

	fn tag_entries<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<Vec<TagEntry>>> {
		let entries =
			self.lock().tags.iter().filter(|entry| keys.contains(&entry.url)).cloned().collect();

		Box::pin(async move { Ok(entries) })
	}

	fn list_ids_by_name<'a>(&'a self, names: &'a [String]) -> BoxFuture<'a, Result<Vec<i64>>> {
		let ids = self
			.lock()
			.lists
			.iter()
			.filter(|(_, name)| names.contains(name))
			.map(|(id, _)| *id)
			.collect();

		Box::pin(async move { Ok(ids) })
	}

	fn list_entries<'a>(&'a self, keys: &'a [String]) -> BoxFuture<'a, Result<Vec<ListEntry>>> {
		let entries = self
			.lock()
			.list_entries
			.iter()
			.filter(|entry| keys.contains(&entry.url))
			.cloned()
			.collect();

		Box::pin(async move { Ok(entries) })
	}
}

impl PageStore for MemoryStore {
	fn upsert_page<'a>(&'a self, record: &'a PageRecord) -> BoxFuture<'a, Result<()>> {
		self.lock().pages.insert(record.url.clone(), record.clone());

		Box::pin(async move { Ok(()) })
	}

	fn add_fav_icon_if_needed<'a>(
		&'a self,
		hostname: &'a str,
		fav_icon: &'a str,
	) -> BoxFuture<'a, Result<bool>> {
		let mut state = self.lock();
		let stored = !state.fav_icons.contains_key(hostname);

		if stored {
			state.fav_icons.insert(hostname.to_string(), fav_icon.to_string());
		}

		Box::pin(async move { Ok(stored) })
	}
}

impl PageBacklog for MemoryStore {
	fn enqueue<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<()>> {
		self.lock().backlog.push(url.to_string());

		Box::pin(async move { Ok(()) })
	}
}

#[derive(Debug, Clone)]
pub enum StubResponse {
	Page(FetchedPage),
	Temporary(String),
	Permanent(String),
	/// Never completes, so callers hit their own timeout or cancellation.
	Hang,
}

/// A fetcher that answers every URL with the same canned response.
pub struct StubFetcher {
	response: StubResponse,
	calls: AtomicUsize,
}
impl StubFetcher {
	pub fn new(response: StubResponse) -> Self {
		Self { response, calls: AtomicUsize::new(0) }
	}

	pub fn titled(title: &str) -> Self {
		Self::new(StubResponse::Page(FetchedPage {
			title: Some(title.to_string()),
			..FetchedPage::default()
		}))
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl PageFetcher for StubFetcher {
	fn fetch<'a>(
		&'a self,
		_cfg: &'a glean_config::Fetcher,
		_url: &'a str,
	) -> BoxFuture<'a, glean_providers::Result<FetchedPage>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let response = self.response.clone();

		Box::pin(async move {
			match response {
				StubResponse::Page(page) => Ok(page),
				StubResponse::Temporary(message) =>
					Err(glean_providers::Error::temporary(message)),
				StubResponse::Permanent(message) =>
					Err(glean_providers::Error::permanent(message)),
				StubResponse::Hang => {
					tokio::time::sleep(Duration::from_secs(3_600)).await;

					Err(glean_providers::Error::temporary("Stub fetch hung."))
				},
			}
		})
	}
}

/// Wires one [`MemoryStore`] into every store seam next to the given fetcher.
pub fn collaborators(store: Arc<MemoryStore>, fetcher: Arc<StubFetcher>) -> Collaborators {
	Collaborators { annotations: store.clone(), pages: store.clone(), backlog: store, fetcher }
}
