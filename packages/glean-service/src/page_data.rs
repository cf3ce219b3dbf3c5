use std::{future::Future, sync::Arc, time::Duration};

use glean_domain::page::{self, PageContent, PageRecord};
use glean_providers::{Error, Result, page::FetchedPage};

use crate::PageFetcher;

/// Turns a URL into a page record, resolving permanent fetch failures to a stub record.
///
/// Only temporary failures (including timeouts and cancellation) reach the caller.
pub struct FetchPageDataProcessor {
	cfg: glean_config::Fetcher,
	fetcher: Arc<dyn PageFetcher>,
}
impl FetchPageDataProcessor {
	pub fn new(cfg: glean_config::Fetcher, fetcher: Arc<dyn PageFetcher>) -> Self {
		Self { cfg, fetcher }
	}

	pub async fn process(&self, url: &str) -> Result<PageRecord> {
		self.process_until(url, std::future::pending()).await
	}

	/// Like [`Self::process`], but gives up with a temporary failure once `cancel` resolves.
	pub async fn process_until<C>(&self, url: &str, cancel: C) -> Result<PageRecord>
	where
		C: Future<Output = ()>,
	{
		let deadline = Duration::from_millis(self.cfg.timeout_ms);
		let fetched = tokio::select! {
			res = tokio::time::timeout(deadline, self.fetcher.fetch(&self.cfg, url)) => match res {
				Ok(res) => res,
				Err(_) => Err(Error::temporary(format!(
					"Fetching {url} timed out after {} ms.",
					self.cfg.timeout_ms
				))),
			},
			() = cancel => Err(Error::temporary(format!("Fetching {url} was cancelled."))),
		};

		match fetched {
			Ok(fetched) => Ok(page::build_page_record(url, content(fetched))),
			Err(Error::Permanent { message }) => {
				tracing::info!(url, reason = %message, "Page content unavailable. Using a stub record.");

				Ok(page::stub_page_record(url))
			},
			Err(err) => Err(err),
		}
	}
}

fn content(fetched: FetchedPage) -> PageContent {
	PageContent {
		title: fetched.title,
		description: fetched.description,
		full_text: fetched.text,
		fav_icon_uri: fetched.fav_icon_uri,
	}
}
