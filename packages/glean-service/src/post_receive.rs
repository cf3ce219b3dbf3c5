use glean_domain::sync::SyncEntry;

use crate::GleanService;

/// What happened to one incoming sync entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PostReceiveOutcome {
	/// The entry needed nothing and passes through as received.
	Unchanged(SyncEntry),
	/// Fetched page data was merged into the entry.
	Enriched(SyncEntry),
	/// Enrichment failed; the URL is on the backlog and the entry must not be applied now.
	Dropped,
}
impl PostReceiveOutcome {
	/// The entry to apply, or `None` for a dropped entry.
	pub fn into_entry(self) -> Option<SyncEntry> {
		match self {
			Self::Unchanged(entry) | Self::Enriched(entry) => Some(entry),
			Self::Dropped => None,
		}
	}
}

impl GleanService {
	/// Completes untitled page creations before they are applied locally.
	///
	/// Never fails: a fetch that fails is deferred to the backlog and the entry is dropped.
	pub async fn post_receive(&self, mut entry: SyncEntry) -> PostReceiveOutcome {
		if !entry.needs_page_data() {
			return PostReceiveOutcome::Unchanged(entry);
		}

		let Some(full_url) = entry.full_url().map(str::to_string) else {
			return PostReceiveOutcome::Unchanged(entry);
		};

		match self.page_data.process(&full_url).await {
			Ok(mut record) => {
				self.persist_fav_icon(&mut record).await;
				entry.merge_page_record(&record);

				PostReceiveOutcome::Enriched(entry)
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					url = %full_url,
					"Page enrichment failed. Deferring to the backlog."
				);

				if let Err(err) = self.collaborators.backlog.enqueue(&full_url).await {
					tracing::error!(error = %err, url = %full_url, "Failed to enqueue backlog entry.");
				}

				PostReceiveOutcome::Dropped
			},
		}
	}
}
