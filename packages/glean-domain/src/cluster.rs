//! Day/page clustering of annotations.
//!
//! Buckets are kept in explicit vectors so that iteration order is the merge order:
//! days appear in the order they were first inserted, and so do pages within a day.

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{annotation::Annotation, bounds};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayClusters {
	days: Vec<DayBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
	#[serde(with = "crate::time_serde")]
	pub day: OffsetDateTime,
	pub pages: Vec<PageBucket>,
}
impl DayBucket {
	pub fn page(&self, page_url: &str) -> Option<&PageBucket> {
		self.pages.iter().find(|page| page.page_url == page_url)
	}

	fn page_mut(&mut self, page_url: &str) -> &mut PageBucket {
		let index = match self.pages.iter().position(|page| page.page_url == page_url) {
			Some(index) => index,
			None => {
				self.pages
					.push(PageBucket { page_url: page_url.to_string(), annotations: Vec::new() });

				self.pages.len() - 1
			},
		};

		&mut self.pages[index]
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBucket {
	pub page_url: String,
	pub annotations: Vec<Annotation>,
}

impl DayClusters {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sorts by `last_edited` descending, then groups by day start and page.
	pub fn cluster(annotations: Vec<Annotation>, offset: UtcOffset) -> Self {
		Self::cluster_inner(annotations, offset, None)
	}

	/// Like [`DayClusters::cluster`], but a day that starts before `floor` is keyed by `floor`
	/// itself, so no bucket key precedes the lower limit of a listing.
	pub fn cluster_above(
		annotations: Vec<Annotation>,
		offset: UtcOffset,
		floor: OffsetDateTime,
	) -> Self {
		Self::cluster_inner(annotations, offset, Some(floor))
	}

	fn cluster_inner(
		mut annotations: Vec<Annotation>,
		offset: UtcOffset,
		floor: Option<OffsetDateTime>,
	) -> Self {
		annotations.sort_by(|a, b| b.last_edited.cmp(&a.last_edited));

		let mut out = Self::new();

		for annotation in annotations {
			let mut day = bounds::start_of_day(annotation.last_edited, offset);

			if let Some(floor) = floor {
				day = day.max(floor);
			}

			let page_url = annotation.page_url.clone();

			out.day_mut(day).page_mut(&page_url).annotations.push(annotation);
		}

		out
	}

	/// Folds `other` into `self`, appending unseen days and pages and concatenating
	/// annotation lists for pages both sides share.
	pub fn merge(&mut self, other: DayClusters) {
		for bucket in other.days {
			let target = self.day_mut(bucket.day);

			for page in bucket.pages {
				target.page_mut(&page.page_url).annotations.extend(page.annotations);
			}
		}
	}

	pub fn len(&self) -> usize {
		self.days.len()
	}

	pub fn is_empty(&self) -> bool {
		self.days.is_empty()
	}

	pub fn truncate(&mut self, days: usize) {
		self.days.truncate(days);
	}

	pub fn days(&self) -> &[DayBucket] {
		&self.days
	}

	pub fn into_days(self) -> Vec<DayBucket> {
		self.days
	}

	pub fn day(&self, day: OffsetDateTime) -> Option<&DayBucket> {
		self.days.iter().find(|bucket| bucket.day == day)
	}

	pub fn annotation_count(&self) -> usize {
		self.days
			.iter()
			.flat_map(|bucket| bucket.pages.iter())
			.map(|page| page.annotations.len())
			.sum()
	}

	/// Flattens every bucket back into one list ordered by `last_edited` descending.
	pub fn into_annotations(self) -> Vec<Annotation> {
		let mut out: Vec<Annotation> = self
			.days
			.into_iter()
			.flat_map(|bucket| bucket.pages.into_iter())
			.flat_map(|page| page.annotations.into_iter())
			.collect();

		out.sort_by(|a, b| b.last_edited.cmp(&a.last_edited));

		out
	}

	fn day_mut(&mut self, day: OffsetDateTime) -> &mut DayBucket {
		let index = match self.days.iter().position(|bucket| bucket.day == day) {
			Some(index) => index,
			None => {
				self.days.push(DayBucket { day, pages: Vec::new() });

				self.days.len() - 1
			},
		};

		&mut self.days[index]
	}
}

#[cfg(test)]
mod tests {
	use time::{Duration, macros::datetime};

	use super::*;

	fn annot(url: &str, page: &str, edited: OffsetDateTime) -> Annotation {
		Annotation::new(url, page, Some(url.to_string()), None, edited - Duration::hours(1))
			.edited_at(edited)
	}

	fn urls(page: &PageBucket) -> Vec<&str> {
		page.annotations.iter().map(|annot| annot.url.as_str()).collect()
	}

	#[test]
	fn days_starting_below_the_floor_are_keyed_by_the_floor() {
		let floor = datetime!(2024-01-01 12:00 UTC);
		let clusters = DayClusters::cluster_above(
			vec![
				annot("late", "p1", datetime!(2024-01-01 18:00 UTC)),
				annot("next", "p1", datetime!(2024-01-02 09:00 UTC)),
			],
			UtcOffset::UTC,
			floor,
		);
		let keys: Vec<OffsetDateTime> = clusters.days().iter().map(|bucket| bucket.day).collect();

		assert_eq!(keys, vec![datetime!(2024-01-02 0:00 UTC), floor]);
	}

	#[test]
	fn clusters_by_day_then_page_in_recency_order() {
		let clusters = DayClusters::cluster(
			vec![
				annot("a3", "p1", datetime!(2024-01-01 08:00 UTC)),
				annot("b1", "p1", datetime!(2023-12-31 23:00 UTC)),
				annot("a1", "p1", datetime!(2024-01-01 10:00 UTC)),
				annot("a2", "p2", datetime!(2024-01-01 09:00 UTC)),
			],
			UtcOffset::UTC,
		);

		assert_eq!(clusters.len(), 2);

		let first = &clusters.days()[0];

		assert_eq!(first.day, datetime!(2024-01-01 0:00 UTC));
		assert_eq!(first.pages.len(), 2);
		assert_eq!(first.pages[0].page_url, "p1");
		assert_eq!(urls(&first.pages[0]), vec!["a1", "a3"]);
		assert_eq!(urls(&first.pages[1]), vec!["a2"]);
		assert_eq!(clusters.days()[1].day, datetime!(2023-12-31 0:00 UTC));
	}

	#[test]
	fn day_boundary_follows_offset() {
		let clusters = DayClusters::cluster(
			vec![annot("a1", "p1", datetime!(2024-01-01 02:00 UTC))],
			UtcOffset::from_hms(-5, 0, 0).expect("Valid offset."),
		);

		assert_eq!(clusters.days()[0].day, datetime!(2023-12-31 0:00 -5));
	}

	#[test]
	fn flattening_restores_recency_order() {
		let input = vec![
			annot("a3", "p1", datetime!(2024-01-01 08:00 UTC)),
			annot("c1", "p3", datetime!(2023-11-02 12:00 UTC)),
			annot("a1", "p1", datetime!(2024-01-01 10:00 UTC)),
			annot("a2", "p2", datetime!(2024-01-01 09:00 UTC)),
		];
		let mut expected = input.clone();

		expected.sort_by(|a, b| b.last_edited.cmp(&a.last_edited));

		let flattened = DayClusters::cluster(input, UtcOffset::UTC).into_annotations();

		assert_eq!(flattened, expected);
	}

	#[test]
	fn merge_appends_days_and_concatenates_pages() {
		let mut left = DayClusters::cluster(
			vec![
				annot("a1", "p1", datetime!(2024-01-02 10:00 UTC)),
				annot("a2", "p1", datetime!(2024-01-01 20:00 UTC)),
			],
			UtcOffset::UTC,
		);
		let right = DayClusters::cluster(
			vec![
				annot("b1", "p1", datetime!(2024-01-01 05:00 UTC)),
				annot("b2", "p2", datetime!(2024-01-01 04:00 UTC)),
				annot("b3", "p1", datetime!(2023-12-30 04:00 UTC)),
			],
			UtcOffset::UTC,
		);

		left.merge(right);

		assert_eq!(left.len(), 3);

		let shared = left.day(datetime!(2024-01-01 0:00 UTC)).expect("Shared day must exist.");

		assert_eq!(urls(shared.page("p1").expect("p1 must exist.")), vec!["a2", "b1"]);
		assert_eq!(urls(shared.page("p2").expect("p2 must exist.")), vec!["b2"]);
		assert_eq!(left.days()[2].day, datetime!(2023-12-30 0:00 UTC));
		assert_eq!(left.annotation_count(), 5);
	}

	#[test]
	fn merging_into_empty_equals_other() {
		let other =
			DayClusters::cluster(vec![annot("a1", "p1", datetime!(2024-01-02 10:00 UTC))], UtcOffset::UTC);
		let mut merged = DayClusters::new();

		merged.merge(other.clone());

		assert_eq!(merged, other);
	}
}
