use std::sync::Arc;

use time::{OffsetDateTime, macros::datetime};

use glean_domain::{annotation::Annotation, params::SearchParams};
use glean_service::{Error, GleanService};
use glean_testkit::memory::{self, MemoryStore, StubFetcher};

fn service_with(store: Arc<MemoryStore>, cfg: glean_config::Config) -> GleanService {
	let fetcher = Arc::new(StubFetcher::titled("unused"));

	GleanService::with_collaborators(cfg, memory::collaborators(store, fetcher))
}

fn service(store: Arc<MemoryStore>) -> GleanService {
	service_with(store, glean_testkit::test_config("postgres://unused"))
}

fn annot(url: &str, page_url: &str, edited: OffsetDateTime) -> Annotation {
	Annotation::new(url, page_url, Some(format!("highlight {url}")), None, edited).edited_at(edited)
}

fn urls(annotations: &[Annotation]) -> Vec<&str> {
	annotations.iter().map(|annotation| annotation.url.as_str()).collect()
}

#[tokio::test]
async fn day_listing_keeps_only_tagged_annotations_of_the_latest_day() {
	let store = Arc::new(MemoryStore::new());

	store.add_annotation(annot("a", "p1", datetime!(2024-01-01 12:00 UTC)));
	store.add_annotation(annot("b", "p2", datetime!(2024-01-01 12:00 UTC)));
	store.add_annotation(annot("c", "p1", datetime!(2023-12-01 12:00 UTC)));
	store.tag("x", "a");
	store.tag("x", "c");

	let service = service(store);
	let params =
		SearchParams { limit: Some(1), tags_inc: vec!["x".to_string()], ..SearchParams::default() };
	let days = service.list_annots_by_day(params).await.expect("Listing must succeed.");

	assert_eq!(days.len(), 1);

	let bucket = &days.days()[0];

	assert_eq!(bucket.day, datetime!(2024-01-01 0:00 UTC));
	assert_eq!(bucket.pages.len(), 1);
	assert_eq!(bucket.pages[0].page_url, "p1");
	assert_eq!(urls(&bucket.pages[0].annotations), vec!["a"]);
}

#[tokio::test]
async fn day_listing_never_reaches_below_the_install_time() {
	let store = Arc::new(MemoryStore::new());
	let mut cfg = glean_testkit::test_config("postgres://unused");
	let install_time = datetime!(2024-01-01 0:00 UTC);

	cfg.annotations.install_time = Some(install_time);

	store.add_annotation(annot("old", "p1", datetime!(2023-12-31 18:00 UTC)));
	store.add_annotation(annot("new", "p1", datetime!(2024-01-02 09:00 UTC)));

	let service = service_with(store, cfg);
	let params = SearchParams {
		limit: Some(5),
		end_date: Some(datetime!(2024-01-05 0:00 UTC)),
		..SearchParams::default()
	};
	let days = service.list_annots_by_day(params).await.expect("Listing must succeed.");

	assert_eq!(days.len(), 1);
	assert!(days.days().iter().all(|bucket| bucket.day >= install_time));
	assert_eq!(urls(&days.into_annotations()), vec!["new"]);
}

#[tokio::test]
async fn day_buckets_never_start_before_a_mid_day_start_date() {
	let store = Arc::new(MemoryStore::new());
	let start = datetime!(2024-01-01 12:00 UTC);

	store.add_annotation(annot("morning", "p1", datetime!(2024-01-01 08:00 UTC)));
	store.add_annotation(annot("evening", "p1", datetime!(2024-01-01 20:00 UTC)));

	let service = service(store);
	let params = SearchParams {
		limit: Some(3),
		start_date: Some(start),
		end_date: Some(datetime!(2024-01-02 0:00 UTC)),
		..SearchParams::default()
	};
	let days = service.list_annots_by_day(params).await.expect("Listing must succeed.");
	let keys: Vec<OffsetDateTime> = days.days().iter().map(|bucket| bucket.day).collect();

	assert_eq!(keys, vec![start]);
	assert_eq!(urls(&days.into_annotations()), vec!["evening"]);
}

#[tokio::test]
async fn day_listing_returns_the_most_recent_days_first() {
	let store = Arc::new(MemoryStore::new());

	for (url, edited) in [
		("d10", datetime!(2024-01-10 10:00 UTC)),
		("d09", datetime!(2024-01-09 10:00 UTC)),
		("d08", datetime!(2024-01-08 10:00 UTC)),
		("d05", datetime!(2024-01-05 10:00 UTC)),
	] {
		store.add_annotation(annot(url, "p1", edited));
	}

	let service = service(store);
	let params = SearchParams {
		limit: Some(2),
		end_date: Some(datetime!(2024-01-10 23:59:59.999 UTC)),
		..SearchParams::default()
	};
	let days = service.list_annots_by_day(params).await.expect("Listing must succeed.");
	let keys: Vec<OffsetDateTime> = days.days().iter().map(|bucket| bucket.day).collect();

	assert_eq!(keys, vec![datetime!(2024-01-10 0:00 UTC), datetime!(2024-01-09 0:00 UTC)]);
}

#[tokio::test]
async fn day_buckets_stay_whole_below_a_mid_day_end_date() {
	let store = Arc::new(MemoryStore::new());

	store.add_annotation(annot("eve", "p1", datetime!(2024-01-09 18:00 UTC)));
	store.add_annotation(annot("morning", "p1", datetime!(2024-01-09 08:00 UTC)));

	let service = service(store);
	let params = SearchParams {
		limit: Some(1),
		end_date: Some(datetime!(2024-01-10 12:00 UTC)),
		..SearchParams::default()
	};
	let days = service.list_annots_by_day(params).await.expect("Listing must succeed.");

	assert_eq!(days.len(), 1);
	assert_eq!(days.days()[0].day, datetime!(2024-01-09 0:00 UTC));
	assert_eq!(urls(&days.into_annotations()), vec!["eve", "morning"]);
}

#[tokio::test]
async fn day_windows_do_not_count_boundary_annotations_twice() {
	let store = Arc::new(MemoryStore::new());

	store.add_annotation(annot("edge", "p1", datetime!(2024-01-07 0:00 UTC)));

	let service = service(store);
	let params = SearchParams {
		limit: Some(3),
		end_date: Some(datetime!(2024-01-10 0:00 UTC)),
		..SearchParams::default()
	};
	let days = service.list_annots_by_day(params).await.expect("Listing must succeed.");

	assert_eq!(days.annotation_count(), 1);
}

#[tokio::test]
async fn day_listing_applies_term_filters_to_the_selected_term_sets() {
	let store = Arc::new(MemoryStore::new());
	let edited = datetime!(2024-01-10 10:00 UTC);

	store.add_annotation(
		Annotation::new(
			"hl",
			"p1",
			Some("The Rust borrow checker".to_string()),
			Some("remember this".to_string()),
			edited,
		)
		.edited_at(edited),
	);
	store.add_annotation(
		Annotation::new("other", "p1", Some("Go channels".to_string()), None, edited)
			.edited_at(edited),
	);

	let service = service(store);
	let base = SearchParams {
		limit: Some(1),
		end_date: Some(datetime!(2024-01-11 0:00 UTC)),
		terms_inc: vec!["RUST".to_string()],
		..SearchParams::default()
	};
	let days = service.list_annots_by_day(base.clone()).await.expect("Listing must succeed.");

	assert_eq!(urls(&days.into_annotations()), vec!["hl"]);

	let notes_only = SearchParams { include_highlights: false, ..base };
	let days = service.list_annots_by_day(notes_only).await.expect("Listing must succeed.");

	assert!(days.is_empty());
}

#[tokio::test]
async fn day_listing_with_zero_limit_is_empty() {
	let store = Arc::new(MemoryStore::new());

	store.add_annotation(annot("a", "p1", datetime!(2024-01-01 12:00 UTC)));

	let service = service(store);
	let days = service
		.list_annots_by_day(SearchParams { limit: Some(0), ..SearchParams::default() })
		.await
		.expect("Listing must succeed.");

	assert!(days.is_empty());
}

#[tokio::test]
async fn page_listing_slices_filtered_keys() {
	let store = Arc::new(MemoryStore::new());
	let edited = datetime!(2024-01-01 12:00 UTC);

	for url in ["a1", "a2", "a3", "a4", "a5", "a6"] {
		store.add_annotation(annot(url, "p1", edited));
	}
	for url in ["a2", "a4", "a5", "a6"] {
		store.bookmark(url);
	}

	store.add_annotation(annot("elsewhere", "p2", edited));
	store.bookmark("elsewhere");

	let service = service(store);
	let params = SearchParams {
		limit: Some(2),
		skip: 1,
		bookmarks_only: true,
		..SearchParams::for_page("p1")
	};
	let annotations = service.list_annots_by_page(params).await.expect("Listing must succeed.");

	assert_eq!(urls(&annotations), vec!["a4", "a5"]);
}

#[tokio::test]
async fn page_listing_never_exceeds_limit() {
	let store = Arc::new(MemoryStore::new());
	let edited = datetime!(2024-01-01 12:00 UTC);

	for index in 0..25 {
		store.add_annotation(annot(&format!("a{index:02}"), "p1", edited));
	}

	let service = service(store);

	for limit in [1, 3, 10, 40] {
		let params = SearchParams { limit: Some(limit), ..SearchParams::for_page("p1") };
		let annotations =
			service.list_annots_by_page(params).await.expect("Listing must succeed.");

		assert_eq!(annotations.len(), limit.min(25));
	}
}

#[tokio::test]
async fn page_listing_terminates_when_filters_reject_everything() {
	let store = Arc::new(MemoryStore::new());
	let edited = datetime!(2024-01-01 12:00 UTC);

	for index in 0..10 {
		store.add_annotation(annot(&format!("a{index}"), "p1", edited));
	}

	let service = service(store.clone());
	let params = SearchParams {
		limit: Some(2),
		tags_inc: vec!["missing".to_string()],
		..SearchParams::for_page("p1")
	};
	let annotations = service.list_annots_by_page(params).await.expect("Listing must succeed.");

	assert!(annotations.is_empty());
	// Reads of 4, 4, then a short read of 2.
	assert_eq!(store.key_queries(), 3);
}

#[tokio::test]
async fn page_listing_applies_tag_exclusion_and_collections() {
	let store = Arc::new(MemoryStore::new());
	let edited = datetime!(2024-01-01 12:00 UTC);

	for url in ["a1", "a2", "a3"] {
		store.add_annotation(annot(url, "p1", edited));
	}

	store.tag("keep", "a1");
	store.tag("drop", "a2");
	store.tag("keep", "a3");
	store.tag("drop", "a3");
	store.add_to_list("reading", "a1");
	store.add_to_list("reading", "a3");
	store.add_to_list("archive", "a2");

	let service = service(store);
	let excluded = SearchParams {
		tags_exc: vec!["drop".to_string()],
		..SearchParams::for_page("p1")
	};
	let annotations = service.list_annots_by_page(excluded).await.expect("Listing must succeed.");

	// a3 survives through its remaining "keep" entry.
	assert_eq!(urls(&annotations), vec!["a1", "a3"]);

	let listed = SearchParams {
		collections: vec!["archive".to_string(), "unknown".to_string()],
		..SearchParams::for_page("p1")
	};
	let annotations = service.list_annots_by_page(listed).await.expect("Listing must succeed.");

	assert_eq!(urls(&annotations), vec!["a2"]);
}

#[tokio::test]
async fn page_listing_requires_a_page_url() {
	let service = service(Arc::new(MemoryStore::new()));
	let err = service
		.list_annots_by_page(SearchParams::for_page("   "))
		.await
		.expect_err("Blank page_url must be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn inverted_windows_are_rejected() {
	let service = service(Arc::new(MemoryStore::new()));
	let params = SearchParams {
		start_date: Some(datetime!(2024-02-01 0:00 UTC)),
		end_date: Some(datetime!(2024-01-01 0:00 UTC)),
		..SearchParams::default()
	};
	let err = service.list_annots_by_day(params).await.expect_err("Inverted window must fail.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn tag_filter_without_tags_is_identity() {
	let service = service(Arc::new(MemoryStore::new()));
	let keys = vec!["b".to_string(), "a".to_string(), "c".to_string()];
	let filtered =
		service.filter_by_tags(keys.clone(), &[], &[]).await.expect("Filtering must succeed.");

	assert_eq!(filtered, keys);
}
