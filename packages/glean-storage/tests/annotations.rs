use time::{Duration, OffsetDateTime, macros::datetime};

use glean_storage::{annotations, db::Db, models::AnnotationRow};

fn row(url: &str, page_url: &str, edited: OffsetDateTime) -> AnnotationRow {
	AnnotationRow {
		url: url.to_string(),
		page_url: page_url.to_string(),
		body: Some(format!("body of {url}")),
		comment: None,
		body_terms: Some(vec!["body".to_string(), "of".to_string()]),
		comment_terms: None,
		created_at: edited - Duration::hours(1),
		last_edited: edited,
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set GLEAN_PG_DSN to run."]
async fn lists_page_keys_in_key_order_with_offsets() {
	let Some(base_dsn) = glean_testkit::env_dsn() else {
		eprintln!(
			"Skipping lists_page_keys_in_key_order_with_offsets; set GLEAN_PG_DSN to run this test."
		);

		return;
	};
	let test_db =
		glean_testkit::TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = Db::connect(&test_db.postgres_config()).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	db.ensure_schema().await.expect("Schema bootstrap must be repeatable.");

	let edited = datetime!(2024-01-01 12:00 UTC);

	for url in ["c", "a", "d", "b"] {
		annotations::insert_annotation(&db.pool, &row(url, "p1", edited))
			.await
			.expect("Failed to insert annotation.");
	}

	annotations::insert_annotation(&db.pool, &row("z", "p2", edited))
		.await
		.expect("Failed to insert annotation.");

	let first = annotations::page_annotation_keys(&db.pool, "p1", None, None, 0, 3)
		.await
		.expect("Failed to list keys.");
	let rest = annotations::page_annotation_keys(&db.pool, "p1", None, None, 3, 3)
		.await
		.expect("Failed to list keys.");

	assert_eq!(first, vec!["a", "b", "c"]);
	assert_eq!(rest, vec!["d"]);

	let windowed = annotations::page_annotation_keys(
		&db.pool,
		"p1",
		Some(edited),
		None,
		0,
		10,
	)
	.await
	.expect("Failed to list keys.");

	assert!(windowed.is_empty(), "Creation time precedes the window start.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set GLEAN_PG_DSN to run."]
async fn edit_windows_respect_upper_inclusivity() {
	let Some(base_dsn) = glean_testkit::env_dsn() else {
		eprintln!("Skipping edit_windows_respect_upper_inclusivity; set GLEAN_PG_DSN to run this test.");

		return;
	};
	let test_db =
		glean_testkit::TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = Db::connect(&test_db.postgres_config()).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let upper = datetime!(2024-01-10 0:00 UTC);
	let lower = datetime!(2024-01-09 0:00 UTC);

	for (url, edited) in [("upper", upper), ("lower", lower), ("inside", lower + Duration::hours(5))] {
		annotations::insert_annotation(&db.pool, &row(url, "p1", edited))
			.await
			.expect("Failed to insert annotation.");
	}

	let inclusive = annotations::annotations_edited_between(&db.pool, lower, upper, true)
		.await
		.expect("Failed to query window.");
	let exclusive = annotations::annotations_edited_between(&db.pool, lower, upper, false)
		.await
		.expect("Failed to query window.");
	let urls = |rows: &[AnnotationRow]| rows.iter().map(|row| row.url.clone()).collect::<Vec<_>>();

	assert_eq!(urls(&inclusive), vec!["upper", "inside", "lower"]);
	assert_eq!(urls(&exclusive), vec!["inside", "lower"]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set GLEAN_PG_DSN to run."]
async fn resolves_bookmarks_tags_and_lists_by_key() {
	let Some(base_dsn) = glean_testkit::env_dsn() else {
		eprintln!(
			"Skipping resolves_bookmarks_tags_and_lists_by_key; set GLEAN_PG_DSN to run this test."
		);

		return;
	};
	let test_db =
		glean_testkit::TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = Db::connect(&test_db.postgres_config()).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let edited = datetime!(2024-01-01 12:00 UTC);

	for url in ["a", "b", "c"] {
		annotations::insert_annotation(&db.pool, &row(url, "p1", edited))
			.await
			.expect("Failed to insert annotation.");
	}

	annotations::insert_bookmark(&db.pool, "b", edited).await.expect("Failed to bookmark.");
	annotations::insert_bookmark(&db.pool, "b", edited).await.expect("Bookmarks are idempotent.");
	annotations::insert_tag(&db.pool, "x", "a").await.expect("Failed to tag.");
	annotations::insert_tag(&db.pool, "y", "a").await.expect("Failed to tag.");

	let list_id = annotations::ensure_list(&db.pool, "reading").await.expect("Failed to create list.");

	assert_eq!(
		annotations::ensure_list(&db.pool, "reading").await.expect("Failed to resolve list."),
		list_id
	);

	annotations::insert_list_entry(&db.pool, list_id, "c").await.expect("Failed to add entry.");

	let keys: Vec<String> = ["a", "b", "c"].iter().map(|key| key.to_string()).collect();

	assert_eq!(
		annotations::bookmarked_keys(&db.pool, &keys).await.expect("Failed to query bookmarks."),
		vec!["b"]
	);

	let tags = annotations::tag_entries(&db.pool, &keys).await.expect("Failed to query tags.");

	assert_eq!(tags.iter().map(|tag| tag.name.as_str()).collect::<Vec<_>>(), vec!["x", "y"]);
	assert_eq!(
		annotations::list_ids_by_name(&db.pool, &["reading".to_string(), "nope".to_string()])
			.await
			.expect("Failed to resolve lists."),
		vec![list_id]
	);

	let entries = annotations::list_entries(&db.pool, &keys).await.expect("Failed to query entries.");

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].url, "c");

	let resolved =
		annotations::annotations_by_keys(&db.pool, &keys).await.expect("Failed to resolve keys.");

	assert_eq!(resolved.len(), 3);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set GLEAN_PG_DSN to run."]
async fn rejects_edits_before_creation() {
	let Some(base_dsn) = glean_testkit::env_dsn() else {
		eprintln!("Skipping rejects_edits_before_creation; set GLEAN_PG_DSN to run this test.");

		return;
	};
	let test_db =
		glean_testkit::TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = Db::connect(&test_db.postgres_config()).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let mut bad = row("a", "p1", datetime!(2024-01-01 12:00 UTC));

	bad.last_edited = bad.created_at - Duration::minutes(1);

	let err = annotations::insert_annotation(&db.pool, &bad)
		.await
		.expect_err("Edit order must be enforced.");

	assert!(matches!(err, glean_storage::Error::InvalidArgument(_)));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
