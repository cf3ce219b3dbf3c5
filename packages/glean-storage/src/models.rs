use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnnotationRow {
	pub url: String,
	pub page_url: String,
	pub body: Option<String>,
	pub comment: Option<String>,
	pub body_terms: Option<Vec<String>>,
	pub comment_terms: Option<Vec<String>>,
	pub created_at: OffsetDateTime,
	pub last_edited: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagRow {
	pub name: String,
	pub url: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListEntryRow {
	pub list_id: i64,
	pub url: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PageRow {
	pub url: String,
	pub full_url: String,
	pub full_title: String,
	pub domain: String,
	pub hostname: String,
	pub description: Option<String>,
	pub text: Option<String>,
	pub url_terms: Vec<String>,
	pub title_terms: Vec<String>,
	pub terms: Vec<String>,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BacklogEntry {
	pub entry_id: Uuid,
	pub url: String,
	pub times_retried: i32,
	pub last_retry: Option<OffsetDateTime>,
	pub available_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
}
