//! Page records built from fetched content, and the URL helpers that key them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::terms;

/// Content extracted from a fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
	pub title: Option<String>,
	pub description: Option<String>,
	pub full_text: Option<String>,
	pub fav_icon_uri: Option<String>,
}

/// A page ready to be stored or merged into a sync entry.
///
/// `fav_icon_uri` never serializes; favicons are persisted separately by hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
	pub url: String,
	pub full_url: String,
	pub full_title: String,
	pub domain: String,
	pub hostname: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	#[serde(default)]
	pub url_terms: BTreeSet<String>,
	#[serde(default)]
	pub title_terms: BTreeSet<String>,
	/// Terms of the page text. Empty when no text was extracted.
	#[serde(default)]
	pub terms: BTreeSet<String>,
	#[serde(skip)]
	pub fav_icon_uri: Option<String>,
}
impl PageRecord {
	pub fn take_fav_icon(&mut self) -> Option<String> {
		self.fav_icon_uri.take()
	}
}

pub fn build_page_record(full_url: &str, content: PageContent) -> PageRecord {
	let full_url = without_credentials(full_url.trim());
	let url = normalize_url(&full_url);
	let host = hostname(&full_url);
	let full_title = non_blank(content.title).unwrap_or_else(|| full_url.clone());
	let text = non_blank(content.full_text);

	PageRecord {
		url_terms: url_terms(&url),
		title_terms: terms::extract_terms(&full_title),
		terms: text.as_deref().map(terms::extract_terms).unwrap_or_default(),
		url,
		full_url,
		full_title,
		domain: domain(&host),
		hostname: host,
		description: non_blank(content.description),
		text,
		fav_icon_uri: non_blank(content.fav_icon_uri),
	}
}

/// The minimal record used when a page's content can never be fetched.
///
/// It still carries URL terms, so the page stays findable by its address.
pub fn stub_page_record(full_url: &str) -> PageRecord {
	build_page_record(full_url, PageContent::default())
}

/// The page key: host without `www.`, a non-default port, path and query.
///
/// Scheme, credentials, fragment and trailing slashes are dropped.
pub fn normalize_url(full_url: &str) -> String {
	let Some(parsed) = parse(full_url) else {
		return full_url.trim().trim_end_matches('/').to_lowercase();
	};
	let host = parsed.host_str().unwrap_or_default();
	let mut out = host.strip_prefix("www.").unwrap_or(host).to_string();

	if let Some(port) = parsed.port() {
		out = format!("{out}:{port}");
	}

	out.push_str(parsed.path());

	if let Some(query) = parsed.query() {
		out.push('?');
		out.push_str(query);
	}

	while out.ends_with('/') {
		out.pop();
	}

	out
}

pub fn hostname(full_url: &str) -> String {
	parse(full_url)
		.and_then(|parsed| {
			parsed.host_str().map(|host| host.trim_start_matches('[').trim_end_matches(']').to_string())
		})
		.unwrap_or_default()
}

/// Parses `full_url`, assuming `http` when no scheme is given.
fn parse(full_url: &str) -> Option<Url> {
	let trimmed = full_url.trim();

	match Url::parse(trimmed) {
		Ok(parsed) if parsed.has_host() => Some(parsed),
		_ => Url::parse(&format!("http://{trimmed}")).ok().filter(Url::has_host),
	}
}

/// Removes any `user:password@` part; other URLs are returned as given.
fn without_credentials(full_url: &str) -> String {
	match Url::parse(full_url) {
		Ok(mut parsed) if !parsed.username().is_empty() || parsed.password().is_some() => {
			// Both setters only fail for URLs without a host, which never carry credentials.
			let _ = parsed.set_username("");
			let _ = parsed.set_password(None);

			parsed.to_string()
		},
		_ => full_url.to_string(),
	}
}

/// Splits a page key on every non-alphanumeric character before term extraction.
fn url_terms(url: &str) -> BTreeSet<String> {
	let spaced: String =
		url.chars().map(|ch| if ch.is_alphanumeric() { ch } else { ' ' }).collect();

	terms::extract_terms(&spaced)
}

/// Registrable domain approximation: the last two labels, or three under a
/// two-letter country code with a short second-level label such as `co.uk`.
pub fn domain(hostname: &str) -> String {
	if hostname.parse::<std::net::IpAddr>().is_ok() {
		return hostname.to_string();
	}

	let labels: Vec<&str> = hostname.split('.').filter(|label| !label.is_empty()).collect();
	let keep = match labels.as_slice() {
		[.., second, tld] if labels.len() > 2 && tld.len() == 2 && is_generic_second_level(second) =>
			3,
		_ => 2,
	};

	labels[labels.len().saturating_sub(keep)..].join(".")
}

fn is_generic_second_level(label: &str) -> bool {
	matches!(label, "co" | "com" | "net" | "org" | "gov" | "edu" | "ac" | "or" | "ne" | "go")
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}
