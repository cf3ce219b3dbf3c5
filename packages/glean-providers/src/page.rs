use std::time::Duration as StdDuration;

use reqwest::{Client, Url, header::CONTENT_TYPE};

use crate::{Error, Result, html};

/// A successfully fetched page, with its favicon already resolved to an absolute URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
	pub title: Option<String>,
	pub description: Option<String>,
	pub text: Option<String>,
	pub fav_icon_uri: Option<String>,
}

pub async fn fetch(cfg: &glean_config::Fetcher, url: &str) -> Result<FetchedPage> {
	let target = parse_url(url)?;
	let client = Client::builder()
		.timeout(StdDuration::from_millis(cfg.timeout_ms))
		.user_agent(cfg.user_agent.as_str())
		.build()
		.map_err(|err| Error::InvalidConfig {
			message: format!("Failed to build HTTP client: {err}."),
		})?;
	let mut res = client.get(target).send().await?;
	let status = res.status();

	if !status.is_success() {
		return Err(Error::from_status(status));
	}

	check_content_type(res.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()))?;

	if let Some(length) = res.content_length()
		&& length > cfg.max_body_bytes
	{
		return Err(Error::permanent(format!(
			"Body of {length} bytes exceeds the {} byte limit.",
			cfg.max_body_bytes
		)));
	}

	let final_url = res.url().clone();
	let mut body = Vec::new();

	while let Some(chunk) = res.chunk().await? {
		if (body.len() + chunk.len()) as u64 > cfg.max_body_bytes {
			return Err(Error::permanent(format!(
				"Body exceeds the {} byte limit.",
				cfg.max_body_bytes
			)));
		}

		body.extend_from_slice(&chunk);
	}

	let extracted = html::extract(&String::from_utf8_lossy(&body));

	if extracted.title.is_none() && extracted.text.is_none() {
		return Err(Error::permanent(format!("No title or text found at {final_url}.")));
	}

	let fav_icon_uri = if cfg.include_fav_icon {
		resolve_fav_icon(&final_url, extracted.fav_icon_href.as_deref())
	} else {
		None
	};

	tracing::debug!(url = %final_url, bytes = body.len(), "Fetched page.");

	Ok(FetchedPage {
		title: extracted.title,
		description: extracted.description,
		text: extracted.text,
		fav_icon_uri,
	})
}

fn parse_url(url: &str) -> Result<Url> {
	let parsed = Url::parse(url.trim())
		.map_err(|err| Error::permanent(format!("Invalid URL {url:?}: {err}.")))?;

	match parsed.scheme() {
		"http" | "https" => Ok(parsed),
		scheme => Err(Error::permanent(format!("Unsupported URL scheme {scheme:?}."))),
	}
}

fn check_content_type(content_type: Option<&str>) -> Result<()> {
	let Some(content_type) = content_type else {
		return Ok(());
	};
	let mime = content_type.split(';').next().unwrap_or_default().trim().to_lowercase();

	if mime.is_empty() || mime == "text/html" || mime == "application/xhtml+xml" {
		Ok(())
	} else {
		Err(Error::permanent(format!("Unsupported content type {mime:?}.")))
	}
}

fn resolve_fav_icon(base: &Url, href: Option<&str>) -> Option<String> {
	href.and_then(|href| base.join(href).ok())
		.or_else(|| base.join("/favicon.ico").ok())
		.filter(|url| matches!(url.scheme(), "http" | "https" | "data"))
		.map(String::from)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cfg() -> glean_config::Fetcher {
		glean_config::Fetcher {
			timeout_ms: 1_000,
			user_agent: "glean-test".to_string(),
			include_fav_icon: true,
			max_body_bytes: 1_024,
		}
	}

	#[test]
	fn rejects_non_http_urls_permanently() {
		assert!(!parse_url("not a url").expect_err("Must fail.").is_temporary());
		assert!(!parse_url("ftp://x.com/file").expect_err("Must fail.").is_temporary());
		assert!(parse_url(" http://x.com ").is_ok());
	}

	#[test]
	fn accepts_html_content_types_only() {
		assert!(check_content_type(None).is_ok());
		assert!(check_content_type(Some("text/html; charset=utf-8")).is_ok());
		assert!(check_content_type(Some("application/xhtml+xml")).is_ok());
		assert!(check_content_type(Some("application/pdf")).is_err());
	}

	#[test]
	fn resolves_fav_icons_against_final_url() {
		let base = Url::parse("https://x.com/a/b/page.html").expect("Valid URL.");

		assert_eq!(
			resolve_fav_icon(&base, Some("icon.png")).as_deref(),
			Some("https://x.com/a/b/icon.png")
		);
		assert_eq!(
			resolve_fav_icon(&base, Some("//cdn.x.com/i.ico")).as_deref(),
			Some("https://cdn.x.com/i.ico")
		);
		assert_eq!(resolve_fav_icon(&base, None).as_deref(), Some("https://x.com/favicon.ico"));
	}

	#[tokio::test]
	async fn unreachable_hosts_are_temporary() {
		let err = fetch(&cfg(), "http://127.0.0.1:1/").await.expect_err("Nothing listens on port 1.");

		assert!(err.is_temporary(), "Unexpected error: {err}");
	}
}
