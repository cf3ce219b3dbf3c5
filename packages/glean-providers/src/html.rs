//! Lightweight HTML metadata and text extraction.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static COMMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<!--.*?-->"));
static HIDDEN_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
	compile(r"(?is)<(script|style|noscript|template)\b[^>]*>.*?</(script|style|noscript|template)\s*>")
});
static HEAD: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<head\b[^>]*>.*?</head\s*>"));
static BODY: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<body\b[^>]*>(.*)</body\s*>"));
static TITLE: LazyLock<Regex> =
	LazyLock::new(|| compile(r"(?is)<title\b[^>]*>(.*?)</title\s*>"));
static META: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<meta\b[^>]*>"));
static LINK: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<link\b[^>]*>"));
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
	compile(r#"(?is)([a-z][a-z0-9_:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
});
static TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<[^>]*>"));
static ENTITY: LazyLock<Regex> =
	LazyLock::new(|| compile(r"(?i)&(#x[0-9a-f]+|#[0-9]+|amp|lt|gt|quot|apos|nbsp);"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
	pub title: Option<String>,
	pub description: Option<String>,
	pub text: Option<String>,
	/// Raw `href` of the first icon link, unresolved.
	pub fav_icon_href: Option<String>,
}

pub fn extract(html: &str) -> Extracted {
	let cleaned = COMMENT.replace_all(html, " ");
	let cleaned = HIDDEN_BLOCK.replace_all(&cleaned, " ");
	let mut meta_title = None;
	let mut description = None;

	for tag in META.find_iter(&cleaned) {
		let attrs = attributes(tag.as_str());
		let key = attr(&attrs, "name").or_else(|| attr(&attrs, "property")).unwrap_or_default();
		let content = attr(&attrs, "content").map(|value| clean_text(&value));

		match key.to_lowercase().as_str() {
			"description" | "og:description" if description.is_none() =>
				description = content.filter(|value| !value.is_empty()),
			"og:title" if meta_title.is_none() =>
				meta_title = content.filter(|value| !value.is_empty()),
			_ => {},
		}
	}

	let fav_icon_href = LINK.find_iter(&cleaned).find_map(|tag| {
		let attrs = attributes(tag.as_str());
		let rel = attr(&attrs, "rel")?.to_lowercase();

		if rel.split_whitespace().any(|part| part == "icon") {
			attr(&attrs, "href").map(|href| href.trim().to_string()).filter(|href| !href.is_empty())
		} else {
			None
		}
	});
	let title = TITLE
		.captures(&cleaned)
		.map(|caps| clean_text(&caps[1]))
		.filter(|value| !value.is_empty())
		.or(meta_title);
	let body = match BODY.captures(&cleaned) {
		Some(caps) => caps[1].to_string(),
		None => HEAD.replace_all(&cleaned, " ").into_owned(),
	};
	let text = Some(clean_text(&TAG.replace_all(&body, " "))).filter(|value| !value.is_empty());

	Extracted { title, description, text, fav_icon_href }
}

fn compile(pattern: &str) -> Regex {
	Regex::new(pattern).expect("Static HTML pattern must compile.")
}

fn attributes(tag: &str) -> Vec<(String, String)> {
	ATTRIBUTE
		.captures_iter(tag)
		.map(|caps| {
			let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4));

			(caps[1].to_lowercase(), value.map(|m| m.as_str().to_string()).unwrap_or_default())
		})
		.collect()
}

fn attr(attrs: &[(String, String)], name: &str) -> Option<String> {
	attrs.iter().find(|(key, _)| key == name).map(|(_, value)| value.clone())
}

fn clean_text(raw: &str) -> String {
	let decoded = decode_entities(raw);

	WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(raw: &str) -> String {
	ENTITY
		.replace_all(raw, |caps: &Captures| {
			let name = caps[1].to_lowercase();
			let decoded = match name.as_str() {
				"amp" => Some('&'),
				"lt" => Some('<'),
				"gt" => Some('>'),
				"quot" => Some('"'),
				"apos" => Some('\''),
				"nbsp" => Some(' '),
				_ => {
					let code = match name.strip_prefix("#x") {
						Some(hex) => u32::from_str_radix(hex, 16).ok(),
						None => name.strip_prefix('#').and_then(|dec| dec.parse().ok()),
					};

					code.and_then(char::from_u32)
				},
			};

			decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
		})
		.into_owned()
}
