//! Set-narrowing predicates over annotation keys.
//!
//! Every function keeps the caller's key order so paginated callers can slice the result.

use std::collections::HashSet;

use crate::annotation::{ListEntry, TagEntry};

pub fn retain_bookmarked(keys: Vec<String>, bookmarked: &HashSet<String>) -> Vec<String> {
	keys.into_iter().filter(|key| bookmarked.contains(key)).collect()
}

/// Narrows `keys` by tag entries.
///
/// Works at entry level: entries named in `tags_exc` are discarded first, then only entries
/// named in `tags_inc` are kept, and a key survives when at least one of its entries does.
/// With both lists empty the input is returned unchanged.
pub fn retain_tagged(
	keys: Vec<String>,
	entries: &[TagEntry],
	tags_inc: &[String],
	tags_exc: &[String],
) -> Vec<String> {
	if tags_inc.is_empty() && tags_exc.is_empty() {
		return keys;
	}

	let exc: HashSet<&str> = tags_exc.iter().map(String::as_str).collect();
	let inc: HashSet<&str> = tags_inc.iter().map(String::as_str).collect();
	let surviving: HashSet<&str> = entries
		.iter()
		.filter(|entry| !exc.contains(entry.name.as_str()))
		.filter(|entry| inc.is_empty() || inc.contains(entry.name.as_str()))
		.map(|entry| entry.url.as_str())
		.collect();

	keys.into_iter().filter(|key| surviving.contains(key.as_str())).collect()
}

pub fn retain_in_lists(keys: Vec<String>, list_ids: &[i64], entries: &[ListEntry]) -> Vec<String> {
	let lists: HashSet<i64> = list_ids.iter().copied().collect();
	let member: HashSet<&str> = entries
		.iter()
		.filter(|entry| lists.contains(&entry.list_id))
		.map(|entry| entry.url.as_str())
		.collect();

	keys.into_iter().filter(|key| member.contains(key.as_str())).collect()
}
