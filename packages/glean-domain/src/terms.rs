use std::collections::{BTreeSet, HashSet};

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::annotation::Annotation;

pub fn extract_terms(text: &str) -> BTreeSet<String> {
	let normalized: String = text.nfkc().collect();

	normalized.unicode_words().map(str::to_lowercase).collect()
}

/// Normalizes caller-supplied terms the same way annotation term sets are built.
///
/// Multi-word inputs are split. Order of first appearance is kept and duplicates dropped.
pub fn normalize_terms(raw: &[String]) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for value in raw {
		let normalized: String = value.nfkc().collect();

		for word in normalized.unicode_words() {
			let term = word.to_lowercase();

			if seen.insert(term.clone()) {
				out.push(term);
			}
		}
	}

	out
}

/// Tests whether an annotation carries every term in `terms_inc`.
///
/// With both flags set either term set may satisfy the match. With exactly one flag set
/// only that set is consulted. With neither flag set no term set participates, so nothing
/// can constrain the match and every annotation matches.
pub fn terms_match(
	annotation: &Annotation,
	terms_inc: &[String],
	include_highlights: bool,
	include_notes: bool,
) -> bool {
	let highlights_match =
		!include_highlights || contains_all(annotation.body_terms.as_ref(), terms_inc);
	let notes_match = !include_notes || contains_all(annotation.comment_terms.as_ref(), terms_inc);

	match (include_highlights, include_notes) {
		(true, true) => highlights_match || notes_match,
		(true, false) => highlights_match,
		(false, true) => notes_match,
		(false, false) => true,
	}
}

fn contains_all(terms: Option<&BTreeSet<String>>, required: &[String]) -> bool {
	match terms {
		Some(terms) => required.iter().all(|term| terms.contains(term)),
		None => required.is_empty(),
	}
}
