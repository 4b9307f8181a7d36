//! Language detection for the primary corpus language.
//!
//! This is a frequency heuristic over Indonesian function words, not a
//! language identifier. Short samples routinely fall back to English.

use std::{str::FromStr, sync::OnceLock};

use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Number of characters sampled from the head of a document.
pub const SAMPLE_WINDOW: usize = 500;

/// Distinct function-word patterns required to classify a sample as Indonesian.
const MIN_DISTINCT_MATCHES: usize = 3;

const ID_FUNCTION_WORDS: [&str; 9] = [
	r"\byang\b",
	r"\bdan\b",
	r"\bdi\b",
	r"\bke\b",
	r"\bdari\b",
	r"\bdengan\b",
	r"\buntuk\b",
	r"\bpada\b",
	r"\badalah\b",
];

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
	#[default]
	Id,
	En,
}
impl Language {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Id => "id",
			Self::En => "en",
		}
	}

	/// Region is derived from language alone; there is no independent
	/// region model.
	pub fn region(self) -> &'static str {
		match self {
			Self::Id => "nusantara",
			Self::En => "global",
		}
	}
}
impl FromStr for Language {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value {
			"id" => Ok(Self::Id),
			"en" => Ok(Self::En),
			_ => Err(Error::UnknownVocabulary { field: "language", value: value.to_string() }),
		}
	}
}

fn function_words() -> &'static RegexSet {
	static SET: OnceLock<RegexSet> = OnceLock::new();

	SET.get_or_init(|| RegexSet::new(ID_FUNCTION_WORDS).expect("static patterns are valid"))
}

/// Detect the primary language of a text sample.
///
/// Counts how many distinct Indonesian function-word patterns occur within
/// the first [`SAMPLE_WINDOW`] characters; three or more distinct hits
/// classify the sample as Indonesian.
pub fn detect(text: &str) -> Language {
	let sample: String = text.chars().take(SAMPLE_WINDOW).collect::<String>().to_lowercase();
	let distinct = function_words().matches(&sample).iter().count();

	if distinct >= MIN_DISTINCT_MATCHES { Language::Id } else { Language::En }
}
