//! Lexicon-based discourse classification.
//!
//! Heuristic cue matching over Indonesian and English function phrases.
//! False positives are expected; the classifier trait exists so lexicons
//! can be swapped or extended per language without touching the engine.

use regex::{Regex, RegexSet};

use pustaka_domain::{ChunkRole, DiscoursePosition, DiscourseTags};

const QUESTION_CUES: [&str; 13] = [
	"bagaimana", "mengapa", "apa", "siapa", "kapan", "dimana", "how", "why", "what", "who", "when",
	"where", r"\?",
];

const DEFINITION_CUES: [&str; 6] =
	["adalah", "merupakan", "didefinisikan", "is defined as", "refers to", "means"];

const EXAMPLE_CUES: [&str; 6] =
	["misalnya", "contohnya", "sebagai contoh", "for example", "for instance", "such as"];

const COUNTER_CUES: [&str; 8] = [
	"namun",
	"tetapi",
	"akan tetapi",
	"sebaliknya",
	"however",
	"but",
	"nevertheless",
	"on the contrary",
];

const ARGUMENT_CUES: [&str; 6] =
	["oleh karena itu", "maka", "dengan demikian", "therefore", "thus", "consequently"];

const NARRATIVE_CUES: [&str; 4] = [r"\btelah\b", r"\bpernah\b", r"\bdahulu\b", r"\bhistory\b"];

const CRITICAL_CUES: [&str; 9] =
	["masalah", "kritik", "problem", "issue", "concern", "tidak", "bukan", "not", "never"];

const SUPPORTIVE_CUES: [&str; 8] =
	["mendukung", "setuju", "positif", "support", "agree", "baik", "good", "beneficial"];

const THEME_KEYWORDS: [(&str, &[&str]); 7] = [
	("technology", &["teknologi", "digital", "internet", "technology", "software"]),
	("power", &["kekuasaan", "hegemoni", "dominasi", "power", "hegemony"]),
	("culture", &["budaya", "kultur", "tradisi", "culture", "tradition"]),
	("language", &["bahasa", "linguistik", "language", "linguistic"]),
	("identity", &["identitas", "jati diri", "identity", "self"]),
	("colonialism", &["kolonial", "penjajah", "colonial", "imperialism"]),
	("resistance", &["perlawanan", "resistensi", "resistance", "opposition"]),
];

const CITATION_SHAPES: [&str; 4] = [r"\(\d{4}\)", r"\[\d+\]", r"et al\.", r"ibid"];

/// Assigns discourse tags to a text unit.
pub trait DiscourseClassifier
where
	Self: Send + Sync,
{
	fn classify(&self, text: &str) -> DiscourseTags;
}

/// Default classifier over the fixed cue lexicons above.
pub struct LexiconClassifier {
	question: RegexSet,
	definition: RegexSet,
	example: RegexSet,
	counter: RegexSet,
	argument: RegexSet,
	narrative: RegexSet,
	critical: RegexSet,
	supportive: RegexSet,
	themes: Vec<(&'static str, RegexSet)>,
	citation: Regex,
}
impl LexiconClassifier {
	pub fn new() -> Self {
		let set = |patterns: &[&str]| RegexSet::new(patterns).expect("static patterns are valid");

		Self {
			question: set(&QUESTION_CUES),
			definition: set(&DEFINITION_CUES),
			example: set(&EXAMPLE_CUES),
			counter: set(&COUNTER_CUES),
			argument: set(&ARGUMENT_CUES),
			narrative: set(&NARRATIVE_CUES),
			critical: set(&CRITICAL_CUES),
			supportive: set(&SUPPORTIVE_CUES),
			themes: THEME_KEYWORDS
				.iter()
				.map(|(name, patterns)| {
					(*name, RegexSet::new(*patterns).expect("static patterns are valid"))
				})
				.collect(),
			citation: Regex::new(&CITATION_SHAPES.join("|")).expect("static patterns are valid"),
		}
	}

	/// Priority-ordered first match: question, definition, example,
	/// counter-argument, argument, narrative, unknown.
	pub fn classify_role(&self, text: &str) -> ChunkRole {
		let lowered = text.to_lowercase();

		if self.question.is_match(&lowered) {
			ChunkRole::Question
		} else if self.definition.is_match(&lowered) {
			ChunkRole::Definition
		} else if self.example.is_match(&lowered) {
			ChunkRole::Example
		} else if self.counter.is_match(&lowered) {
			ChunkRole::CounterArgument
		} else if self.argument.is_match(&lowered) {
			ChunkRole::Argument
		} else if self.narrative.is_match(&lowered) {
			ChunkRole::Narrative
		} else {
			ChunkRole::Unknown
		}
	}

	/// Role-forced stance for counter-arguments and questions; otherwise the
	/// side with strictly more distinct lexicon hits wins, ties are neutral.
	pub fn classify_position(&self, text: &str, role: ChunkRole) -> DiscoursePosition {
		match role {
			ChunkRole::CounterArgument => return DiscoursePosition::Critical,
			ChunkRole::Question => return DiscoursePosition::Questioning,
			_ => {},
		}

		let lowered = text.to_lowercase();
		let critical = self.critical.matches(&lowered).iter().count();
		let supportive = self.supportive.matches(&lowered).iter().count();

		if critical > supportive {
			DiscoursePosition::Critical
		} else if supportive > critical {
			DiscoursePosition::Supportive
		} else {
			DiscoursePosition::Neutral
		}
	}

	/// Independent membership test per theme; a chunk may carry zero or many.
	pub fn extract_themes(&self, text: &str) -> Vec<String> {
		let lowered = text.to_lowercase();

		self.themes
			.iter()
			.filter(|(_, set)| set.is_match(&lowered))
			.map(|(name, _)| name.to_string())
			.collect()
	}

	pub fn detect_citation(&self, text: &str) -> bool {
		self.citation.is_match(text)
	}
}
impl Default for LexiconClassifier {
	fn default() -> Self {
		Self::new()
	}
}
impl DiscourseClassifier for LexiconClassifier {
	fn classify(&self, text: &str) -> DiscourseTags {
		let chunk_role = self.classify_role(text);

		DiscourseTags {
			chunk_role,
			discourse_position: self.classify_position(text, chunk_role),
			themes: self.extract_themes(text),
			has_citation: self.detect_citation(text),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn classifier() -> LexiconClassifier {
		LexiconClassifier::new()
	}

	#[test]
	fn question_cues_outrank_everything() {
		// "mengapa" plus a definition cue; question wins by priority.
		let text = "Mengapa bahasa adalah alat kekuasaan?";

		assert_eq!(classifier().classify_role(text), ChunkRole::Question);
	}

	#[test]
	fn definition_cues_beat_counter_cues() {
		let text = "Hegemoni merupakan bentuk dominasi, namun jarang disadari.";

		assert_eq!(classifier().classify_role(text), ChunkRole::Definition);
	}

	#[test]
	fn counter_argument_is_detected_and_forced_critical() {
		let text = "Namun pendekatan itu menimbulkan masalah baru bagi komunitas.";
		let tags = classifier().classify(text);

		assert_eq!(tags.chunk_role, ChunkRole::CounterArgument);
		assert_eq!(tags.discourse_position, DiscoursePosition::Critical);
	}

	#[test]
	fn questions_are_forced_questioning() {
		let tags = classifier().classify("Bagaimana tradisi lisan bertahan?");

		assert_eq!(tags.chunk_role, ChunkRole::Question);
		assert_eq!(tags.discourse_position, DiscoursePosition::Questioning);
	}

	#[test]
	fn narrative_markers_are_the_last_resort_before_unknown() {
		assert_eq!(
			classifier().classify_role("Dahulu para leluhur menjaga hutan ini."),
			ChunkRole::Narrative,
		);
		assert_eq!(classifier().classify_role("Pohon tumbuh tinggi."), ChunkRole::Unknown);
	}

	#[test]
	fn stance_counts_distinct_lexicon_hits() {
		let c = classifier();

		// Two supportive cues against zero critical cues.
		assert_eq!(
			c.classify_position("Warga mendukung dan setuju.", ChunkRole::Argument),
			DiscoursePosition::Supportive,
		);
		// One of each ties to neutral.
		assert_eq!(
			c.classify_position("Ada masalah, tapi hasilnya baik.", ChunkRole::Argument),
			DiscoursePosition::Neutral,
		);
	}

	#[test]
	fn themes_are_multi_label() {
		let themes =
			classifier().extract_themes("Teknologi digital mengubah budaya dan bahasa daerah.");

		assert_eq!(
			themes,
			vec!["technology".to_string(), "culture".to_string(), "language".to_string()],
		);
	}

	#[test]
	fn themes_may_be_empty() {
		assert!(classifier().extract_themes("Pagi yang cerah di pantai.").is_empty());
	}

	#[test]
	fn citation_shapes() {
		let c = classifier();

		assert!(c.detect_citation("Pendapat ini dikutip dari Anderson (1983)."));
		assert!(c.detect_citation("Lihat referensi [12] untuk detail."));
		assert!(c.detect_citation("Smith et al. berpendapat sebaliknya."));
		assert!(c.detect_citation("ibid., hlm. 44"));
		assert!(!c.detect_citation("Tidak ada rujukan di sini"));
	}
}
