//! Size-bounded text segmentation.
//!
//! The primary split is by paragraph boundary; a chunk accumulates
//! paragraphs until the next one would overflow the budget. Degenerate
//! input falls back to a generic recursive splitter.

use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	pub chunk_size: usize,
	pub chunk_overlap: usize,
}
impl Default for ChunkingConfig {
	fn default() -> Self {
		Self { chunk_size: 1_000, chunk_overlap: 200 }
	}
}

/// Separator hierarchy for the recursive fallback splitter, coarsest first.
#[derive(Clone, Copy, Debug)]
enum Separator {
	Paragraph,
	Line,
	Sentence,
	Clause,
	Word,
	Char,
}

const SEPARATORS: [Separator; 6] = [
	Separator::Paragraph,
	Separator::Line,
	Separator::Sentence,
	Separator::Clause,
	Separator::Word,
	Separator::Char,
];

/// Split `text` at paragraph boundaries into chunks of at most
/// `cfg.chunk_size` characters (single oversized paragraphs excepted).
///
/// A paragraph that would overflow the running chunk starts the next one,
/// so overlap happens at paragraph granularity rather than by a fixed
/// character count.
pub fn split_semantic(text: &str, cfg: &ChunkingConfig) -> Vec<String> {
	let mut chunks = Vec::new();
	let mut current = String::new();

	for paragraph in text.split("\n\n") {
		let paragraph = paragraph.trim();

		if paragraph.is_empty() {
			continue;
		}

		if !current.is_empty() && current.chars().count() + paragraph.chars().count() > cfg.chunk_size
		{
			chunks.push(std::mem::take(&mut current));
			current.push_str(paragraph);
		} else {
			if !current.is_empty() {
				current.push_str("\n\n");
			}

			current.push_str(paragraph);
		}
	}

	if !current.is_empty() {
		chunks.push(current);
	}

	if chunks.is_empty() {
		tracing::debug!("Paragraph split produced no chunks; using recursive fallback.");

		chunks = split_recursive(text, cfg);
	}

	chunks
}

/// Generic recursive splitter: paragraph, line, sentence, clause, word, then
/// character granularity, with a fixed-size character overlap between
/// adjacent chunks.
pub fn split_recursive(text: &str, cfg: &ChunkingConfig) -> Vec<String> {
	let pieces = split_level(text, cfg, 0);

	pieces.into_iter().filter(|piece| !piece.trim().is_empty()).collect()
}

fn split_level(text: &str, cfg: &ChunkingConfig, level: usize) -> Vec<String> {
	if text.chars().count() <= cfg.chunk_size || level >= SEPARATORS.len() {
		if text.is_empty() {
			return Vec::new();
		}

		return vec![text.to_string()];
	}

	let pieces = split_once(text, SEPARATORS[level]);

	// This level did not divide the text; descend to a finer separator.
	if pieces.len() <= 1 {
		return split_level(text, cfg, level + 1);
	}

	let mut expanded = Vec::new();

	for piece in pieces {
		if piece.chars().count() > cfg.chunk_size {
			expanded.extend(split_level(&piece, cfg, level + 1));
		} else {
			expanded.push(piece);
		}
	}

	merge_pieces(expanded, cfg)
}

fn split_once(text: &str, separator: Separator) -> Vec<String> {
	match separator {
		Separator::Paragraph => split_keeping(text, "\n\n"),
		Separator::Line => split_keeping(text, "\n"),
		Separator::Sentence => text.split_sentence_bounds().map(str::to_string).collect(),
		Separator::Clause => split_keeping(text, ", "),
		Separator::Word => text.split_word_bounds().map(str::to_string).collect(),
		Separator::Char => text.chars().map(String::from).collect(),
	}
}

fn split_keeping(text: &str, separator: &str) -> Vec<String> {
	let mut pieces: Vec<String> =
		text.split(separator).map(|piece| format!("{piece}{separator}")).collect();

	if let Some(last) = pieces.last_mut() {
		*last = last.trim_end_matches(separator).to_string();
	}

	pieces
}

/// Greedily pack pieces into chunks within the size budget, carrying a
/// character-overlap tail from each finished chunk into the next.
fn merge_pieces(pieces: Vec<String>, cfg: &ChunkingConfig) -> Vec<String> {
	let mut chunks = Vec::new();
	let mut current = String::new();
	let mut current_len = 0usize;

	for piece in pieces {
		let piece_len = piece.chars().count();

		if current_len > 0 && current_len + piece_len > cfg.chunk_size {
			chunks.push(current.clone());

			let tail = overlap_tail(&current, cfg.chunk_overlap);

			current_len = tail.chars().count();
			current = tail;
		}

		current.push_str(&piece);

		current_len += piece_len;
	}

	if !current.trim().is_empty() {
		chunks.push(current);
	}

	chunks
}

fn overlap_tail(text: &str, overlap: usize) -> String {
	if overlap == 0 {
		return String::new();
	}

	let chars: Vec<char> = text.chars().collect();
	let start = chars.len().saturating_sub(overlap);

	chars[start..].iter().collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accumulates_paragraphs_until_budget() {
		let cfg = ChunkingConfig { chunk_size: 50, chunk_overlap: 10 };
		let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";
		let chunks = split_semantic(text, &cfg);

		assert_eq!(chunks.len(), 2);
		assert!(chunks[0].contains("First paragraph"));
		assert!(chunks[0].contains("Second paragraph"));
		assert!(chunks[1].contains("Third paragraph"));
	}

	#[test]
	fn small_text_is_a_single_chunk() {
		let cfg = ChunkingConfig::default();
		let chunks = split_semantic("Satu paragraf saja.", &cfg);

		assert_eq!(chunks, vec!["Satu paragraf saja.".to_string()]);
	}

	#[test]
	fn overflow_paragraph_starts_the_next_chunk() {
		let cfg = ChunkingConfig { chunk_size: 30, chunk_overlap: 5 };
		let text = "aaaa aaaa aaaa aaaa.\n\nbbbb bbbb bbbb bbbb.";
		let chunks = split_semantic(text, &cfg);

		assert_eq!(chunks.len(), 2);
		assert!(chunks[1].starts_with("bbbb"));
	}

	#[test]
	fn blank_input_falls_back_without_panicking() {
		let cfg = ChunkingConfig { chunk_size: 100, chunk_overlap: 20 };

		assert!(split_semantic("", &cfg).is_empty());
		assert!(split_semantic("\n\n\n\n", &cfg).is_empty());
	}

	#[test]
	fn recursive_splitter_respects_budget_on_unbroken_text() {
		let cfg = ChunkingConfig { chunk_size: 40, chunk_overlap: 8 };
		let sentence = "kata ".repeat(40);
		let chunks = split_recursive(&sentence, &cfg);

		assert!(chunks.len() > 1);

		for chunk in &chunks {
			assert!(chunk.chars().count() <= cfg.chunk_size + cfg.chunk_overlap);
		}
	}

	#[test]
	fn recursive_chunks_overlap() {
		let cfg = ChunkingConfig { chunk_size: 40, chunk_overlap: 10 };
		let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
		let chunks = split_recursive(text, &cfg);

		assert!(chunks.len() > 1);

		// The tail of each chunk reappears at the head of the next.
		for window in chunks.windows(2) {
			let tail: String = {
				let chars: Vec<char> = window[0].chars().collect();
				chars[chars.len().saturating_sub(cfg.chunk_overlap)..].iter().collect()
			};

			assert!(window[1].starts_with(&tail));
		}
	}
}
