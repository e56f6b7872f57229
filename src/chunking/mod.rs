//! Text chunking for breaking cleaned pages into searchable fragments.
//!
//! Splits text on semantic boundaries where possible, falling back to finer
//! separators and finally to a hard character split, then packs the pieces
//! into size-bounded fragments that share an overlap window.

use crate::error::{CronistaError, Result};

/// Recursive character splitter.
///
/// Separators are tried coarsest first; a separator is kept attached to the
/// piece it terminates, so concatenating all pieces reproduces the input.
/// Adjacent output fragments share exactly `chunk_overlap` characters: each
/// fragment after the first begins with the previous fragment's trailing
/// overlap text. All sizes are in characters, not bytes.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    /// Create a splitter. Fails if the overlap does not leave room for new
    /// content in each fragment.
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: Vec<String>) -> Result<Self> {
        if chunk_size == 0 {
            return Err(CronistaError::Chunking(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(CronistaError::Chunking(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators,
        })
    }

    /// Split text into ordered, overlapping fragments of at most
    /// `chunk_size` characters. Empty or whitespace-only input yields no
    /// fragments; input within the bound yields a single fragment.
    pub fn split(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        // Pieces are bounded by chunk_size - chunk_overlap so that a piece
        // always fits next to the carried overlap prefix.
        let budget = self.chunk_size - self.chunk_overlap;
        let mut pieces = Vec::new();
        self.split_recursive(text, 0, budget, &mut pieces);

        self.pack(pieces)
    }

    /// Recursively break text into pieces within `budget` characters,
    /// descending through ever finer separators. A missing or empty
    /// separator means a hard character split; a single word longer than
    /// the budget ends up there, so every piece respects the bound.
    fn split_recursive(&self, text: &str, sep_index: usize, budget: usize, out: &mut Vec<String>) {
        if char_len(text) <= budget {
            out.push(text.to_string());
            return;
        }

        let separator = match self.separators.get(sep_index) {
            Some(s) if !s.is_empty() => s,
            _ => {
                hard_split(text, budget, out);
                return;
            }
        };

        let parts = split_keeping_separator(text, separator);
        if parts.len() == 1 {
            self.split_recursive(text, sep_index + 1, budget, out);
            return;
        }

        for part in parts {
            if char_len(part) <= budget {
                out.push(part.to_string());
            } else {
                self.split_recursive(part, sep_index + 1, budget, out);
            }
        }
    }

    /// Pack pieces into fragments, carrying the trailing overlap of each
    /// closed fragment into the next one.
    fn pack(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for piece in pieces {
            let piece_len = char_len(&piece);
            if !current.is_empty() && current_len + piece_len > self.chunk_size {
                let tail = char_suffix(&current, self.chunk_overlap);
                chunks.push(std::mem::take(&mut current));
                current_len = char_len(&tail);
                current = tail;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The last `n` characters of a string.
fn char_suffix(s: &str, n: usize) -> String {
    let len = char_len(s);
    s.chars().skip(len.saturating_sub(n)).collect()
}

/// Split into fixed character windows of at most `budget`.
fn hard_split(text: &str, budget: usize, out: &mut Vec<String>) {
    let mut window = String::new();
    let mut count = 0;

    for ch in text.chars() {
        window.push(ch);
        count += 1;
        if count == budget {
            out.push(std::mem::take(&mut window));
            count = 0;
        }
    }

    if !window.is_empty() {
        out.push(window);
    }
}

/// Split on a separator, attaching each separator occurrence to the piece it
/// ends. Concatenating the result reproduces the input exactly.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        parts.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        parts.push(&text[start..]);
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_separators() -> Vec<String> {
        vec![
            "\n\n".to_string(),
            "\n".to_string(),
            ".".to_string(),
            "!".to_string(),
            "?".to_string(),
            " ".to_string(),
            String::new(),
        ]
    }

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> TextSplitter {
        TextSplitter::new(chunk_size, chunk_overlap, default_separators()).unwrap()
    }

    /// Check the shared-overlap property over every adjacent pair.
    fn assert_overlap_carried(chunks: &[String], overlap: usize) {
        for pair in chunks.windows(2) {
            let tail = char_suffix(&pair[0], overlap);
            let head: String = pair[1].chars().take(char_len(&tail)).collect();
            assert_eq!(tail, head, "adjacent chunks do not share overlap text");
        }
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(TextSplitter::new(10, 10, default_separators()).is_err());
        assert!(TextSplitter::new(0, 0, default_separators()).is_err());
        assert!(TextSplitter::new(10, 3, default_separators()).is_ok());
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let splitter = splitter(400, 50);
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n\t ").is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = splitter(400, 50);
        let chunks = splitter.split("A. B. C.");
        assert_eq!(chunks, vec!["A. B. C.".to_string()]);
    }

    #[test]
    fn test_chunks_respect_size_bound() {
        let text = "La batalla de Ayacucho fue el último gran enfrentamiento. \
                    Tuvo lugar en la Pampa de Quinua el nueve de diciembre. \
                    Supuso el final del dominio colonial en Sudamérica. \
                    Las tropas realistas superaban en número a las patriotas."
            .to_string();
        let splitter = splitter(80, 20);

        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                char_len(chunk) <= 80,
                "chunk exceeds bound: {:?} ({} chars)",
                chunk,
                char_len(chunk)
            );
        }
        assert_overlap_carried(&chunks, 20);
    }

    #[test]
    fn test_prefers_sentence_boundaries() {
        let text = "Uno dos tres. Cuatro cinco seis. Siete ocho nueve.";
        let splitter = splitter(25, 5);

        let chunks = splitter.split(text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.ends_with('.'), "chunk not sentence-aligned: {:?}", chunk);
        }
        assert_overlap_carried(&chunks, 5);
    }

    #[test]
    fn test_prefers_paragraph_boundary_over_finer_splits() {
        let text = "Primera parte.\n\nSegunda parte.";
        let splitter = splitter(20, 4);

        let chunks = splitter.split(text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].ends_with("\n\n"));
        assert!(chunks[1].ends_with("Segunda parte."));
        assert_overlap_carried(&chunks, 4);
    }

    #[test]
    fn test_hard_split_of_word_longer_than_bound() {
        // No separator helps here; the splitter must fall back to fixed
        // character windows that still respect the bound.
        let word: String = ('a'..='z').cycle().take(100).collect();
        let splitter = splitter(30, 5);

        let chunks = splitter.split(&word);
        assert_eq!(chunks.len(), 4);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 30);
        }
        assert_overlap_carried(&chunks, 5);

        // Dropping each carried overlap prefix reconstructs the original.
        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(5));
        }
        assert_eq!(rebuilt, word);
    }

    #[test]
    fn test_unicode_lengths_counted_in_chars() {
        let text = "ñandú ñandú ñandú ñandú ñandú ñandú ñandú ñandú";
        let splitter = splitter(20, 4);

        for chunk in splitter.split(text) {
            assert!(char_len(&chunk) <= 20);
        }
    }

    #[test]
    fn test_split_keeping_separator_reproduces_input() {
        let text = "A. B. C.";
        let parts = split_keeping_separator(text, ".");
        assert_eq!(parts, vec!["A.", " B.", " C."]);
        assert_eq!(parts.concat(), text);
    }
}
