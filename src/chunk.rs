//! Character-window text chunker.
//!
//! Splits document text into pieces of at most `max_chars` characters with
//! a configurable overlap between consecutive pieces. Windows are cut back
//! to the last space so a window never ends mid-word. Whitespace is
//! normalized first, so chunk boundaries are stable regardless of the
//! source's line wrapping.

/// Drop lines that carry no content: empty or at most three characters
/// after trimming (page numbers, stray bullets, OCR debris).
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > 3)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `text` into chunks of at most `max_chars` characters, overlapping
/// consecutive chunks by roughly `overlap` characters. Blank input yields
/// no chunks. Counts are in characters, not bytes, so multibyte text is
/// split safely.
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() <= max_chars {
        return vec![normalized];
    }

    let mut chunks = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let end = (i + max_chars).min(chars.len());

        // Not at the end of the text: cut back to the last space so the
        // window does not split a word.
        let mut piece_end = end;
        if end < chars.len() {
            if let Some(pos) = chars[i..end].iter().rposition(|c| *c == ' ') {
                if pos > 0 {
                    piece_end = i + pos;
                }
            }
        }

        let piece: String = chars[i..piece_end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        // Advance the window, keeping `overlap` characters of context.
        i += (piece_end - i).saturating_sub(overlap).max(1);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_single_chunk() {
        let chunks = chunk_text("Hello, world!", 1200, 150);
        assert_eq!(chunks, vec!["Hello, world!".to_string()]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(chunk_text("", 1200, 150).is_empty());
        assert!(chunk_text("   \n\t ", 1200, 150).is_empty());
    }

    #[test]
    fn whitespace_is_normalized() {
        let chunks = chunk_text("one\n\ntwo   three\tfour", 1200, 150);
        assert_eq!(chunks, vec!["one two three four".to_string()]);
    }

    #[test]
    fn pieces_respect_max_chars() {
        let text = "word ".repeat(500);
        let chunks = chunk_text(&text, 100, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn windows_end_on_word_boundaries() {
        let text = "alpha beta gamma delta epsilon zeta ".repeat(50);
        let words: std::collections::HashSet<&str> =
            ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"]
                .into_iter()
                .collect();
        let chunks = chunk_text(&text, 40, 10);
        // All chunks except the final one are cut at a space, so their
        // last word is always whole.
        for chunk in &chunks[..chunks.len() - 1] {
            let last = chunk.rsplit(' ').next().unwrap();
            assert!(words.contains(last), "split word: '{}'", last);
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text = "uno dos tres cuatro cinco seis siete ocho ".repeat(30);
        let chunks = chunk_text(&text, 80, 20);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().rev().take(10).collect();
            let tail: String = tail.chars().rev().collect();
            assert!(
                pair[1].contains(tail.trim()),
                "no overlap between '{}' and '{}'",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        let text = "política de devoluciones y más información útil aquí ".repeat(40);
        let chunks = chunk_text(&text, 90, 15);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 90);
        }
    }

    #[test]
    fn deterministic() {
        let text = "Lorem ipsum dolor sit amet consectetur adipiscing elit ".repeat(40);
        assert_eq!(chunk_text(&text, 120, 30), chunk_text(&text, 120, 30));
    }

    #[test]
    fn clean_text_drops_short_lines() {
        let text = "A real line of content\n- \n42\nAnother real line";
        assert_eq!(clean_text(text), "A real line of content\nAnother real line");
    }
}
