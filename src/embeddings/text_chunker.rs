// Recursive length-bounded text splitter

pub const CHUNK_SIZE: usize = 1500;
pub const CHUNK_OVERLAP: usize = 200;

/// Boundaries tried in order before falling back to a hard cut.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Splits text into overlapping chunks of at most `chunk_size` characters.
///
/// Each cut is placed after the last paragraph, line, sentence or word
/// boundary inside the window. The next chunk starts `chunk_overlap`
/// characters before the cut, moved back to the start of a word when one is
/// close by, so neighbours share at least `chunk_overlap` characters. Chunks
/// are exact substrings of the input; whitespace-only pieces are dropped.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(CHUNK_SIZE, CHUNK_OVERLAP)
    }
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let window_end = (start + self.chunk_size).min(total);
            if window_end == total {
                chunks.push(chars[start..total].iter().collect());
                break;
            }

            let cut = self.find_cut(&chars, start, window_end);
            chunks.push(chars[start..cut].iter().collect());
            start = self.next_start(&chars, start, cut);
        }

        chunks.retain(|chunk: &String| !chunk.trim().is_empty());
        chunks
    }

    fn find_cut(&self, chars: &[char], start: usize, end: usize) -> usize {
        // the cut has to leave room for the overlap and still move forward
        let min_cut = (start + 2 * self.chunk_overlap + 1).min(end);

        SEPARATORS
            .iter()
            .find_map(|sep| last_boundary(chars, sep, min_cut, end))
            .unwrap_or(end)
    }

    fn next_start(&self, chars: &[char], start: usize, cut: usize) -> usize {
        let target = cut - self.chunk_overlap;
        let floor = (start + 1).max(target.saturating_sub(self.chunk_overlap));

        let mut pos = target;
        while pos > floor && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        if chars[pos - 1].is_whitespace() {
            pos
        } else {
            target
        }
    }
}

/// Position just after the last `sep` ending within `[min_cut, end]`.
fn last_boundary(chars: &[char], sep: &str, min_cut: usize, end: usize) -> Option<usize> {
    let sep: Vec<char> = sep.chars().collect();
    (min_cut..=end)
        .rev()
        .find(|&cut| cut >= sep.len() && chars[cut - sep.len()..cut] == sep[..])
}

/// Split with the default 1500/200 configuration.
pub fn chunk_text(text: &str) -> Vec<String> {
    TextChunker::default().split(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecture_text() -> String {
        let mut text = String::new();
        for section in 0..6 {
            text.push_str(&format!("Section {} overview\n\n", section));
            for sentence in 0..14 {
                text.push_str(&format!(
                    "Sentence {} of section {} explains how cells regulate gene expression. ",
                    sentence, section
                ));
            }
            text.push_str("\n\n");
        }
        text
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_text("").is_empty());
        assert!(chunk_text("  \n\t ").is_empty());
    }

    #[test]
    fn test_short_text_is_a_single_chunk() {
        assert_eq!(chunk_text("one two three"), vec!["one two three".to_string()]);
    }

    #[test]
    fn test_chunks_are_bounded_and_overlap() {
        let text = lecture_text();
        let chunks = chunk_text(&text);
        assert!(chunks.len() > 3);

        for chunk in &chunks {
            assert!(chunk.chars().count() <= CHUNK_SIZE);
        }
        for pair in chunks.windows(2) {
            let head: String = pair[1].chars().take(CHUNK_OVERLAP).collect();
            assert_eq!(head.chars().count(), CHUNK_OVERLAP);
            assert!(pair[0].contains(&head), "neighbours must share the overlap window");
        }
        assert!(text.ends_with(chunks.last().unwrap().as_str()));
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let text = lecture_text();
        let chunks = chunk_text(&text);
        assert!(chunks[0].ends_with("\n\n"));
    }

    #[test]
    fn test_hard_cut_without_whitespace() {
        let text = "x".repeat(3500);
        let chunks = chunk_text(&text);
        assert_eq!(chunks[0].len(), CHUNK_SIZE);
        assert_eq!(chunks[1].len(), CHUNK_SIZE);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 3500 - 2 * (CHUNK_SIZE - CHUNK_OVERLAP));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "é".repeat(1600);
        let chunks = chunk_text(&text);
        assert_eq!(chunks[0].chars().count(), CHUNK_SIZE);
        assert_eq!(chunks[1].chars().count(), 1600 - (CHUNK_SIZE - CHUNK_OVERLAP));
    }

    #[test]
    fn test_whitespace_runs_do_not_become_chunks() {
        let text = format!("start {} end", " ".repeat(4000));
        let chunks = chunk_text(&text);

        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|chunk| !chunk.trim().is_empty()));
        assert!(chunks[0].starts_with("start"));
        assert!(chunks.last().unwrap().ends_with("end"));
    }

    #[test]
    fn test_deterministic() {
        let text = lecture_text();
        assert_eq!(chunk_text(&text), chunk_text(&text));
    }
}
