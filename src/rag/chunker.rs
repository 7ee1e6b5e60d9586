//! Token-bounded text chunking.
//!
//! Token size is approximated as 4 characters per token. A window slides
//! over the text; interior cuts prefer the nearest sentence or paragraph
//! delimiter, but only when the break lands past the window midpoint so
//! chunks never collapse to fragments.

const CHARS_PER_TOKEN: usize = 4;

const BREAK_DELIMITERS: [&str; 5] = [". ", "! ", "? ", "\n\n", "\n"];

/// Splits `text` into overlapping chunks of at most `max_tokens` tokens.
///
/// Deterministic and finite: the window start always advances, even when
/// `overlap_tokens * 4 >= max_tokens * 4`. Empty or blank input yields no
/// chunks; text that fits in a single window is returned as one trimmed
/// chunk.
pub fn chunk_by_tokens(text: &str, max_tokens: usize, overlap_tokens: usize) -> Vec<String> {
    let chunk_size = max_tokens.saturating_mul(CHARS_PER_TOKEN).max(1);
    let overlap = overlap_tokens.saturating_mul(CHARS_PER_TOKEN);

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut chunks = Vec::new();

    if total == 0 {
        return chunks;
    }

    if total <= chunk_size {
        let single = text.trim();
        if !single.is_empty() {
            chunks.push(single.to_string());
        }
        return chunks;
    }

    let mut start = 0usize;
    while start < total {
        let hard_end = (start + chunk_size).min(total);
        let end = if hard_end < total {
            find_break(&chars, start, hard_end).unwrap_or(hard_end)
        } else {
            hard_end
        };

        let piece: String = chars[start..end].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end >= total {
            break;
        }

        // Overlap the next window, unless that would re-cover more than half
        // of the chunk just emitted; then jump to the cut instead.
        let midpoint = start + (end - start) / 2;
        let next = end.saturating_sub(overlap);
        start = if next > midpoint { next } else { end };
    }

    chunks
}

/// Latest delimiter-aligned cut inside `[start, hard_end)` that lies past the
/// window midpoint. Returns the index one past the delimiter.
fn find_break(chars: &[char], start: usize, hard_end: usize) -> Option<usize> {
    let midpoint = start + (hard_end - start) / 2;
    let mut best: Option<usize> = None;

    for delimiter in BREAK_DELIMITERS {
        let pattern: Vec<char> = delimiter.chars().collect();
        if let Some(cut) = rfind_pattern(chars, start, hard_end, &pattern) {
            if cut > midpoint && best.map_or(true, |current| cut > current) {
                best = Some(cut);
            }
        }
    }

    best
}

fn rfind_pattern(chars: &[char], start: usize, hard_end: usize, pattern: &[char]) -> Option<usize> {
    if pattern.is_empty() || hard_end - start < pattern.len() {
        return None;
    }
    let last = hard_end - pattern.len();
    for pos in (start..=last).rev() {
        if chars[pos..pos + pattern.len()] == *pattern {
            return Some(pos + pattern.len());
        }
    }
    None
}
