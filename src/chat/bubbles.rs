use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Character budget of one bubble, counted in Unicode scalar values.
pub const BUBBLE_MAX_CHARS: usize = 220;

/// Pause between two successive bubbles of the same reply.
pub const BUBBLE_DELAY: Duration = Duration::from_millis(350);

/// Collapses every whitespace run to one space and trims both ends.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits normalized text after `.`, `!` or `?` followed by a space.
/// The punctuation stays with the segment before it.
fn sentences(normalized: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut prev = None;
    for (i, c) in normalized.char_indices() {
        if c == ' ' && matches!(prev, Some('.' | '!' | '?')) {
            segments.push(&normalized[start..i]);
            start = i + 1;
        }
        prev = Some(c);
    }
    if start < normalized.len() {
        segments.push(&normalized[start..]);
    }
    segments
}

fn slice_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|chunk| chunk.iter().collect()).collect()
}

/// Splits one assistant reply into display bubbles.
///
/// Sentences are packed greedily up to [`BUBBLE_MAX_CHARS`]; a sentence is
/// never cut, so a single oversized sentence becomes its own bubble. Text with
/// no sentence boundary at all is cut into fixed-size slices instead. The
/// result is never empty.
pub fn split_into_bubbles(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let segments = sentences(&normalized);

    if segments.len() == 1 && normalized.chars().count() > BUBBLE_MAX_CHARS {
        return slice_chars(&normalized, BUBBLE_MAX_CHARS);
    }

    let mut bubbles = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for segment in segments {
        let segment_len = segment.chars().count();
        let joined_len = if current.is_empty() { segment_len } else { current_len + 1 + segment_len };

        if joined_len > BUBBLE_MAX_CHARS {
            if !current.is_empty() {
                bubbles.push(std::mem::take(&mut current));
            }
            current.push_str(segment);
            current_len = segment_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(segment);
            current_len = joined_len;
        }
    }
    if !current.is_empty() {
        bubbles.push(current);
    }

    if bubbles.is_empty() {
        return vec![text.to_string()];
    }
    bubbles
}

/// Emits `bubbles` in order from a spawned task, sleeping `delay` between
/// successive items. Nothing is awaited after the last bubble.
pub fn pace_bubbles(
    bubbles: Vec<String>,
    delay: Duration
) -> Pin<Box<dyn Stream<Item = String> + Send>> {
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let last = bubbles.len().saturating_sub(1);
        for (i, bubble) in bubbles.into_iter().enumerate() {
            if tx.send(bubble).await.is_err() {
                return;
            }
            if i < last {
                tokio::time::sleep(delay).await;
            }
        }
    });

    Box::pin(ReceiverStream::new(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::time::Instant;

    fn sentence(len: usize) -> String {
        // `len` chars including the closing period
        format!("{}.", "a".repeat(len - 1))
    }

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(normalize("  Hi.\n\n  I'm   Mei.\t"), "Hi. I'm Mei.");
    }

    #[test]
    fn short_reply_is_one_bubble() {
        assert_eq!(split_into_bubbles("Hi. I'm Mei.  How are you?"), vec!["Hi. I'm Mei. How are you?"]);
    }

    #[test]
    fn splits_only_after_terminal_punctuation_and_space() {
        let segments = sentences("Wait... really?! Yes. e.g.x ok");
        assert_eq!(segments, vec!["Wait...", "really?!", "Yes.", "e.g.x ok"]);
    }

    #[test]
    fn packs_sentences_up_to_budget() {
        let a = sentence(100);
        let b = sentence(100);
        let c = sentence(100);
        let text = format!("{} {} {}", a, b, c);
        let bubbles = split_into_bubbles(&text);
        assert_eq!(bubbles, vec![format!("{} {}", a, b), c]);
        assert!(bubbles.iter().all(|b| b.chars().count() <= BUBBLE_MAX_CHARS));
    }

    #[test]
    fn exact_budget_fits() {
        let a = sentence(110);
        let b = sentence(109);
        let bubbles = split_into_bubbles(&format!("{} {}", a, b));
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles[0].chars().count(), BUBBLE_MAX_CHARS);
    }

    #[test]
    fn oversized_sentence_is_kept_whole() {
        let long = sentence(300);
        let text = format!("Short. {} Tail.", long);
        let bubbles = split_into_bubbles(&text);
        assert_eq!(bubbles, vec!["Short.".to_string(), long, "Tail.".to_string()]);
    }

    #[test]
    fn run_on_text_is_sliced() {
        let text = "x".repeat(500);
        let bubbles = split_into_bubbles(&text);
        assert_eq!(bubbles.len(), 3);
        assert_eq!(bubbles[0].len(), 220);
        assert_eq!(bubbles[1].len(), 220);
        assert_eq!(bubbles[2].len(), 60);
        assert_eq!(bubbles.concat(), text);
    }

    #[test]
    fn run_on_slicing_counts_chars_not_bytes() {
        let text = "é".repeat(230);
        let bubbles = split_into_bubbles(&text);
        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[0].chars().count(), 220);
        assert_eq!(bubbles[1].chars().count(), 10);
    }

    #[test]
    fn whitespace_only_returns_input_unchanged() {
        assert_eq!(split_into_bubbles("   "), vec!["   "]);
    }

    #[test]
    fn reconstructs_normalized_input() {
        let text = "I don't know.  It's been hard lately!\nMy mom keeps calling. ".repeat(12);
        let bubbles = split_into_bubbles(&text);
        assert!(bubbles.len() > 1);
        assert!(bubbles.iter().all(|b| !b.is_empty() && b.chars().count() <= BUBBLE_MAX_CHARS));
        assert_eq!(bubbles.join(" "), normalize(&text));
    }

    #[tokio::test(start_paused = true)]
    async fn paces_bubbles_in_order() {
        let start = Instant::now();
        let mut stream = pace_bubbles(vec!["one".into(), "two".into(), "three".into()], BUBBLE_DELAY);

        let mut seen = Vec::new();
        while let Some(bubble) = stream.next().await {
            seen.push((bubble, start.elapsed()));
        }

        let names: Vec<_> = seen.iter().map(|(b, _)| b.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
        assert!(seen[0].1 < BUBBLE_DELAY);
        assert!(seen[1].1 >= BUBBLE_DELAY);
        assert!(seen[2].1 >= BUBBLE_DELAY * 2);
        assert!(start.elapsed() < BUBBLE_DELAY * 3);
    }
}
