use serde::Serialize;

/// A piece of assistant content, either inline thinking or answer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Segment {
    Thinking(String),
    Answer(String),
}

/// Splits content on inline reasoning tags (`<think>…</think>` or any tag
/// whose name contains "think" or "reasoning"). An unterminated opening tag
/// turns the rest of the content into thinking.
pub fn split_reasoning(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = content;

    while let Some((open_start, open_end)) = find_reasoning_tag(rest, false) {
        push_answer(&mut segments, &rest[..open_start]);
        let inner = &rest[open_end..];
        match find_reasoning_tag(inner, true) {
            Some((close_start, close_end)) => {
                push_thinking(&mut segments, &inner[..close_start]);
                rest = &inner[close_end..];
            }
            None => {
                push_thinking(&mut segments, inner);
                rest = "";
            }
        }
    }
    push_answer(&mut segments, rest);

    segments
}

fn find_reasoning_tag(text: &str, closing: bool) -> Option<(usize, usize)> {
    let mut offset = 0;
    while let Some(rel) = text[offset..].find('<') {
        let start = offset + rel;
        let end = start + text[start..].find('>')? + 1;
        let name = text[start + 1..end - 1].to_ascii_lowercase();
        if name.starts_with('/') == closing && (name.contains("think") || name.contains("reasoning")) {
            return Some((start, end));
        }
        offset = start + 1;
    }
    None
}

fn push_answer(segments: &mut Vec<Segment>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        segments.push(Segment::Answer(text.to_string()));
    }
}

fn push_thinking(segments: &mut Vec<Segment>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        segments.push(Segment::Thinking(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_content_is_one_answer() {
        assert_eq!(
            split_reasoning("Your order has shipped."),
            vec![Segment::Answer("Your order has shipped.".to_string())]
        );
    }

    #[test]
    fn think_tags_become_thinking() {
        let segments = split_reasoning("<think>check the order</think>\nIt is pending.");
        assert_eq!(
            segments,
            vec![
                Segment::Thinking("check the order".to_string()),
                Segment::Answer("It is pending.".to_string()),
            ]
        );
    }

    #[test]
    fn matches_any_reasoning_tag_name() {
        let segments = split_reasoning("A <Redacted_Reasoning>hmm</Redacted_Reasoning> B");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1], Segment::Thinking("hmm".to_string()));
    }

    #[test]
    fn unterminated_tag_swallows_rest() {
        let segments = split_reasoning("<think>still going");
        assert_eq!(segments, vec![Segment::Thinking("still going".to_string())]);
    }

    #[test]
    fn unrelated_tags_are_left_alone() {
        let segments = split_reasoning("use <b>bold</b> text");
        assert_eq!(segments, vec![Segment::Answer("use <b>bold</b> text".to_string())]);
    }
}
