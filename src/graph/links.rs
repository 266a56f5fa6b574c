const OPEN: &str = "[[";
const CLOSE: &str = "]]";

/// Returns the target of every `[[Target]]` or `[[Target|Display]]` marker in
/// document order. Targets are trimmed; empty and unterminated markers are skipped.
pub fn extract_references(content: &str) -> Vec<&str> {
    let mut references = Vec::new();
    let mut rest = content;

    while let Some(open) = rest.find(OPEN) {
        let after_open = &rest[open + OPEN.len()..];
        let Some(close) = after_open.find(CLOSE) else {
            break;
        };

        let mut inner = &after_open[..close];
        if let Some(nested) = inner.rfind(OPEN) {
            inner = &inner[nested + OPEN.len()..];
        }

        let target = inner
            .split_once('|')
            .map(|(target, _display)| target)
            .unwrap_or(inner)
            .trim();
        if !target.is_empty() && !target.contains('\n') {
            references.push(target);
        }

        rest = &after_open[close + CLOSE.len()..];
    }

    references
}
