use std::collections::HashMap;

const MIN_CONCEPT_LEN: usize = 5;

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "because", "before", "being", "below",
    "between", "could", "doing", "during", "every", "first", "further", "having", "other",
    "their", "there", "these", "those", "through", "under", "until", "where", "which", "while",
    "would", "should", "might", "shall", "still", "thing", "things", "within", "without",
];

/// Most frequent content keywords, most frequent first, ties alphabetical.
pub fn derive_concepts(content: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for word in content.split(|c: char| !c.is_alphabetic()) {
        if word.chars().count() < MIN_CONCEPT_LEN {
            continue;
        }
        let word = word.to_lowercase();
        if STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut ranked = counts.into_iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked.into_iter().map(|(word, _count)| word).collect()
}

#[cfg(test)]
mod tests {
    use super::derive_concepts;

    #[test]
    fn ranks_by_frequency_then_alphabet() {
        let concepts = derive_concepts(
            "Budget review. The budget covers hiring; hiring and budget, plus travel.",
            3,
        );
        assert_eq!(concepts, vec!["budget", "hiring", "covers"]);
    }

    #[test]
    fn ignores_short_and_stop_words() {
        assert_eq!(derive_concepts("about these notes on a plan", 8), vec!["notes"]);
    }
}
