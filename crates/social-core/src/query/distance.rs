//! Levenshtein edit distance over Unicode scalar values

/// Minimum number of single-character insertions, deletions or substitutions
/// turning `a` into `b`
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    if b.is_empty() {
        return a.chars().count();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }

        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Sort key for ranking `text` against a search query.
///
/// Lower edit distance wins; on equal distance a text that starts with the
/// query wins.
pub fn search_rank(query: &str, text: &str) -> (usize, bool) {
    (edit_distance(query, text), !text.starts_with(query))
}
