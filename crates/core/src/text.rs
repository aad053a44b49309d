//! Text normalization helpers shared by taxonomy inference and search.

/// Lower-case and strip the diacritics common in Spanish/Portuguese
/// catalogs, so "Eléctrico" and "electrico" compare equal.
#[must_use]
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Split a free-text query into folded, non-empty tokens.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(fold).collect()
}

/// Split folded field text into words on anything that isn't alphanumeric.
pub fn words(folded: &str) -> impl Iterator<Item = &str> {
    folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// Fold `s` and rewrite it as space-separated words with a leading and
/// trailing space (`" black decker 18v "`), for word-boundary matching.
#[must_use]
pub fn word_text(s: &str) -> String {
    let folded = fold(s);
    let mut out = String::with_capacity(folded.len() + 2);
    out.push(' ');
    for word in words(&folded) {
        out.push_str(word);
        out.push(' ');
    }
    out
}

/// True when `a` and `b` differ by at most one insertion, deletion or
/// substitution.
#[must_use]
pub fn within_one_edit(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if long.len() - short.len() > 1 {
        return false;
    }

    let mut i = 0;
    let mut j = 0;
    let mut edits = 0;
    while i < short.len() && j < long.len() {
        if short.get(i) == long.get(j) {
            i += 1;
            j += 1;
            continue;
        }
        edits += 1;
        if edits > 1 {
            return false;
        }
        if short.len() == long.len() {
            i += 1;
        }
        j += 1;
    }

    edits + (long.len() - j) + (short.len() - i) <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents_and_case() {
        assert_eq!(fold("Taladro Eléctrico ÑANDÚ"), "taladro electrico nandu");
    }

    #[test]
    fn test_tokenize_ignores_extra_whitespace() {
        assert_eq!(tokenize("  Makita   18V "), vec!["makita", "18v"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_words_split_on_punctuation() {
        let folded = fold("Bosch GST-75E (caladora)");
        let collected: Vec<&str> = words(&folded).collect();
        assert_eq!(collected, vec!["bosch", "gst", "75e", "caladora"]);
    }

    #[test]
    fn test_word_text() {
        assert_eq!(word_text("Black+Decker 18V"), " black decker 18v ");
        assert_eq!(word_text(""), " ");
    }

    #[test]
    fn test_within_one_edit() {
        assert!(within_one_edit("makita", "makita"));
        assert!(within_one_edit("makita", "mkita"));
        assert!(within_one_edit("makita", "makitta"));
        assert!(within_one_edit("makita", "makota"));
        assert!(!within_one_edit("makita", "mokota"));
        assert!(!within_one_edit("makita", "bosch"));
    }
}
