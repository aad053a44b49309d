//! Field-weighted relevance scoring.

use crate::catalog::Product;
use crate::text::{fold, within_one_edit, words};

/// Points for a substring hit in each searchable field.
pub const NAME_WEIGHT: u32 = 100;
pub const CODE_WEIGHT: u32 = 80;
pub const DESCRIPTION_WEIGHT: u32 = 50;
pub const FEATURES_WEIGHT: u32 = 30;
pub const CONDITION_WEIGHT: u32 = 20;

/// Tokens shorter than this never fuzzy-match.
const FUZZY_MIN_LEN: usize = 4;

/// Folded searchable text of one product.
///
/// Built once per product per query so every token reuses the same folding.
pub struct SearchDocument {
    fields: [(String, u32); 5],
}

impl SearchDocument {
    #[must_use]
    pub fn new(product: &Product) -> Self {
        Self {
            fields: [
                (fold(&product.name), NAME_WEIGHT),
                (fold(product.code.as_str()), CODE_WEIGHT),
                (fold(&product.description), DESCRIPTION_WEIGHT),
                (fold(&product.features.join(" ")), FEATURES_WEIGHT),
                (fold(&product.condition), CONDITION_WEIGHT),
            ],
        }
    }

    /// Score a single folded token across every field.
    ///
    /// A field scores its full weight when it contains the token, plus half
    /// the weight again when it starts with it. Without a substring hit, a
    /// word within one edit of the token earns 30% of the weight.
    #[must_use]
    pub fn token_score(&self, token: &str) -> u32 {
        if token.is_empty() {
            return 0;
        }

        self.fields
            .iter()
            .map(|(text, weight)| {
                if text.contains(token) {
                    let prefix_bonus = if text.starts_with(token) { weight / 2 } else { 0 };
                    weight + prefix_bonus
                } else if token.chars().count() >= FUZZY_MIN_LEN
                    && words(text).any(|word| within_one_edit(word, token))
                {
                    weight * 3 / 10
                } else {
                    0
                }
            })
            .sum()
    }

    /// Total score of all tokens, or `None` when any token scores zero.
    #[must_use]
    pub fn score(&self, tokens: &[String]) -> Option<u32> {
        tokens.iter().try_fold(0u32, |total, token| {
            match self.token_score(token) {
                0 => None,
                score => Some(total + score),
            }
        })
    }
}

/// Score a product for a tokenized query (0 when it doesn't match).
#[must_use]
pub fn score_product(product: &Product, tokens: &[String]) -> u32 {
    SearchDocument::new(product).score(tokens).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_product;
    use crate::text::tokenize;

    #[test]
    fn test_name_hit_outweighs_description_hit() {
        let mut in_name = sample_product("A1", "Amoladora Makita", 10, 10);
        in_name.condition = String::new();
        let mut in_description = sample_product("A2", "Amoladora 115mm", 10, 10);
        in_description.condition = String::new();
        in_description.description = "Compatible con discos Makita".to_owned();

        let tokens = tokenize("makita");
        assert_eq!(score_product(&in_name, &tokens), NAME_WEIGHT);
        assert_eq!(score_product(&in_description, &tokens), DESCRIPTION_WEIGHT);
    }

    #[test]
    fn test_prefix_bonus() {
        let mut product = sample_product("X1", "Makita DF333", 10, 10);
        product.condition = String::new();
        let tokens = tokenize("makita");
        assert_eq!(score_product(&product, &tokens), NAME_WEIGHT + NAME_WEIGHT / 2);
    }

    #[test]
    fn test_code_match_is_case_insensitive() {
        let mut product = sample_product("GST75E", "Caladora", 10, 10);
        product.condition = String::new();
        let tokens = tokenize("gst75e");
        assert_eq!(score_product(&product, &tokens), CODE_WEIGHT + CODE_WEIGHT / 2);
    }

    #[test]
    fn test_fuzzy_match_on_typo() {
        let mut product = sample_product("Z1", "Taladro Makita", 10, 10);
        product.condition = String::new();
        let tokens = tokenize("makitta");
        assert_eq!(score_product(&product, &tokens), NAME_WEIGHT * 3 / 10);
    }

    #[test]
    fn test_every_token_must_match() {
        let product = sample_product("Z2", "Taladro Makita", 10, 10);
        assert!(score_product(&product, &tokenize("taladro makita")) > 0);
        assert_eq!(score_product(&product, &tokenize("taladro bosch")), 0);
    }

    #[test]
    fn test_condition_is_searchable() {
        let product = sample_product("Z3", "Sierra circular", 10, 10);
        assert_eq!(
            score_product(&product, &tokenize("nuevo")),
            CONDITION_WEIGHT + CONDITION_WEIGHT / 2
        );
    }
}
