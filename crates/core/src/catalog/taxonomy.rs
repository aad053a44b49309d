//! Category and brand taxonomy.
//!
//! Products carry explicit `category` and `brand` tags. Records that arrive
//! without them (old catalog files, bulk imports) get tags inferred once at
//! ingestion by keyword matching against the name and description.

use serde::{Deserialize, Serialize};

use crate::text::word_text;

/// Tag assigned when no taxonomy entry matches.
pub const FALLBACK_TAG: &str = "otros";

/// One category or brand and the keywords that identify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    /// Stable tag stored on products and used in filters.
    pub slug: String,
    /// Display label.
    pub label: String,
    /// Lower-case keywords; the slug itself always counts as one.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl TaxonomyEntry {
    #[must_use]
    pub fn new(slug: &str, label: &str, keywords: &[&str]) -> Self {
        Self {
            slug: slug.to_owned(),
            label: label.to_owned(),
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
        }
    }

    /// Keywords match at the start of a word, so "kit" finds "kits" but
    /// not "makita".
    fn matches(&self, text: &str) -> bool {
        std::iter::once(self.slug.as_str())
            .chain(self.keywords.iter().map(String::as_str))
            .map(word_text)
            .filter(|keyword| keyword.len() > 1)
            .any(|keyword| text.contains(keyword.trim_end()))
    }
}

/// A tenant's product taxonomy. A side left out of the stored JSON falls
/// back to the default list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    pub categories: Vec<TaxonomyEntry>,
    pub brands: Vec<TaxonomyEntry>,
}

impl Default for Taxonomy {
    /// Power-tools taxonomy used when a tenant hasn't defined its own.
    fn default() -> Self {
        Self {
            categories: vec![
                TaxonomyEntry::new("taladros", "Taladros", &["taladro", "drill", "percutor"]),
                TaxonomyEntry::new(
                    "atornilladores",
                    "Atornilladores",
                    &["atornillador", "llave de impacto", "impact", "screwdriver"],
                ),
                TaxonomyEntry::new("amoladoras", "Amoladoras", &["amoladora", "grinder"]),
                TaxonomyEntry::new(
                    "sierras",
                    "Sierras",
                    &["sierra", "caladora", "ingletadora", "saw", "jigsaw"],
                ),
                TaxonomyEntry::new("lijadoras", "Lijadoras", &["lijadora", "sander"]),
                TaxonomyEntry::new("rotomartillos", "Rotomartillos", &["rotomartillo", "martillo"]),
                TaxonomyEntry::new("kits", "Kits y combos", &["kit", "combo"]),
            ],
            brands: vec![
                TaxonomyEntry::new("makita", "Makita", &[]),
                TaxonomyEntry::new("bosch", "Bosch", &[]),
                TaxonomyEntry::new("dewalt", "DeWalt", &["de walt"]),
                TaxonomyEntry::new("milwaukee", "Milwaukee", &[]),
                TaxonomyEntry::new(
                    "black-decker",
                    "Black+Decker",
                    &["black+decker", "black & decker", "black decker"],
                ),
                TaxonomyEntry::new("stanley", "Stanley", &[]),
                TaxonomyEntry::new("einhell", "Einhell", &[]),
                TaxonomyEntry::new("skil", "Skil", &[]),
                TaxonomyEntry::new("dremel", "Dremel", &[]),
            ],
        }
    }
}

impl Taxonomy {
    /// Infer `(category, brand)` tags from product text.
    ///
    /// Name matches win over description matches, so a Makita drill whose
    /// description mentions "compatible con baterías Bosch" stays Makita.
    #[must_use]
    pub fn infer(&self, name: &str, description: &str) -> (String, String) {
        let name = word_text(name);
        let description = word_text(description);
        (
            Self::first_match(&self.categories, &name, &description),
            Self::first_match(&self.brands, &name, &description),
        )
    }

    fn first_match(entries: &[TaxonomyEntry], name: &str, description: &str) -> String {
        entries
            .iter()
            .find(|e| e.matches(name))
            .or_else(|| entries.iter().find(|e| e.matches(description)))
            .map_or_else(|| FALLBACK_TAG.to_owned(), |e| e.slug.clone())
    }

    /// Look up the display label for a category tag.
    #[must_use]
    pub fn category_label(&self, slug: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|e| e.slug == slug)
            .map(|e| e.label.as_str())
    }

    /// Look up the display label for a brand tag.
    #[must_use]
    pub fn brand_label(&self, slug: &str) -> Option<&str> {
        self.brands
            .iter()
            .find(|e| e.slug == slug)
            .map(|e| e.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_brand_and_category_from_name() {
        let taxonomy = Taxonomy::default();
        let (category, brand) = taxonomy.infer("Taladro Percutor Makita HP1640", "");
        assert_eq!(category, "taladros");
        assert_eq!(brand, "makita");
    }

    #[test]
    fn test_infer_falls_back_to_otros() {
        let taxonomy = Taxonomy::default();
        let (category, brand) = taxonomy.infer("Guantes de trabajo", "Talle L");
        assert_eq!(category, FALLBACK_TAG);
        assert_eq!(brand, FALLBACK_TAG);
    }

    #[test]
    fn test_name_match_beats_description_match() {
        let taxonomy = Taxonomy::default();
        let (_, brand) = taxonomy.infer(
            "Atornillador Makita DF333",
            "Usa las mismas baterías que tu Bosch",
        );
        assert_eq!(brand, "makita");
    }

    #[test]
    fn test_infer_uses_description_when_name_is_generic() {
        let taxonomy = Taxonomy::default();
        let (category, brand) = taxonomy.infer("Caladora GST75E", "Marca Bosch, 710W");
        assert_eq!(category, "sierras");
        assert_eq!(brand, "bosch");
    }

    #[test]
    fn test_custom_taxonomy_labels() {
        let taxonomy = Taxonomy {
            categories: vec![TaxonomyEntry::new("zapatillas", "Zapatillas", &["sneaker"])],
            brands: vec![],
        };
        let (category, brand) = taxonomy.infer("Sneaker urbana", "");
        assert_eq!(category, "zapatillas");
        assert_eq!(brand, FALLBACK_TAG);
        assert_eq!(taxonomy.category_label("zapatillas"), Some("Zapatillas"));
        assert_eq!(taxonomy.brand_label("makita"), None);
    }
}
