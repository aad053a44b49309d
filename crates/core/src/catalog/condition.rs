//! Product condition parsed from the merchant's free-text label.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::text::fold;

/// Normalized product condition.
///
/// The declaration order is the "best condition first" sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductCondition {
    New,
    LikeNew,
    ExcellentUsed,
    GoodUsed,
    Unranked,
}

impl ProductCondition {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::LikeNew,
        Self::ExcellentUsed,
        Self::GoodUsed,
        Self::Unranked,
    ];

    /// Classify a free-text condition label such as "Nuevo", "Como nuevo"
    /// or "Usado - Excelente estado".
    #[must_use]
    pub fn classify(label: &str) -> Self {
        let label = fold(label);
        let has = |needles: &[&str]| needles.iter().any(|n| label.contains(n));

        if has(&["como nuevo", "like new", "like-new", "semi nuevo", "seminuevo"]) {
            Self::LikeNew
        } else if has(&["excelente", "excellent", "impecable"]) {
            Self::ExcellentUsed
        } else if has(&["bueno", "buen estado", "good"]) {
            Self::GoodUsed
        } else if has(&["nuevo", "new", "sellado", "en caja"]) {
            Self::New
        } else {
            Self::Unranked
        }
    }

    /// Rank used by the `condition-best` sort (lower is better).
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Stable tag used in filters and facets.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::LikeNew => "like-new",
            Self::ExcellentUsed => "excellent-used",
            Self::GoodUsed => "good-used",
            Self::Unranked => "other",
        }
    }

    /// Parse a filter tag back into a condition.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }
}

impl fmt::Display for ProductCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_spanish_labels() {
        assert_eq!(ProductCondition::classify("Nuevo"), ProductCondition::New);
        assert_eq!(
            ProductCondition::classify("Como Nuevo"),
            ProductCondition::LikeNew
        );
        assert_eq!(
            ProductCondition::classify("Usado - Excelente estado"),
            ProductCondition::ExcellentUsed
        );
        assert_eq!(
            ProductCondition::classify("Usado - Buen estado"),
            ProductCondition::GoodUsed
        );
        assert_eq!(
            ProductCondition::classify("Para repuesto"),
            ProductCondition::Unranked
        );
    }

    #[test]
    fn test_rank_order() {
        assert!(ProductCondition::New.rank() < ProductCondition::LikeNew.rank());
        assert!(ProductCondition::LikeNew.rank() < ProductCondition::ExcellentUsed.rank());
        assert!(ProductCondition::ExcellentUsed.rank() < ProductCondition::GoodUsed.rank());
        assert!(ProductCondition::GoodUsed.rank() < ProductCondition::Unranked.rank());
    }

    #[test]
    fn test_tag_roundtrip() {
        for condition in ProductCondition::ALL {
            assert_eq!(ProductCondition::from_tag(condition.tag()), Some(condition));
        }
        assert_eq!(ProductCondition::from_tag("broken"), None);
    }
}
