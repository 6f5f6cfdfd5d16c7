//! ORDER BY generation for the cards-in-collection listing.
//!
//! Column names come from a closed enum so the generated clause never
//! contains client text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `DESC` selects descending; anything else, including nothing, is ascending
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("DESC") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    // Nulls compare lowest, so they lead ascending lists and trail descending ones
    fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC NULLS FIRST",
            SortDirection::Desc => "DESC NULLS LAST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardSort {
    Cert,
    Year,
    Subject,
    Brand,
    CardSet,
    Sold,
}

impl CardSort {
    /// Unknown or missing keys leave the listing unsorted
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "cert" => Some(CardSort::Cert),
            "year" => Some(CardSort::Year),
            "subject" => Some(CardSort::Subject),
            "brand" => Some(CardSort::Brand),
            "cardSet" => Some(CardSort::CardSet),
            "sold" => Some(CardSort::Sold),
            _ => None,
        }
    }

    /// Columns following the direction-sensitive keys, always ascending
    fn keys(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            CardSort::Cert => (&["grading_company", "certification_number"], &[]),
            CardSort::Year => (&["year"], &["brand", "card_set", "card_number", "id"]),
            CardSort::Subject => (&["subject"], &["year", "brand", "card_set", "card_number", "id"]),
            CardSort::Brand => (&["brand"], &["year", "card_set", "card_number", "id"]),
            CardSort::CardSet => (&["card_set"], &["year", "card_number", "brand", "id"]),
            CardSort::Sold => (&["sold"], &["year", "brand", "card_set", "card_number", "id"]),
        }
    }
}

/// Build the ORDER BY clause for cards aliased as `alias`.
///
/// Without a sort key the listing keeps membership insertion order, which the
/// caller supplies as `fallback`.
pub fn order_clause(alias: &str, sort: Option<CardSort>, direction: SortDirection, fallback: &str) -> String {
    let Some(sort) = sort else {
        return format!("ORDER BY {}", fallback);
    };

    let (primary, secondary) = sort.keys();
    let parts: Vec<String> = primary
        .iter()
        .map(|column| format!("{}.\"{}\" {}", alias, column, direction.to_sql()))
        .chain(
            secondary
                .iter()
                .map(|column| format!("{}.\"{}\" {}", alias, column, SortDirection::Asc.to_sql())),
        )
        .collect();

    format!("ORDER BY {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_sort_keys() {
        assert_eq!(CardSort::parse(Some("cert")), Some(CardSort::Cert));
        assert_eq!(CardSort::parse(Some("cardSet")), Some(CardSort::CardSet));
        assert_eq!(CardSort::parse(Some("player")), None);
        assert_eq!(CardSort::parse(None), None);
    }

    #[test]
    fn direction_defaults_to_ascending() {
        assert_eq!(SortDirection::parse(Some("DESC")), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("desc")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(None), SortDirection::Asc);
    }

    #[test]
    fn year_descending_only_flips_primary_key() {
        let clause = order_clause("c", Some(CardSort::Year), SortDirection::Desc, "m.seq");
        assert_eq!(
            clause,
            "ORDER BY c.\"year\" DESC NULLS LAST, c.\"brand\" ASC NULLS FIRST, \
             c.\"card_set\" ASC NULLS FIRST, c.\"card_number\" ASC NULLS FIRST, c.\"id\" ASC NULLS FIRST"
        );
    }

    #[test]
    fn cert_flips_both_keys() {
        let clause = order_clause("c", Some(CardSort::Cert), SortDirection::Desc, "m.seq");
        assert_eq!(
            clause,
            "ORDER BY c.\"grading_company\" DESC NULLS LAST, c.\"certification_number\" DESC NULLS LAST"
        );
    }

    #[test]
    fn card_set_tie_breakers_follow_number_before_brand() {
        let clause = order_clause("c", Some(CardSort::CardSet), SortDirection::Asc, "m.seq");
        let number = clause.find("card_number").unwrap();
        let brand = clause.find("\"brand\"").unwrap();
        assert!(number < brand);
    }

    #[test]
    fn unsorted_uses_fallback() {
        assert_eq!(order_clause("c", None, SortDirection::Desc, "m.seq"), "ORDER BY m.seq");
    }
}
