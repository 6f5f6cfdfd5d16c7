use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::error::{DataError, DataResult};

/// A single graded trading card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TradingCard {
    pub id: Uuid,
    pub year: i32,
    pub brand: String,
    pub card_number: Option<String>,
    pub card_set: String,
    pub subject: String,
    pub variety: Option<String>,
    pub grading_company: String,
    pub grade: String,
    pub certification_number: String,
    pub front_card_image_link: Option<String>,
    pub back_card_image_link: Option<String>,
    pub sold: bool,
    pub created_at: DateTime<Utc>,
}

/// Card returned from a full-text query with its relevance
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScoredCard {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub card: TradingCard,
    pub score: f32,
}

/// Client payload for creating a card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub year: i32,
    pub brand: String,
    #[serde(default)]
    pub card_number: Option<String>,
    pub card_set: String,
    pub subject: String,
    #[serde(default)]
    pub variety: Option<String>,
    pub grading_company: String,
    pub grade: String,
    pub certification_number: String,
    #[serde(default)]
    pub front_card_image_link: Option<String>,
    #[serde(default)]
    pub back_card_image_link: Option<String>,
    pub sold: bool,
}

impl NewCard {
    /// Required text fields must carry something other than whitespace
    pub fn validate(&self) -> DataResult<()> {
        let required = [
            ("brand", &self.brand),
            ("cardSet", &self.card_set),
            ("subject", &self.subject),
            ("gradingCompany", &self.grading_company),
            ("grade", &self.grade),
            ("certificationNumber", &self.certification_number),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataError::invalid(format!(
                "trading card validation failed: {} required",
                missing.join(", ")
            )))
        }
    }
}

/// Partial update for a card; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    pub year: Option<i32>,
    pub brand: Option<String>,
    pub card_number: Option<String>,
    pub card_set: Option<String>,
    pub subject: Option<String>,
    pub variety: Option<String>,
    pub grading_company: Option<String>,
    pub grade: Option<String>,
    pub certification_number: Option<String>,
    pub front_card_image_link: Option<String>,
    pub back_card_image_link: Option<String>,
    pub sold: Option<bool>,
}

impl CardPatch {
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.brand.is_none()
            && self.card_number.is_none()
            && self.card_set.is_none()
            && self.subject.is_none()
            && self.variety.is_none()
            && self.grading_company.is_none()
            && self.grade.is_none()
            && self.certification_number.is_none()
            && self.front_card_image_link.is_none()
            && self.back_card_image_link.is_none()
            && self.sold.is_none()
    }

    /// Required fields may be replaced but not blanked
    pub fn validate(&self) -> DataResult<()> {
        let required = [
            ("brand", &self.brand),
            ("cardSet", &self.card_set),
            ("subject", &self.subject),
            ("gradingCompany", &self.grading_company),
            ("grade", &self.grade),
            ("certificationNumber", &self.certification_number),
        ];
        for (name, value) in required {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(DataError::invalid(format!("trading card validation failed: {} required", name)));
            }
        }
        Ok(())
    }
}

impl From<TradingCard> for NewCard {
    fn from(card: TradingCard) -> Self {
        Self {
            year: card.year,
            brand: card.brand,
            card_number: card.card_number,
            card_set: card.card_set,
            subject: card.subject,
            variety: card.variety,
            grading_company: card.grading_company,
            grade: card.grade,
            certification_number: card.certification_number,
            front_card_image_link: card.front_card_image_link,
            back_card_image_link: card.back_card_image_link,
            sold: card.sold,
        }
    }
}
