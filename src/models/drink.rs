use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Display, str::FromStr};

use crate::error::{AppError, AppResult};

/// Identifier of a catalog drink
pub type DrinkId = i64;

/// Alcohol classification of a drink
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DrinkType {
    Alcoholic,
    NonAlcoholic,
    HalfHalf,
}

impl DrinkType {
    /// Only fully alcoholic drinks count against the alcohol bucket; half/half does not
    pub fn is_alcoholic(self) -> bool {
        self == DrinkType::Alcoholic
    }
}

/// Kind of participant a drink suits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DrinkCategory {
    Talker,
    Dancer,
    Both,
}

/// How drunk a drink is expected to leave you
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DrunkennessLevel {
    Sober,
    Tipsy,
    Drunk,
}

/// Error returned when a stored enum value is not one we know about
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

macro_rules! text_enum {
    ($ty:ident, $kind:literal, { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

text_enum!(DrinkType, "type", {
    "alcoholic" => Alcoholic,
    "non_alcoholic" => NonAlcoholic,
    "half_half" => HalfHalf,
});

text_enum!(DrinkCategory, "category", {
    "talker" => Talker,
    "dancer" => Dancer,
    "both" => Both,
});

text_enum!(DrunkennessLevel, "drunkenness_level", {
    "sober" => Sober,
    "tipsy" => Tipsy,
    "drunk" => Drunk,
});

/// A well-formed catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drink {
    pub id: DrinkId,
    pub name: String,
    #[serde(rename = "type")]
    pub drink_type: DrinkType,
    pub style: String,
    pub category: DrinkCategory,
    pub drunkenness_level: DrunkennessLevel,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub alcohol_content: Option<f64>,
}

/// Body of a catalog create or replace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDrink {
    pub name: String,
    #[serde(rename = "type")]
    pub drink_type: DrinkType,
    pub style: String,
    pub category: DrinkCategory,
    pub drunkenness_level: DrunkennessLevel,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub alcohol_content: Option<f64>,
}

impl NewDrink {
    /// Checks what serde cannot: a usable name and a percentage in `[0, 100]`
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidInput("Drink name must not be blank".to_string()));
        }
        if let Some(abv) = self.alcohol_content {
            if !(0.0..=100.0).contains(&abv) {
                return Err(AppError::InvalidInput(format!(
                    "alcohol_content must be between 0 and 100, got {}",
                    abv
                )));
            }
        }
        Ok(())
    }

    /// The drink this body describes once stored under `id`
    pub fn into_drink(self, id: DrinkId) -> Drink {
        Drink {
            id,
            name: self.name,
            drink_type: self.drink_type,
            style: self.style,
            category: self.category,
            drunkenness_level: self.drunkenness_level,
            ingredients: self.ingredients,
            alcohol_content: self.alcohol_content,
        }
    }
}

/// A catalog row exactly as stored, before validation
///
/// Every descriptive column is nullable here so that one bad row can be
/// excluded from a recommendation instead of failing the whole catalog read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct DrinkRecord {
    pub id: DrinkId,
    pub name: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub drink_type: Option<String>,
    pub style: Option<String>,
    pub ingredients: Option<String>,
    pub alcohol_content: Option<f64>,
    pub category: Option<String>,
    pub drunkenness_level: Option<String>,
}

/// Why a catalog row could not be turned into a [`Drink`]
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MalformedDrink {
    #[error("drink {id} is missing '{field}'")]
    MissingField { id: DrinkId, field: &'static str },

    #[error("drink {id} has {source}")]
    BadValue {
        id: DrinkId,
        #[source]
        source: UnknownVariant,
    },
}

impl TryFrom<DrinkRecord> for Drink {
    type Error = MalformedDrink;

    fn try_from(record: DrinkRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        let required = |value: Option<String>, field: &'static str| {
            value.ok_or(MalformedDrink::MissingField { id, field })
        };
        let parse = |source| MalformedDrink::BadValue { id, source };

        Ok(Drink {
            id,
            name: required(record.name, "name")?,
            drink_type: required(record.drink_type, "type")?
                .parse()
                .map_err(parse)?,
            style: required(record.style, "style")?,
            category: required(record.category, "category")?
                .parse()
                .map_err(parse)?,
            drunkenness_level: required(record.drunkenness_level, "drunkenness_level")?
                .parse()
                .map_err(parse)?,
            ingredients: record.ingredients,
            alcohol_content: record.alcohol_content,
        })
    }
}

impl From<&Drink> for DrinkRecord {
    fn from(drink: &Drink) -> Self {
        Self {
            id: drink.id,
            name: Some(drink.name.clone()),
            drink_type: Some(drink.drink_type.to_string()),
            style: Some(drink.style.clone()),
            ingredients: drink.ingredients.clone(),
            alcohol_content: drink.alcohol_content,
            category: Some(drink.category.to_string()),
            drunkenness_level: Some(drink.drunkenness_level.to_string()),
        }
    }
}

/// Converts catalog rows into drinks, dropping malformed rows and repeated ids
///
/// The first row seen for an id wins. Every dropped row is logged.
pub fn well_formed(rows: Vec<DrinkRecord>) -> Vec<Drink> {
    let mut seen = HashSet::new();
    let mut drinks = Vec::with_capacity(rows.len());

    for row in rows {
        match Drink::try_from(row) {
            Ok(drink) if seen.insert(drink.id) => drinks.push(drink),
            Ok(drink) => {
                tracing::warn!(drink_id = drink.id, "Duplicate catalog id, keeping first row");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed catalog row");
            }
        }
    }

    drinks
}
