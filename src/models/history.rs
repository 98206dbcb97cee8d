use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DrinkId, DrinkType};

/// Identifier of the person drinking
pub type UserId = i64;

/// One consumption event, denormalised with the drink's type and name at read time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub drink_id: DrinkId,
    #[serde(rename = "type")]
    pub drink_type: DrinkType,
    pub name: String,
    pub consumed_at: DateTime<Utc>,
}

/// A stored consumption row as returned after recording it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ConsumptionRecord {
    pub id: i64,
    pub user_id: UserId,
    pub drink_id: DrinkId,
    pub consumed_at: DateTime<Utc>,
}
