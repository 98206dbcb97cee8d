mod drink;
mod history;
mod preferences;

pub use drink::{
    well_formed, Drink, DrinkCategory, DrinkId, DrinkRecord, DrinkType, DrunkennessLevel,
    MalformedDrink, NewDrink, UnknownVariant,
};
pub use history::{ConsumptionRecord, HistoryEntry, UserId};
pub use preferences::{ParticipantType, PreferenceProfile, ScoredDrink};

use serde::Deserialize;

/// Request to log that the caller just had a drink
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRequest {
    pub drink_id: DrinkId,
}
