use serde::{Deserialize, Serialize};

use super::{Drink, DrinkCategory, DrinkType, DrunkennessLevel};

/// Who the drink is for, as stated by the user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantType {
    Talker,
    Dancer,
}

impl ParticipantType {
    /// Whether a drink of the given category suits this participant
    pub fn suits(self, category: DrinkCategory) -> bool {
        matches!(
            (self, category),
            (ParticipantType::Talker, DrinkCategory::Talker)
                | (ParticipantType::Dancer, DrinkCategory::Dancer)
        )
    }
}

/// Preferences supplied with every recommendation request
///
/// All fields are optional; an absent preference simply never matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    #[serde(default)]
    pub drink_type: Option<DrinkType>,
    #[serde(default)]
    pub preferred_style: Option<String>,
    #[serde(default)]
    pub participant_type: Option<ParticipantType>,
    #[serde(default)]
    pub desired_drunkenness_level: Option<DrunkennessLevel>,
}

/// A drink together with the score it earned during one recommendation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredDrink {
    #[serde(flatten)]
    pub drink: Drink,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_camel_case() {
        let profile: PreferenceProfile = serde_json::from_str(
            r#"{
                "drinkType": "non_alcoholic",
                "preferredStyle": "soda",
                "participantType": "dancer",
                "desiredDrunkennessLevel": "sober"
            }"#,
        )
        .unwrap();

        assert_eq!(profile.drink_type, Some(DrinkType::NonAlcoholic));
        assert_eq!(profile.preferred_style.as_deref(), Some("soda"));
        assert_eq!(profile.participant_type, Some(ParticipantType::Dancer));
        assert_eq!(
            profile.desired_drunkenness_level,
            Some(DrunkennessLevel::Sober)
        );
    }

    #[test]
    fn test_profile_fields_are_optional() {
        let profile: PreferenceProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile, PreferenceProfile::default());
    }

    #[test]
    fn test_profile_rejects_unknown_enum_value() {
        let result = serde_json::from_str::<PreferenceProfile>(r#"{"drinkType": "beer"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_participant_suits_category() {
        assert!(ParticipantType::Talker.suits(DrinkCategory::Talker));
        assert!(!ParticipantType::Talker.suits(DrinkCategory::Dancer));
        // "both" is handled by the scorer, not here
        assert!(!ParticipantType::Dancer.suits(DrinkCategory::Both));
    }
}
