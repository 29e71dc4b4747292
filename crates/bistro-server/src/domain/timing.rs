use std::collections::HashSet;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

#[derive(Debug)]
pub struct ParseDayOfWeekError;

impl FromStr for DayOfWeek {
    type Err = ParseDayOfWeekError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Mon" => Ok(Self::Mon),
            "Tue" => Ok(Self::Tue),
            "Wed" => Ok(Self::Wed),
            "Thu" => Ok(Self::Thu),
            "Fri" => Ok(Self::Fri),
            "Sat" => Ok(Self::Sat),
            "Sun" => Ok(Self::Sun),
            _ => Err(ParseDayOfWeekError),
        }
    }
}

/// One opening window, owned by its restaurant, at most one per day.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RestaurantTiming {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingRequest {
    /// Kept as a raw string so an unknown label surfaces as a business-rule
    /// violation rather than a deserialization failure.
    pub day_of_week: String,
    #[serde(default, with = "opt_time")]
    pub open_time: Option<NaiveTime>,
    #[serde(default, with = "opt_time")]
    pub close_time: Option<NaiveTime>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingResponse {
    pub day_of_week: DayOfWeek,
    #[serde(with = "opt_time")]
    pub open_time: Option<NaiveTime>,
    #[serde(with = "opt_time")]
    pub close_time: Option<NaiveTime>,
}

impl From<RestaurantTiming> for TimingResponse {
    fn from(t: RestaurantTiming) -> Self {
        Self {
            day_of_week: t.day_of_week,
            open_time: t.open_time,
            close_time: t.close_time,
        }
    }
}

/// Reject the first broken timing rule: a repeated day, an unknown day
/// label, an open time equal to the close time, or only one of the pair.
pub fn validate_timings(timings: &[TimingRequest]) -> Result<(), AppError> {
    let mut days_provided = HashSet::new();

    for timing in timings {
        let day = timing.day_of_week.as_str();

        if !days_provided.insert(day) {
            return Err(AppError::BusinessRule(format!(
                "Duplicate timing entry for day: {day}"
            )));
        }

        if day.parse::<DayOfWeek>().is_err() {
            return Err(AppError::BusinessRule(format!("Invalid day of week: {day}")));
        }

        if let (Some(open), Some(close)) = (timing.open_time, timing.close_time) {
            if open == close {
                return Err(AppError::BusinessRule(format!(
                    "Open time and close time cannot be the same for {day}"
                )));
            }
        }

        if timing.open_time.is_some() != timing.close_time.is_some() {
            return Err(AppError::BusinessRule(format!(
                "Both open time and close time must be provided for {day}"
            )));
        }
    }

    Ok(())
}

/// Times wire format: accepts `HH:MM` or `HH:MM:SS`, renders `HH:MM:SS`.
pub mod opt_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const PARSE_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => serializer.serialize_some(&t.format("%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => PARSE_FORMATS
                .iter()
                .find_map(|f| NaiveTime::parse_from_str(&s, f).ok())
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day: {s}"))),
        }
    }
}
