//! Backend raw wire types: serde shapes for the tournament REST responses.
//! These map to the canonical domain types in client.rs. Every field is
//! optional: the backend emits camelCase on some endpoints and snake_case on
//! others, and one odd value must not sink a whole collection.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Team records  (participants / leaderboard / all-data)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TeamRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(rename = "teamName", default, deserialize_with = "lenient_text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub participant1: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub participant_1: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub participant2: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub participant_2: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone1: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone2: Option<String>,

    #[serde(rename = "uniqueCode", default, deserialize_with = "lenient_text")]
    pub unique_code_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub unique_code: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub leaderboard_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub in_leaderboard: Option<bool>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub collection: Option<String>,

    #[serde(rename = "totalPoints", default, deserialize_with = "lenient_count")]
    pub total_points: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub points: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub leaderboard_points: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub wins: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub leaderboard_wins: Option<u32>,
    #[serde(rename = "gamesPlayed", default, deserialize_with = "lenient_count")]
    pub games_played_camel: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub games_played: Option<u32>,

    /// Firestore server timestamp; object, string or epoch number.
    pub created_at: Option<Value>,
    #[serde(rename = "createdAt")]
    pub created_at_camel: Option<Value>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AllDataResponse {
    pub participants: Option<Vec<TeamRecord>>,
    pub leaderboard: Option<Vec<TeamRecord>>,
}

// ---------------------------------------------------------------------------
// Acknowledgements
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct GenerateCodeResponse {
    #[serde(rename = "uniqueCode", default, deserialize_with = "lenient_text")]
    pub unique_code: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct MessageResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(rename = "uniqueCode", default, deserialize_with = "lenient_text")]
    pub unique_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
}

/// `{ "error": "..." }` body sent with application-level failures.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ErrorBody {
    pub error: Option<Value>,
}

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_from_value))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Some(Value::String(s)) => Some(matches!(s.trim(), "true" | "1")),
        _ => None,
    })
}

pub(crate) fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-negative integer counters. Floats truncate, numeric strings parse,
/// negatives and anything else read as absent.
pub(crate) fn count_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.min(u32::MAX as f64) as u32)
            }),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_accept_integers_floats_and_numeric_strings() {
        assert_eq!(count_from_value(&json!(7)), Some(7));
        assert_eq!(count_from_value(&json!(7.9)), Some(7));
        assert_eq!(count_from_value(&json!(" 12 ")), Some(12));
        assert_eq!(count_from_value(&json!(-3)), None);
        assert_eq!(count_from_value(&json!("many")), None);
        assert_eq!(count_from_value(&json!(null)), None);
    }

    #[test]
    fn malformed_fields_do_not_fail_the_record() {
        let raw: TeamRecord = serde_json::from_value(json!({
            "id": 42,
            "teamName": "Pun Intended",
            "phone1": 5551234567u64,
            "totalPoints": "oops",
            "wins": [1, 2],
            "in_leaderboard": "true",
        }))
        .expect("lenient record should parse");
        assert_eq!(raw.id.as_deref(), Some("42"));
        assert_eq!(raw.phone1.as_deref(), Some("5551234567"));
        assert_eq!(raw.total_points, None);
        assert_eq!(raw.wins, None);
        assert_eq!(raw.in_leaderboard, Some(true));
    }

    #[test]
    fn all_data_tolerates_null_collections() {
        let raw: AllDataResponse =
            serde_json::from_value(json!({ "participants": null })).expect("should parse");
        assert!(raw.participants.is_none());
        assert!(raw.leaderboard.is_none());
    }
}
