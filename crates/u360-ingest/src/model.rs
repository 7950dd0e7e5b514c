//! Ingested record types
//!
//! A [`User`] is decoded from one NDJSON line, mapped to facts and dropped.
//! Field names on the wire follow the upstream export (`user_id`,
//! `derived_team_rf`, ...). Missing fields decode to their zero value.

use serde::{Deserialize, Deserializer, Serialize};

/// `user_type` value marking a registered account.
pub const REGISTERED_USER_TYPE: &str = "registered";

/// One user profile record.
///
/// Every wire field tolerates `null`, which decodes to the field's zero value
/// and leaves the rest of the record intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Opaque user identifier ("swid").
    #[serde(rename = "user_id", deserialize_with = "null_as_default")]
    pub swid: String,

    /// "registered" or empty for anonymous users.
    #[serde(rename = "user_type", deserialize_with = "null_as_default")]
    pub user_type: String,

    #[serde(deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(deserialize_with = "null_as_default")]
    pub age: i64,

    /// Not mapped yet; the country frame carries a placeholder.
    #[serde(deserialize_with = "null_as_default")]
    pub registered_country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub registered_dma_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub registered_postal_code: String,

    #[serde(deserialize_with = "null_as_default")]
    pub is_league_manager: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub plays_fantasy: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_favorites: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_notifications: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub has_autostart: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_insider: bool,

    #[serde(deserialize_with = "null_as_default")]
    pub page_views: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub time_spent: i64,
    /// Exported upstream but not loaded.
    #[serde(deserialize_with = "null_as_default")]
    pub video_starts: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub video_completes: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub visits: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub hits: i64,

    #[serde(rename = "stated_teams_favorites", deserialize_with = "null_as_default")]
    pub stated_favorites: Vec<Favorite>,

    #[serde(rename = "derived_team_rf", deserialize_with = "null_as_default")]
    pub derived_favorites: Vec<Favorite>,

    /// 1-based position of the line inside its source object.
    #[serde(skip)]
    pub row_num: u64,

    /// Global column id, stamped by a load worker.
    #[serde(skip)]
    pub column_id: Option<u64>,
}

impl User {
    pub fn is_registered(&self) -> bool {
        self.user_type == REGISTERED_USER_TYPE
    }
}

/// Upstream exports write `null` for absent values of any type.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A team affinity, either declared by the user or inferred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Favorite {
    #[serde(deserialize_with = "null_as_default")]
    pub team_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sport_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub team_id: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub sport_id: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub league_id: i32,
    /// Confidence tier label; only meaningful for derived favourites.
    #[serde(deserialize_with = "null_as_default")]
    pub bucket: String,
}

/// Confidence tier of a derived favourite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    High,
    Medium,
    Low,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::High, Bucket::Medium, Bucket::Low];

    /// Exact, case-sensitive match on the wire label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "High" => Some(Bucket::High),
            "Medium" => Some(Bucket::Medium),
            "Low" => Some(Bucket::Low),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::High => "High",
            Bucket::Medium => "Medium",
            Bucket::Low => "Low",
        }
    }

    /// Lowercase form used inside dimension names.
    pub fn slug(self) -> &'static str {
        match self {
            Bucket::High => "high",
            Bucket::Medium => "medium",
            Bucket::Low => "low",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wire_names() {
        let line = r#"{"user_id":"abc","user_type":"registered","gender":"F","age":31,
            "registered_dma_id":"501","registered_postal_code":"10001",
            "plays_fantasy":true,"page_views":12,
            "stated_teams_favorites":[{"team_id":7,"sport_id":10,"league_id":10}],
            "derived_team_rf":[{"team_id":3,"league_id":28,"bucket":"High"}]}"#;

        let user: User = serde_json::from_str(line).unwrap();
        assert_eq!(user.swid, "abc");
        assert!(user.is_registered());
        assert_eq!(user.age, 31);
        assert!(user.plays_fantasy);
        assert!(!user.is_insider);
        assert_eq!(user.stated_favorites[0].sport_id, 10);
        assert_eq!(user.derived_favorites[0].bucket, "High");
        assert_eq!(user.row_num, 0);
        assert_eq!(user.column_id, None);
    }

    #[test]
    fn test_missing_fields_are_zero() {
        let user: User = serde_json::from_str("{}").unwrap();
        assert_eq!(user, User::default());
    }

    #[test]
    fn test_null_lists_and_strings() {
        let line = r#"{"user_id":null,"gender":null,"stated_teams_favorites":null,"derived_team_rf":null}"#;
        let user: User = serde_json::from_str(line).unwrap();
        assert!(user.swid.is_empty());
        assert!(user.stated_favorites.is_empty());
        assert!(user.derived_favorites.is_empty());
    }

    #[test]
    fn test_null_scalar_keeps_other_fields() {
        let line = r#"{"user_id":"a","gender":"F","age":null}"#;
        let user: User = serde_json::from_str(line).unwrap();
        assert_eq!(user.swid, "a");
        assert_eq!(user.gender, "F");
        assert_eq!(user.age, 0);
    }

    #[test]
    fn test_null_in_every_field_kind() {
        let line = r#"{"user_id":"b","registered_country":null,"plays_fantasy":null,
            "is_insider":true,"hits":null,"visits":4,
            "stated_teams_favorites":[{"team_name":null,"sport_name":null,"team_id":7,
                "sport_id":10,"league_id":null,"bucket":null}]}"#;
        let user: User = serde_json::from_str(line).unwrap();

        assert_eq!(user.swid, "b");
        assert!(user.registered_country.is_empty());
        assert!(!user.plays_fantasy);
        assert!(user.is_insider);
        assert_eq!((user.hits, user.visits), (0, 4));

        let favorite = &user.stated_favorites[0];
        assert!(favorite.team_name.is_empty());
        assert_eq!((favorite.team_id, favorite.sport_id, favorite.league_id), (7, 10, 0));
        assert!(favorite.bucket.is_empty());
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        assert!(serde_json::from_str::<User>(r#"{"age":"old"}"#).is_err());
    }

    #[test]
    fn test_bucket_labels() {
        for bucket in Bucket::ALL {
            assert_eq!(Bucket::from_label(bucket.label()), Some(bucket));
        }
        assert_eq!(Bucket::from_label("high"), None);
        assert_eq!(Bucket::from_label(""), None);
    }

    #[test]
    fn test_serialize_skips_pipeline_fields() {
        let user = User {
            swid: "x".into(),
            row_num: 9,
            column_id: Some(4),
            ..Default::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["user_id"], "x");
        assert!(json.get("row_num").is_none());
        assert!(json.get("column_id").is_none());
    }
}
