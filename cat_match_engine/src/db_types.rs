use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row, Type};
use thiserror::Error;
use uuid::Uuid;

pub const MESSAGE_MIN_LEN: usize = 5;
pub const MESSAGE_MAX_LEN: usize = 120;
pub const CAT_NAME_MAX_LEN: usize = 30;
pub const CAT_DESCRIPTION_MAX_LEN: usize = 200;
pub const CAT_MAX_AGE_IN_MONTHS: i64 = 120_082;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

macro_rules! uuid_newtype {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generates a fresh, random (v4) identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier is a well-formed UUID.
            pub fn is_valid(&self) -> bool {
                Uuid::parse_str(&self.0).is_ok()
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(|u| Self(u.to_string()))
                    .map_err(|e| ConversionError(format!("{} is not a valid {}. {e}", s, $label)))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

//--------------------------------------        Identifiers      -------------------------------------------------------
uuid_newtype!(UserId, "user id");
uuid_newtype!(CatId, "cat id");
uuid_newtype!(MatchId, "match request id");

//--------------------------------------           Sex           -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Sex {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            s => Err(ConversionError(format!("Invalid sex: {s}"))),
        }
    }
}

//--------------------------------------           Race          -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Race {
    Persian,
    #[sqlx(rename = "Maine Coon")]
    #[serde(rename = "Maine Coon")]
    MaineCoon,
    Siamese,
    Ragdoll,
    Bengal,
    Sphynx,
    #[sqlx(rename = "British Shorthair")]
    #[serde(rename = "British Shorthair")]
    BritishShorthair,
    Abyssinian,
    #[sqlx(rename = "Scottish Fold")]
    #[serde(rename = "Scottish Fold")]
    ScottishFold,
    Birman,
}

impl Race {
    pub const ALL: [Race; 10] = [
        Race::Persian,
        Race::MaineCoon,
        Race::Siamese,
        Race::Ragdoll,
        Race::Bengal,
        Race::Sphynx,
        Race::BritishShorthair,
        Race::Abyssinian,
        Race::ScottishFold,
        Race::Birman,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Race::Persian => "Persian",
            Race::MaineCoon => "Maine Coon",
            Race::Siamese => "Siamese",
            Race::Ragdoll => "Ragdoll",
            Race::Bengal => "Bengal",
            Race::Sphynx => "Sphynx",
            Race::BritishShorthair => "British Shorthair",
            Race::Abyssinian => "Abyssinian",
            Race::ScottishFold => "Scottish Fold",
            Race::Birman => "Birman",
        }
    }
}

impl Display for Race {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Race {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Race::ALL.iter().find(|r| r.as_str() == s).copied().ok_or_else(|| ConversionError(format!("Invalid race: {s}")))
    }
}

//--------------------------------------       MatchStatus       -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// The request has been issued and is waiting for the target cat's owner to decide.
    Pending,
    /// The target cat's owner accepted the request. Both cats are now matched.
    Approved,
    /// The target cat's owner turned the request down.
    Rejected,
}

impl MatchStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchStatus::Pending)
    }
}

impl Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Pending => write!(f, "pending"),
            MatchStatus::Approved => write!(f, "approved"),
            MatchStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for MatchStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            s => Err(ConversionError(format!("Invalid match status: {s}"))),
        }
    }
}

impl From<String> for MatchStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid match status: {value}. But this conversion cannot fail. Defaulting to Pending");
            MatchStatus::Pending
        })
    }
}

//--------------------------------------           User          -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Users are registered by the identity service. This record only carries the public profile that the match listing
/// displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn new<S: Into<String>>(id: UserId, name: S, email: S) -> Self {
        Self { id, name: name.into(), email: email.into() }
    }
}

//--------------------------------------           Cat           -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cat {
    pub id: CatId,
    pub owner_id: UserId,
    pub name: String,
    pub race: Race,
    pub sex: Sex,
    pub age_in_months: i64,
    pub description: String,
    #[sqlx(json)]
    pub image_urls: Vec<String>,
    pub has_matched: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Cat {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCat {
    pub name: String,
    pub race: Race,
    pub sex: Sex,
    pub age_in_months: i64,
    pub description: String,
    pub image_urls: Vec<String>,
}

/// The set of attributes an owner may change on a cat. Every field is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatUpdate {
    pub name: String,
    pub race: Race,
    pub sex: Sex,
    pub age_in_months: i64,
    pub description: String,
    pub image_urls: Vec<String>,
}

impl From<CatUpdate> for NewCat {
    fn from(u: CatUpdate) -> Self {
        Self {
            name: u.name,
            race: u.race,
            sex: u.sex,
            age_in_months: u.age_in_months,
            description: u.description,
            image_urls: u.image_urls,
        }
    }
}

//--------------------------------------       MatchRequest      -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub id: MatchId,
    pub issuer_cat_id: CatId,
    pub match_cat_id: CatId,
    pub message: String,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchRequest {
    pub fn involves(&self, cat: &CatId) -> bool {
        &self.issuer_cat_id == cat || &self.match_cat_id == cat
    }

    pub fn is_pending(&self) -> bool {
        self.status == MatchStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatchRequest {
    #[serde(rename = "userCatId")]
    pub issuer_cat_id: CatId,
    #[serde(rename = "matchCatId")]
    pub match_cat_id: CatId,
    pub message: String,
}

impl NewMatchRequest {
    pub fn new<S: Into<String>>(issuer_cat_id: CatId, match_cat_id: CatId, message: S) -> Self {
        Self { issuer_cat_id, match_cat_id, message: message.into() }
    }
}

//--------------------------------------    MatchRequestDetail   -------------------------------------------------------
/// The public profile of the user who issued a match request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerProfile {
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatSummary {
    pub id: CatId,
    pub name: String,
    pub race: Race,
    pub sex: Sex,
    pub description: String,
    pub age_in_months: i64,
    pub image_urls: Vec<String>,
    pub has_matched: bool,
    pub created_at: DateTime<Utc>,
}

/// A match request as it is presented to the owners of either cat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequestDetail {
    pub id: MatchId,
    pub issued_by: IssuerProfile,
    pub match_cat_detail: CatSummary,
    pub user_cat_detail: CatSummary,
    pub message: String,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

fn cat_summary_from_row(row: &SqliteRow, prefix: &str) -> Result<CatSummary, sqlx::Error> {
    let col = |name: &str| format!("{prefix}_{name}");
    let image_urls: sqlx::types::Json<Vec<String>> = row.try_get(col("image_urls").as_str())?;
    Ok(CatSummary {
        id: row.try_get(col("id").as_str())?,
        name: row.try_get(col("name").as_str())?,
        race: row.try_get(col("race").as_str())?,
        sex: row.try_get(col("sex").as_str())?,
        description: row.try_get(col("description").as_str())?,
        age_in_months: row.try_get(col("age_in_months").as_str())?,
        image_urls: image_urls.0,
        has_matched: row.try_get(col("has_matched").as_str())?,
        created_at: row.try_get(col("created_at").as_str())?,
    })
}

impl<'r> FromRow<'r, SqliteRow> for MatchRequestDetail {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let issued_by = IssuerProfile {
            name: row.try_get("issuer_name")?,
            email: row.try_get("issuer_email")?,
            created_at: row.try_get("issuer_created_at")?,
        };
        Ok(Self {
            id: row.try_get("id")?,
            issued_by,
            match_cat_detail: cat_summary_from_row(row, "match_cat")?,
            user_cat_detail: cat_summary_from_row(row, "user_cat")?,
            message: row.try_get("message")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
