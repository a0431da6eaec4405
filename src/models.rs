//! Server-shaped records. Unknown fields are kept in `extra` so a record read
//! from the API serializes back out unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// A reference to another record: the bare id, the populated object, or
/// `null` when the referenced record was deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref {
    Id(String),
    Populated(Map<String, Value>),
    Missing,
}

impl Ref {
    pub fn id(&self) -> Option<&str> {
        match self {
            Ref::Id(s) => Some(s.as_str()),
            Ref::Populated(m) => m.get("_id").and_then(|v| v.as_str()),
            Ref::Missing => None,
        }
    }
}

/// Keeps an explicit `null` as `Some(Ref::Missing)`; an absent field stays
/// `None` through `#[serde(default)]`.
fn present_ref<'de, D>(d: D) -> Result<Option<Ref>, D::Error>
where
    D: Deserializer<'de>,
{
    Ref::deserialize(d).map(Some)
}

fn as_f64(n: &Option<Number>) -> f64 {
    n.as_ref().and_then(Number::as_f64).unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learner {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<Ref>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificates: Option<Vec<Value>>,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub abonnement: Option<Ref>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professor {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<Ref>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, rename = "clientId", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseModule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<Video>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CourseModule {
    pub fn videos(&self) -> &[Video] {
        self.videos.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub categorie: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<CourseModule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub professeur: Option<Ref>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Course {
    pub fn modules(&self) -> &[CourseModule] {
        self.modules.as_deref().unwrap_or_default()
    }

    pub fn video_count(&self) -> usize {
        self.modules().iter().map(|m| m.videos().len()).sum()
    }

    pub fn total_duration(&self) -> f64 {
        self.modules()
            .iter()
            .flat_map(|m| m.videos().iter())
            .map(|v| as_f64(&v.duration))
            .sum()
    }
}

/// Shared by quiz drafts and stored quizzes. Empty fields are left out so a
/// stored question serializes as the server sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub course: Option<Ref>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuizQuestion>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offers: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub apprenant: Option<Ref>,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub plan: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subscription {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let status = self.status.as_deref().unwrap_or("").to_ascii_lowercase();
        if matches!(status.as_str(), "expired" | "cancelled" | "canceled" | "expiré") {
            return false;
        }
        match self.end_date.as_deref().and_then(parse_date) {
            Some(end) => end > now,
            None => false,
        }
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub subscription: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Payment {
    pub fn amount(&self) -> f64 {
        as_f64(&self.amount)
    }
}

/// Application status with the platform's French labels. Any other label is
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DemandeStatus {
    Pending,
    Accepted,
    Refused,
    Other(String),
}

impl DemandeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DemandeStatus::Pending => "en attente",
            DemandeStatus::Accepted => "acceptée",
            DemandeStatus::Refused => "refusée",
            DemandeStatus::Other(s) => s,
        }
    }
}

impl From<String> for DemandeStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "en attente" => DemandeStatus::Pending,
            "acceptée" => DemandeStatus::Accepted,
            "refusée" => DemandeStatus::Refused,
            _ => DemandeStatus::Other(s),
        }
    }
}

impl From<DemandeStatus> for String {
    fn from(s: DemandeStatus) -> Self {
        match s {
            DemandeStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demande {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Absent means pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DemandeStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub apprenant: Option<Ref>,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub course: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub apprenant: Option<Ref>,
    #[serde(
        default,
        deserialize_with = "present_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub course: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Averages can be fractional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
