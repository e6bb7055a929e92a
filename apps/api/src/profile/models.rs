//! Candidate profile: the immutable input to selection.
//!
//! Serde shapes follow the canonical profile JSON. Every collection defaults to
//! empty so partially filled profiles still load.

use serde::{Deserialize, Serialize};

/// Provenance marker for bullets typed in by the user rather than taken from a
/// source document.
pub const USER_ADDED_SOURCE: &str = "user_added";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl Identity {
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.email.trim().is_empty()
    }
}

/// A source document the profile was assembled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub source_id: String,
    /// e.g. "resume", "linkedin", "note"
    #[serde(rename = "type")]
    pub kind: String,
    pub uri_or_text: String,
}

/// A single achievement statement and the documents it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub text: String,
    #[serde(default)]
    pub source_ids: Vec<String>,
}

impl Bullet {
    pub fn new(text: impl Into<String>, source_ids: Vec<String>) -> Self {
        Self {
            text: text.into(),
            source_ids,
        }
    }
}

/// One role. Period markers are free-form strings, never parsed as dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub bullets: Vec<Bullet>,
    /// Tags used only for the skill-overlap boost.
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub hard: Vec<String>,
    #[serde(default)]
    pub soft: Vec<String>,
}

/// The full candidate profile. `work_experience` is assumed reverse-chronological.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub work_experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub projects: Vec<serde_json::Value>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}
