//! Profile sources: each input format parses into a `PartialProfile`.
//!
//! New formats plug in by implementing `ProfileSource` and adding a `SourceKind`
//! variant; `merge_profiles` never sees the raw payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::profile::models::{Artifact, Candidate, Education, Experience, Identity};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Malformed {kind} payload: {message}")]
    Malformed { kind: &'static str, message: String },

    #[error("Invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// What one source contributes before merging. Bullets may carry no source ids
/// yet; the merge step tags them with the source they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialProfile {
    pub identity: Option<Identity>,
    pub work_experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills_hard: Vec<String>,
    pub skills_soft: Vec<String>,
    pub certifications: Vec<String>,
    pub projects: Vec<Value>,
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The canonical candidate profile JSON.
    Profile,
    /// A LinkedIn data-export `Profile.json`.
    Linkedin,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Profile => "profile",
            SourceKind::Linkedin => "linkedin",
        }
    }

    pub fn parser(&self) -> &'static dyn ProfileSource {
        match self {
            SourceKind::Profile => &CanonicalProfileSource,
            SourceKind::Linkedin => &LinkedInExportSource,
        }
    }
}

pub trait ProfileSource: Send + Sync {
    fn parse(&self, raw: &Value) -> Result<PartialProfile, ProfileError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical profile JSON
// ────────────────────────────────────────────────────────────────────────────

pub struct CanonicalProfileSource;

impl ProfileSource for CanonicalProfileSource {
    fn parse(&self, raw: &Value) -> Result<PartialProfile, ProfileError> {
        if !raw.is_object() {
            return Err(ProfileError::Malformed {
                kind: "profile",
                message: "expected a JSON object".to_string(),
            });
        }
        let candidate: Candidate = serde_json::from_value(raw.clone())?;
        let identity = (!candidate.identity.is_blank()).then_some(candidate.identity);

        Ok(PartialProfile {
            identity,
            work_experience: candidate.work_experience,
            education: candidate.education,
            skills_hard: candidate.skills.hard,
            skills_soft: candidate.skills.soft,
            certifications: candidate.certifications,
            projects: candidate.projects,
            artifacts: candidate.artifacts,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LinkedIn data export
// ────────────────────────────────────────────────────────────────────────────

/// Reads the loosely structured LinkedIn export. Field names vary between export
/// versions, so every lookup tries a list of aliases.
pub struct LinkedInExportSource;

impl ProfileSource for LinkedInExportSource {
    fn parse(&self, raw: &Value) -> Result<PartialProfile, ProfileError> {
        let mut data = raw;
        if let Some(inner) = raw.get("Profile").filter(|v| v.is_object()) {
            data = inner;
        }
        if !data.is_object() {
            return Err(ProfileError::Malformed {
                kind: "linkedin",
                message: "expected a JSON object".to_string(),
            });
        }

        let work_experience = collection(data, &["positions", "Positions", "experience"])
            .iter()
            .map(parse_position)
            .collect();

        let education = collection(data, &["education", "Education"])
            .iter()
            .map(parse_school)
            .collect();

        let skills_hard = collection(data, &["skills", "Skills"])
            .iter()
            .filter_map(|s| match s {
                Value::String(name) => Some(name.clone()),
                Value::Object(_) => first_str(s, &["name", "skillName"]),
                _ => None,
            })
            .collect();

        Ok(PartialProfile {
            work_experience,
            education,
            skills_hard,
            ..PartialProfile::default()
        })
    }
}

fn parse_position(position: &Value) -> Experience {
    let company = first_str(position, &["companyName", "company", "organization"]).unwrap_or_default();
    let role = first_str(position, &["title", "positionTitle", "role"]).unwrap_or_default();

    let period = first_value(position, &["timePeriod", "date"]);
    let (start, end) = match period {
        Some(p) if p.is_object() => (
            first_value(p, &["startDate", "start"]).and_then(year_or_scalar),
            first_value(p, &["endDate", "end"]).and_then(year_or_scalar),
        ),
        _ => (None, None),
    };

    Experience {
        company,
        role,
        start,
        end,
        ..Experience::default()
    }
}

fn parse_school(school: &Value) -> Education {
    let institution = first_str(school, &["schoolName", "organization", "name"]).unwrap_or_default();
    let degree = first_str(school, &["degreeName", "degree"]);
    let period = school.get("timePeriod");
    let start = school
        .get("startYear")
        .and_then(scalar_to_string)
        .or_else(|| period.and_then(|p| p.pointer("/startDate/year")).and_then(scalar_to_string));
    let end = school
        .get("endYear")
        .and_then(scalar_to_string)
        .or_else(|| period.and_then(|p| p.pointer("/endDate/year")).and_then(scalar_to_string));

    Education {
        institution,
        degree,
        start,
        end,
    }
}

/// Returns the array under the first present alias, unwrapping `{"values": [...]}`.
fn collection<'a>(data: &'a Value, aliases: &[&str]) -> &'a [Value] {
    let Some(found) = first_value(data, aliases) else {
        return &[];
    };
    let found = found.get("values").unwrap_or(found);
    found.as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// First alias whose value is present and truthy (non-null, non-empty).
fn first_value<'a>(data: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| data.get(*key))
        .find(|v| is_truthy(v))
}

fn first_str(data: &Value, aliases: &[&str]) -> Option<String> {
    first_value(data, aliases).and_then(scalar_to_string)
}

fn year_or_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) => value.get("year").and_then(scalar_to_string),
        other => scalar_to_string(other),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_source_keeps_bullet_provenance() {
        let raw = json!({
            "identity": {"name": "Grace Hopper", "email": "grace@example.com"},
            "work_experience": [{
                "company": "Navy",
                "role": "Rear Admiral",
                "bullets": [{"text": "Led COBOL standardisation", "source_ids": ["cv.docx"]}]
            }],
            "skills": {"hard": ["COBOL"]}
        });
        let partial = SourceKind::Profile.parser().parse(&raw).unwrap();
        assert_eq!(partial.identity.unwrap().name, "Grace Hopper");
        assert_eq!(partial.work_experience[0].bullets[0].source_ids, vec!["cv.docx"]);
        assert_eq!(partial.skills_hard, vec!["COBOL"]);
    }

    #[test]
    fn test_canonical_source_rejects_non_object() {
        let err = CanonicalProfileSource.parse(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, ProfileError::Malformed { kind: "profile", .. }));
    }

    #[test]
    fn test_canonical_blank_identity_is_none() {
        let partial = CanonicalProfileSource.parse(&json!({"skills": {"hard": ["Go"]}})).unwrap();
        assert!(partial.identity.is_none());
    }

    #[test]
    fn test_linkedin_unwraps_profile_and_values() {
        let raw = json!({
            "Profile": {
                "positions": {"values": [{
                    "companyName": "Acme",
                    "title": "Staff Engineer",
                    "timePeriod": {"startDate": {"year": 2019, "month": 3}, "endDate": {"year": 2023}}
                }]},
                "education": [{"schoolName": "MIT", "degreeName": "BS", "startYear": 2010, "endYear": "2014"}],
                "skills": [{"name": "Rust"}, "Kubernetes", {"skillName": "Terraform"}, 7]
            }
        });
        let partial = LinkedInExportSource.parse(&raw).unwrap();

        let role = &partial.work_experience[0];
        assert_eq!(role.company, "Acme");
        assert_eq!(role.role, "Staff Engineer");
        assert_eq!(role.start.as_deref(), Some("2019"));
        assert_eq!(role.end.as_deref(), Some("2023"));
        assert!(role.bullets.is_empty());

        let school = &partial.education[0];
        assert_eq!(school.institution, "MIT");
        assert_eq!(school.degree.as_deref(), Some("BS"));
        assert_eq!(school.start.as_deref(), Some("2010"));
        assert_eq!(school.end.as_deref(), Some("2014"));

        assert_eq!(partial.skills_hard, vec!["Rust", "Kubernetes", "Terraform"]);
    }

    #[test]
    fn test_linkedin_alias_fallbacks() {
        let raw = json!({
            "experience": [{"company": "Initech", "positionTitle": "Analyst", "date": {"start": "2015", "end": null}}],
            "Education": [{"organization": "State U", "timePeriod": {"startDate": {"year": 2008}, "endDate": {"year": 2012}}}]
        });
        let partial = LinkedInExportSource.parse(&raw).unwrap();
        assert_eq!(partial.work_experience[0].company, "Initech");
        assert_eq!(partial.work_experience[0].role, "Analyst");
        assert_eq!(partial.work_experience[0].start.as_deref(), Some("2015"));
        assert!(partial.work_experience[0].end.is_none());
        assert_eq!(partial.education[0].start.as_deref(), Some("2008"));
        assert_eq!(partial.education[0].end.as_deref(), Some("2012"));
    }

    #[test]
    fn test_linkedin_empty_export_yields_empty_profile() {
        let partial = LinkedInExportSource.parse(&json!({})).unwrap();
        assert_eq!(partial, PartialProfile::default());
    }
}
