//! Profile merging: folds partial profiles from several sources into one `Candidate`.
//!
//! Provenance is never dropped: bullets are tagged with the source that produced
//! them, and a bullet seen in two sources keeps both source ids.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::models::{Artifact, Bullet, Candidate, Education, Experience, Identity, Skills};
use crate::profile::sources::{PartialProfile, SourceKind};

/// A parsed source together with the id its bullets will be attributed to.
#[derive(Debug, Clone)]
pub struct SourcedProfile {
    pub source_id: String,
    pub kind: SourceKind,
    pub profile: PartialProfile,
}

/// Field-wise identity overrides applied after merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityOverrides {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub links: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Content whose source id contains this substring (case-insensitive) is
    /// ordered first.
    pub prefer: Option<String>,
    #[serde(default)]
    pub identity: IdentityOverrides,
}

/// Merges all pieces into a single candidate.
pub fn merge_profiles(pieces: Vec<SourcedProfile>, options: &MergeOptions) -> Candidate {
    let mut identity: Option<Identity> = None;
    let mut roles: Vec<Experience> = Vec::new();
    let mut role_index: HashMap<RoleKey, usize> = HashMap::new();
    let mut education: Vec<Education> = Vec::new();
    let mut seen_education: HashSet<(String, String, String, String)> = HashSet::new();
    let mut skills_hard = Vec::new();
    let mut skills_soft = Vec::new();
    let mut certifications = Vec::new();
    let mut projects = Vec::new();
    let mut artifacts: Vec<Artifact> = Vec::new();

    for piece in pieces {
        let SourcedProfile {
            source_id,
            kind,
            profile,
        } = piece;

        if identity.is_none() {
            identity = profile.identity.filter(|i| !i.is_blank());
        }

        for mut experience in profile.work_experience {
            experience.bullets = std::mem::take(&mut experience.bullets)
                .into_iter()
                .map(|bullet| {
                    if bullet.source_ids.is_empty() {
                        Bullet::new(bullet.text, vec![source_id.clone()])
                    } else {
                        bullet
                    }
                })
                .collect();

            let key = RoleKey::of(&experience);
            match role_index.get(&key) {
                Some(&slot) => absorb_role(&mut roles[slot], experience),
                None => {
                    role_index.insert(key, roles.len());
                    let bullets = std::mem::take(&mut experience.bullets);
                    merge_bullets(&mut experience.bullets, bullets);
                    roles.push(experience);
                }
            }
        }

        for school in profile.education {
            let key = (
                school.institution.trim().to_lowercase(),
                school.degree.as_deref().unwrap_or("").trim().to_lowercase(),
                school.start.clone().unwrap_or_default(),
                school.end.clone().unwrap_or_default(),
            );
            if seen_education.insert(key) {
                education.push(school);
            }
        }

        skills_hard.extend(profile.skills_hard);
        skills_soft.extend(profile.skills_soft);
        certifications.extend(profile.certifications);
        projects.extend(profile.projects);

        for artifact in profile.artifacts {
            push_artifact(&mut artifacts, artifact);
        }
        push_artifact(
            &mut artifacts,
            Artifact {
                source_id: source_id.clone(),
                kind: kind.as_str().to_string(),
                uri_or_text: source_id,
            },
        );
    }

    if let Some(prefer) = options.prefer.as_deref().filter(|p| !p.trim().is_empty()) {
        prefer_source(&mut roles, prefer);
    }

    debug!(
        "Merged profile: {} roles, {} education entries, {} artifacts",
        roles.len(),
        education.len(),
        artifacts.len()
    );

    Candidate {
        identity: apply_overrides(identity.unwrap_or_default(), &options.identity),
        work_experience: roles,
        education,
        skills: Skills {
            hard: dedup_case_insensitive(&skills_hard),
            soft: dedup_case_insensitive(&skills_soft),
        },
        certifications: dedup_case_insensitive(&certifications),
        projects,
        artifacts,
    }
}

/// Case-insensitive, order-preserving dedup. Keeps the first spelling, trimmed.
pub fn dedup_case_insensitive(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RoleKey(String, String, Option<String>, Option<String>);

impl RoleKey {
    fn of(experience: &Experience) -> Self {
        RoleKey(
            experience.company.clone(),
            experience.role.clone(),
            experience.start.clone(),
            experience.end.clone(),
        )
    }
}

fn absorb_role(slot: &mut Experience, incoming: Experience) {
    merge_bullets(&mut slot.bullets, incoming.bullets);
    for skill in incoming.skills {
        if !slot.skills.contains(&skill) {
            slot.skills.push(skill);
        }
    }
    for tool in incoming.tools {
        if !slot.tools.contains(&tool) {
            slot.tools.push(tool);
        }
    }
}

/// Appends bullets whose trimmed, lower-cased text is new; a duplicate hands
/// its source ids to the bullet already present.
fn merge_bullets(existing: &mut Vec<Bullet>, incoming: Vec<Bullet>) {
    for bullet in incoming {
        let key = bullet.text.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        match existing
            .iter_mut()
            .find(|b| b.text.trim().to_lowercase() == key)
        {
            Some(kept) => {
                for id in bullet.source_ids {
                    if !kept.source_ids.contains(&id) {
                        kept.source_ids.push(id);
                    }
                }
            }
            None => existing.push(bullet),
        }
    }
}

fn prefer_source(roles: &mut [Experience], prefer: &str) {
    let needle = prefer.to_lowercase();
    let is_preferred =
        |b: &Bullet| b.source_ids.iter().any(|id| id.to_lowercase().contains(&needle));

    for role in roles.iter_mut() {
        // sort_by_key is stable: preferred bullets first, original order otherwise
        role.bullets.sort_by_key(|b| !is_preferred(b));
    }
    roles.sort_by_key(|r| !r.bullets.iter().any(|b| is_preferred(b)));
}

fn push_artifact(artifacts: &mut Vec<Artifact>, artifact: Artifact) {
    if !artifacts.iter().any(|a| a.source_id == artifact.source_id) {
        artifacts.push(artifact);
    }
}

fn apply_overrides(mut identity: Identity, overrides: &IdentityOverrides) -> Identity {
    if let Some(name) = &overrides.name {
        identity.name = name.clone();
    }
    if let Some(email) = &overrides.email {
        identity.email = email.clone();
    }
    if let Some(phone) = &overrides.phone {
        identity.phone = Some(phone.clone());
    }
    if let Some(location) = &overrides.location {
        identity.location = Some(location.clone());
    }
    if let Some(links) = &overrides.links {
        identity.links = links
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
    }
    identity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_role(company: &str, role: &str, bullets: &[&str]) -> Experience {
        Experience {
            company: company.to_string(),
            role: role.to_string(),
            start: Some("2020".to_string()),
            end: None,
            bullets: bullets.iter().map(|t| Bullet::new(*t, vec![])).collect(),
            ..Experience::default()
        }
    }

    fn make_piece(source_id: &str, roles: Vec<Experience>) -> SourcedProfile {
        SourcedProfile {
            source_id: source_id.to_string(),
            kind: SourceKind::Profile,
            profile: PartialProfile {
                work_experience: roles,
                ..PartialProfile::default()
            },
        }
    }

    #[test]
    fn test_untagged_bullets_get_their_source_id() {
        let merged = merge_profiles(
            vec![make_piece("resume_a.pdf", vec![make_role("Acme", "Dev", &["Built APIs"])])],
            &MergeOptions::default(),
        );
        assert_eq!(merged.work_experience[0].bullets[0].source_ids, vec!["resume_a.pdf"]);
    }

    #[test]
    fn test_duplicate_roles_coalesce_and_union_provenance() {
        let merged = merge_profiles(
            vec![
                make_piece("a.pdf", vec![make_role("Acme", "Dev", &["Built APIs", "Led hiring"])]),
                make_piece("b.docx", vec![make_role("Acme", "Dev", &["built apis ", "Cut costs 10%"])]),
            ],
            &MergeOptions::default(),
        );

        assert_eq!(merged.work_experience.len(), 1);
        let bullets = &merged.work_experience[0].bullets;
        assert_eq!(bullets.len(), 3);
        assert_eq!(bullets[0].text, "Built APIs");
        assert_eq!(bullets[0].source_ids, vec!["a.pdf", "b.docx"]);
        assert_eq!(bullets[2].source_ids, vec!["b.docx"]);
    }

    #[test]
    fn test_roles_with_different_periods_stay_separate() {
        let mut later = make_role("Acme", "Dev", &["Shipped v2"]);
        later.start = Some("2022".to_string());
        let merged = merge_profiles(
            vec![make_piece("a", vec![make_role("Acme", "Dev", &["Shipped v1"]), later])],
            &MergeOptions::default(),
        );
        assert_eq!(merged.work_experience.len(), 2);
    }

    #[test]
    fn test_prefer_moves_matching_content_first() {
        let merged = merge_profiles(
            vec![
                make_piece("old_resume.pdf", vec![make_role("Initech", "Analyst", &["Wrote TPS reports"])]),
                make_piece("tailored_resume.docx", vec![make_role("Acme", "Dev", &["Built APIs"])]),
            ],
            &MergeOptions {
                prefer: Some("TAILORED".to_string()),
                ..MergeOptions::default()
            },
        );
        assert_eq!(merged.work_experience[0].company, "Acme");
        assert_eq!(merged.work_experience[1].company, "Initech");
    }

    #[test]
    fn test_skills_and_education_dedup() {
        let mut first = make_piece("a", vec![]);
        first.profile.skills_hard = vec!["Python".to_string(), "SQL".to_string()];
        first.profile.education = vec![Education {
            institution: "MIT".to_string(),
            degree: Some("BS".to_string()),
            start: None,
            end: Some("2014".to_string()),
        }];
        let mut second = make_piece("b", vec![]);
        second.profile.skills_hard = vec![" python".to_string(), "Rust".to_string()];
        second.profile.education = vec![Education {
            institution: "mit".to_string(),
            degree: Some("bs".to_string()),
            start: None,
            end: Some("2014".to_string()),
        }];

        let merged = merge_profiles(vec![first, second], &MergeOptions::default());
        assert_eq!(merged.skills.hard, vec!["Python", "SQL", "Rust"]);
        assert_eq!(merged.education.len(), 1);
        assert_eq!(merged.artifacts.len(), 2);
    }

    #[test]
    fn test_identity_first_non_blank_then_overrides() {
        let mut first = make_piece("linkedin_profile", vec![]);
        first.kind = SourceKind::Linkedin;
        let mut second = make_piece("profile.json", vec![]);
        second.profile.identity = Some(Identity {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            ..Identity::default()
        });

        let merged = merge_profiles(
            vec![first, second],
            &MergeOptions {
                prefer: None,
                identity: IdentityOverrides {
                    phone: Some("555-0100".to_string()),
                    links: Some(vec![" https://ada.dev ".to_string(), "".to_string()]),
                    ..IdentityOverrides::default()
                },
            },
        );
        assert_eq!(merged.identity.name, "Ada");
        assert_eq!(merged.identity.phone.as_deref(), Some("555-0100"));
        assert_eq!(merged.identity.links, vec!["https://ada.dev"]);
        assert_eq!(merged.artifacts[0].kind, "linkedin");
    }

    #[test]
    fn test_dedup_case_insensitive_keeps_first_spelling() {
        let items = vec!["AWS".to_string(), "aws".to_string(), " ".to_string(), "Go".to_string()];
        assert_eq!(dedup_case_insensitive(&items), vec!["AWS", "Go"]);
    }
}
