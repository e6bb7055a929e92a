//! Resume context: the render-ready structure built from one selection.
//!
//! Renderers and the refinement step share this value. The only mutation it
//! allows on a selected bullet is replacing its text: provenance and score are
//! fixed at assembly and have no setters.

use serde::Serialize;

use crate::job::models::JobPosting;
use crate::profile::merge::dedup_case_insensitive;
use crate::profile::models::{Candidate, Education, Identity, USER_ADDED_SOURCE};
use crate::selection::selector::SelectionResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeBullet {
    text: String,
    source_ids: Vec<String>,
    score: f64,
}

impl ResumeBullet {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_user_added(&self) -> bool {
        self.source_ids.iter().any(|id| id == USER_ADDED_SOURCE)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// One role as it appears on the resume. Roles with no selected bullets are
/// kept so the work history has no gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceBlock {
    pub company: String,
    pub role: String,
    pub start: Option<String>,
    pub end: Option<String>,
    bullets: Vec<ResumeBullet>,
}

impl ExperienceBlock {
    pub fn bullets(&self) -> &[ResumeBullet] {
        &self.bullets
    }
}

/// Audit record of a selected bullet, taken when the context is assembled.
/// Later rewrites do not touch it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub text: String,
    pub source_ids: Vec<String>,
    pub role_index: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeContext {
    pub identity: Identity,
    experiences: Vec<ExperienceBlock>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub trace: Vec<TraceEntry>,
    pub job: JobSummary,
}

impl ResumeContext {
    pub fn experiences(&self) -> &[ExperienceBlock] {
        &self.experiences
    }

    /// Replaces the text of one bullet. Returns `false` when the position does
    /// not exist.
    pub fn rewrite_bullet(&mut self, role_index: usize, position: usize, text: impl Into<String>) -> bool {
        match self
            .experiences
            .get_mut(role_index)
            .and_then(|block| block.bullets.get_mut(position))
        {
            Some(bullet) => {
                bullet.set_text(text);
                true
            }
            None => false,
        }
    }

    /// Appends a manually written bullet, tagged as user-added with score 0.
    /// Returns `false` for an unknown role or blank text.
    pub fn add_user_bullet(&mut self, role_index: usize, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let Some(block) = self.experiences.get_mut(role_index) else {
            return false;
        };
        block.bullets.push(ResumeBullet {
            text: text.to_string(),
            source_ids: vec![USER_ADDED_SOURCE.to_string()],
            score: 0.0,
        });
        true
    }

    /// Current bullet texts, one list per role in role order.
    pub fn bullet_texts_by_role(&self) -> Vec<Vec<String>> {
        self.experiences
            .iter()
            .map(|block| block.bullets().iter().map(|b| b.text().to_string()).collect())
            .collect()
    }

    /// Current bullet texts flattened in role order, then rank order.
    pub fn bullet_texts(&self) -> impl Iterator<Item = &str> {
        self.experiences
            .iter()
            .flat_map(|block| block.bullets().iter().map(ResumeBullet::text))
    }

    pub fn total_bullets(&self) -> usize {
        self.experiences.iter().map(|block| block.bullets.len()).sum()
    }
}

/// Builds the resume context. Pure: identical inputs give identical output.
pub fn build_resume_context(
    candidate: &Candidate,
    job: &JobPosting,
    selection: &SelectionResult,
) -> ResumeContext {
    let experiences = candidate
        .work_experience
        .iter()
        .enumerate()
        .map(|(role_index, exp)| ExperienceBlock {
            company: exp.company.clone(),
            role: exp.role.clone(),
            start: exp.start.clone(),
            end: exp.end.clone(),
            bullets: selection
                .for_role(role_index)
                .iter()
                .map(|sb| ResumeBullet {
                    text: sb.text.clone(),
                    source_ids: sb.source_ids.clone(),
                    score: sb.score,
                })
                .collect(),
        })
        .collect();

    let combined: Vec<String> = candidate
        .skills
        .hard
        .iter()
        .chain(&candidate.skills.soft)
        .cloned()
        .collect();

    let trace = selection
        .iter()
        .map(|sb| TraceEntry {
            text: sb.text.clone(),
            source_ids: sb.source_ids.clone(),
            role_index: sb.role_index,
            score: sb.score,
        })
        .collect();

    ResumeContext {
        identity: candidate.identity.clone(),
        experiences,
        education: candidate.education.clone(),
        skills: dedup_case_insensitive(&combined),
        trace,
        job: JobSummary {
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            keywords: job.keywords.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::models::JobOverrides;
    use crate::profile::models::{Bullet, Experience, Skills};
    use crate::selection::scorer::RelevanceScorer;
    use crate::selection::selector::{select_bullets, SelectionOptions};

    fn make_candidate() -> Candidate {
        Candidate {
            identity: Identity {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                ..Identity::default()
            },
            work_experience: vec![
                Experience {
                    company: "Engines Ltd".into(),
                    role: "Engineer".into(),
                    start: Some("2021".into()),
                    bullets: vec![
                        Bullet::new("Led migration to AWS, reducing cost 20%", vec!["resume.pdf".into()]),
                        Bullet::new("Organised the office party", vec!["resume.pdf".into()]),
                    ],
                    ..Experience::default()
                },
                Experience {
                    company: "Looms Inc".into(),
                    role: "Analyst".into(),
                    bullets: vec![Bullet::new("Filed reports", vec!["linkedin".into()])],
                    ..Experience::default()
                },
            ],
            skills: Skills {
                hard: vec!["Python".into(), "AWS".into()],
                soft: vec!["python".into(), "Mentoring".into()],
            },
            ..Candidate::default()
        }
    }

    fn make_job() -> JobPosting {
        JobPosting::new(
            "Cloud engineer for AWS migration and cost work",
            JobOverrides {
                title: Some("Cloud Engineer".into()),
                ..JobOverrides::default()
            },
            vec!["aws".into(), "cost".into(), "migration".into()],
        )
    }

    fn assemble() -> (Candidate, JobPosting, SelectionResult, ResumeContext) {
        let candidate = make_candidate();
        let job = make_job();
        let selection = select_bullets(
            &candidate,
            &job.keywords,
            job.text_for_scoring(),
            &RelevanceScorer::default(),
            SelectionOptions::default(),
        );
        let resume = build_resume_context(&candidate, &job, &selection);
        (candidate, job, selection, resume)
    }

    #[test]
    fn test_every_role_appears_even_without_bullets() {
        let (_, _, _, resume) = assemble();
        assert_eq!(resume.experiences().len(), 2);
        assert_eq!(resume.experiences()[0].bullets().len(), 1);
        assert!(resume.experiences()[1].bullets().is_empty());
        assert_eq!(resume.experiences()[1].company, "Looms Inc");
    }

    #[test]
    fn test_skills_deduplicated_case_insensitively() {
        let (_, _, _, resume) = assemble();
        assert_eq!(resume.skills, vec!["Python", "AWS", "Mentoring"]);
    }

    #[test]
    fn test_trace_and_job_summary() {
        let (_, _, selection, resume) = assemble();
        assert_eq!(resume.trace.len(), selection.total_selected());
        assert_eq!(resume.trace[0].source_ids, vec!["resume.pdf"]);
        assert_eq!(resume.trace[0].role_index, 0);
        assert_eq!(resume.job.title.as_deref(), Some("Cloud Engineer"));
        assert_eq!(resume.job.keywords, vec!["aws", "cost", "migration"]);
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let (candidate, job, selection, first) = assemble();
        let second = build_resume_context(&candidate, &job, &selection);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_rewrite_changes_only_text() {
        let (_, _, _, mut resume) = assemble();
        let mut expected = resume.experiences()[0].bullets()[0].clone();
        expected.set_text("Moved services to AWS, cutting cost 20%");

        assert!(resume.rewrite_bullet(0, 0, "Moved services to AWS, cutting cost 20%"));
        assert_eq!(resume.experiences()[0].bullets()[0], expected);
        // the trace is a snapshot
        assert_eq!(resume.trace[0].text, "Led migration to AWS, reducing cost 20%");
    }

    #[test]
    fn test_rewrite_out_of_range_is_rejected() {
        let (_, _, _, mut resume) = assemble();
        assert!(!resume.rewrite_bullet(1, 0, "nothing here"));
        assert!(!resume.rewrite_bullet(7, 0, "no such role"));
    }

    #[test]
    fn test_user_bullet_is_tagged() {
        let (_, _, _, mut resume) = assemble();
        assert!(resume.add_user_bullet(1, "  Automated weekly reporting  "));
        assert!(!resume.add_user_bullet(1, "   "));
        assert!(!resume.add_user_bullet(5, "Unknown role"));

        let added = &resume.experiences()[1].bullets()[0];
        assert_eq!(added.text(), "Automated weekly reporting");
        assert!(added.is_user_added());
        let value = serde_json::to_value(added).unwrap();
        assert_eq!(value["source_ids"], serde_json::json!([USER_ADDED_SOURCE]));
        assert_eq!(value["score"], 0.0);
        assert!(!resume.experiences()[0].bullets()[0].is_user_added());
    }

    #[test]
    fn test_selection_snapshot_survives_resume_edits() {
        let (_, _, selection, mut resume) = assemble();
        resume.rewrite_bullet(0, 0, "Edited");
        assert_eq!(selection.for_role(0)[0].text, "Led migration to AWS, reducing cost 20%");
        assert_eq!(resume.bullet_texts_by_role(), vec![vec!["Edited".to_string()], vec![]]);
    }
}
