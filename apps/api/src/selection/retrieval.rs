//! Chunk retrieval over a candidate profile.
//!
//! Every bullet and every hard skill becomes one chunk. The index is fitted on
//! the chunks alone and searched with the job text, so the letter writer can
//! see profile material the selector did not pick. Lives in memory for one run.

use serde::Serialize;

use crate::profile::models::Candidate;
use crate::selection::similarity::{TfIdfBuilder, TfIdfModel};

/// Hits returned to the tailoring pipeline.
pub const DEFAULT_RETRIEVAL_TOP_K: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChunkOrigin {
    Bullet {
        role_index: usize,
        company: String,
        role: String,
        source_ids: Vec<String>,
    },
    Skill,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub text: String,
    pub origin: ChunkOrigin,
}

/// Bullets in role order, then hard skills. Blank texts are skipped.
pub fn chunks_from_candidate(candidate: &Candidate) -> Vec<Chunk> {
    let bullets = candidate
        .work_experience
        .iter()
        .enumerate()
        .flat_map(|(role_index, exp)| {
            exp.bullets.iter().map(move |bullet| Chunk {
                text: bullet.text.clone(),
                origin: ChunkOrigin::Bullet {
                    role_index,
                    company: exp.company.clone(),
                    role: exp.role.clone(),
                    source_ids: bullet.source_ids.clone(),
                },
            })
        });
    let skills = candidate.skills.hard.iter().map(|skill| Chunk {
        text: skill.clone(),
        origin: ChunkOrigin::Skill,
    });

    bullets
        .chain(skills)
        .filter(|chunk| !chunk.text.trim().is_empty())
        .collect()
}

pub struct ChunkIndex {
    chunks: Vec<Chunk>,
    model: Option<TfIdfModel>,
}

impl ChunkIndex {
    pub fn build(chunks: Vec<Chunk>) -> Self {
        let mut builder = TfIdfBuilder::new();
        for chunk in &chunks {
            builder.add(&chunk.text);
        }
        Self {
            model: builder.build(),
            chunks,
        }
    }

    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self::build(chunks_from_candidate(candidate))
    }

    /// Up to `top_k` chunks by cosine similarity to `query`, best first.
    /// Chunks sharing no term with the query are never returned; ties keep
    /// chunk order.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<&Chunk> {
        let Some(model) = &self.model else {
            return Vec::new();
        };
        let query = model.transform(query);

        let mut hits: Vec<(usize, f64)> = (0..self.chunks.len())
            .map(|i| (i, model.similarity_to(i, &query)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1));

        hits.into_iter()
            .take(top_k)
            .map(|(i, _)| &self.chunks[i])
            .collect()
    }
}
