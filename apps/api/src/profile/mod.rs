// Candidate profile: data model, per-format sources, and the merge that
// normalises them into one Candidate.

pub mod handlers;
pub mod merge;
pub mod models;
pub mod sources;
