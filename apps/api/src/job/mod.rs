// Target job: posting model and keyword extraction.

pub mod handlers;
pub mod keywords;
pub mod models;
