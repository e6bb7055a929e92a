pub mod handlers;
pub mod retrieval;
pub mod scorer;
pub mod selector;
pub mod similarity;
pub mod text;
