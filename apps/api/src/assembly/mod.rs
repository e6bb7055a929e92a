pub mod evaluation;
pub mod letter;
pub mod resume;
