pub mod environment;
pub mod pipeline;
pub mod profile;
pub mod prompt;
