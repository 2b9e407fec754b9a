pub mod format;
pub mod parser;
pub mod progress;
