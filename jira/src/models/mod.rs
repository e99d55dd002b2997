pub mod core;
pub mod issue;
pub mod tempo;
pub mod user;
