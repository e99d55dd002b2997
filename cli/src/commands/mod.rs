pub mod issue;
pub mod util;
