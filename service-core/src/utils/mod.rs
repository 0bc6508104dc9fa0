pub mod secret;
pub mod validation;

pub use secret::secrets_match;
pub use validation::{AppJson, ValidatedJson};
