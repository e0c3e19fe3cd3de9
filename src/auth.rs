//! Auth-domain secret wrappers and the cached bearer-token model.

pub mod secret;
pub mod token;

pub use secret::*;
pub use token::*;
