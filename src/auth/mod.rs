mod identity;
mod token;

pub use identity::{Principal, principal_from_headers};
pub use token::{AccessToken, TokenError, TokenSource};
