mod organization;
mod user;

pub use organization::*;
pub use user::*;
