pub mod authenticator;
pub mod bearer;
pub mod key_store;

pub use authenticator::{AuthRejection, Authenticator};
