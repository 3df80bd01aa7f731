//! Authentication credentials

mod credentials;

pub use credentials::{Credentials, Token};
