//! Screen implementations for the console

pub mod login;
pub mod verify;

pub use login::LoginScreen;
pub use verify::{VerifyFocus, VerifyScreen};
