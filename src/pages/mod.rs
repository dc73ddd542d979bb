pub mod login;

pub use login::{LoginError, LoginField, LoginPage, LoginState};
