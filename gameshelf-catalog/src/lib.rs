//! Game catalog data model, form validation, and password hashing.
//!
//! This crate defines the entities of the catalog (users, companies, games,
//! platforms) and the typed commands that create or change them, without any
//! database dependencies. Raw form input is turned into those commands by the
//! validators in [`forms`]; `gameshelf-db` persists them.

pub mod forms;
pub mod password;
pub mod types;

pub use forms::{
    AttachForm, CompanyForm, Credentials, FieldError, GameEditForm, GameForm, LoginForm,
    SignupForm, check_number, parse_date, parse_number,
};
pub use password::{PasswordHash, hash_password, hash_password_with_salt, verify_password};
pub use types::*;
