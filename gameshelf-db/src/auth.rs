//! Credential checks for existing accounts.

use gameshelf_catalog::password::verify_password;
use gameshelf_catalog::types::User;
use rusqlite::{Connection, params};
use thiserror::Error;

use crate::operations::OperationError;

/// Salt/hash pair checked when the user does not exist, so a miss costs the
/// same work as a wrong password.
const DECOY_SALT: &str = "00000000000000000000000000000000";
const DECOY_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown user or wrong password; deliberately not distinguished.
    #[error("username and password do not match")]
    InvalidCredentials,
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
}

impl From<rusqlite::Error> for LoginError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Db(e.into())
    }
}

/// Check `password` for the account `name`.
pub fn login(conn: &Connection, name: &str, password: &str) -> Result<User, LoginError> {
    let mut stmt = conn.prepare("SELECT id, password_hash, salt FROM users WHERE name = ?1")?;
    let result = stmt.query_row(params![name], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    });
    let stored = match result {
        Ok(stored) => Some(stored),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(e.into()),
    };

    match stored {
        Some((id, hash, salt)) if verify_password(password, &hash, &salt) => Ok(User {
            id,
            name: name.to_string(),
        }),
        Some(_) => Err(LoginError::InvalidCredentials),
        None => {
            verify_password(password, DECOY_HASH, DECOY_SALT);
            Err(LoginError::InvalidCredentials)
        }
    }
}
