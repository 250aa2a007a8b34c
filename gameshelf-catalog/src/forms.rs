//! Raw form input and the schema validation shared by every write path.
//!
//! Each form holds exactly what the user typed so a rejected submission can
//! be echoed back unchanged. `validate()` performs the checks that need no
//! database (required fields, date and number syntax, matching passwords) and
//! yields the typed command from [`crate::types`]. Checks against stored data
//! (duplicates, unknown references) happen in the service layer.
//!
//! The field rules [`parse_date`] and [`parse_number`] are public so bulk
//! imports hold stored values to the same syntax as typed input.

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{GameUpdate, NewCompany, NewGame, NewUser};

/// Date format accepted in forms and stored in the database.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single user-facing problem with a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be a date in YYYY-MM-DD form, got '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("{field} '{name}' does not exist")]
    UnknownReference { field: &'static str, name: String },

    #[error("{field} '{name}' already exists")]
    AlreadyExists { field: &'static str, name: String },

    #[error("game already has {field} '{name}'")]
    AlreadyAttached { field: &'static str, name: String },

    #[error("username and password do not match")]
    InvalidCredentials,
}

impl FieldError {
    /// The form field the error belongs to, if it is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Empty { field }
            | Self::InvalidDate { field, .. }
            | Self::InvalidNumber { field, .. }
            | Self::Negative { field }
            | Self::UnknownReference { field, .. }
            | Self::AlreadyExists { field, .. }
            | Self::AlreadyAttached { field, .. } => Some(field),
            Self::PasswordMismatch => Some("password_confirm"),
            Self::InvalidCredentials => None,
        }
    }
}

// ── Forms ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<NewUser, FieldError> {
        let name = required("username", &self.username)?;
        if self.password.is_empty() {
            return Err(FieldError::Empty { field: "password" });
        }
        if self.password != self.password_confirm {
            return Err(FieldError::PasswordMismatch);
        }
        Ok(NewUser {
            name,
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// A username and password ready to be checked against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, FieldError> {
        let username = required("username", &self.username)?;
        if self.password.is_empty() {
            return Err(FieldError::Empty { field: "password" });
        }
        Ok(Credentials {
            username,
            password: self.password.clone(),
        })
    }
}

/// Everything needed to add a game, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameForm {
    pub title: String,
    pub release_date: String,
    pub price: String,
    pub content: String,
    pub developer: String,
    pub average_playtime: String,
    pub median_playtime: String,
    pub rating: String,
    pub publisher: String,
    pub platform: String,
}

impl GameForm {
    pub fn validate(&self) -> Result<NewGame, FieldError> {
        let title = required("title", &self.title)?;
        let details = validate_details(
            &self.release_date,
            &self.price,
            &self.content,
            &self.average_playtime,
            &self.median_playtime,
            &self.rating,
        )?;
        let developer = required("developer", &self.developer)?;
        let publisher = required("publisher", &self.publisher)?;
        let platform = required("platform", &self.platform)?;

        Ok(NewGame {
            title,
            release_date: details.release_date,
            price: details.price,
            content: details.content,
            developer: Some(developer),
            average_playtime: details.average_playtime,
            median_playtime: details.median_playtime,
            rating: details.rating,
            publishers: vec![publisher],
            platforms: vec![platform],
        })
    }
}

/// The editable subset of a game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameEditForm {
    pub release_date: String,
    pub price: String,
    pub content: String,
    pub average_playtime: String,
    pub median_playtime: String,
    pub rating: String,
}

impl GameEditForm {
    pub fn validate(&self) -> Result<GameUpdate, FieldError> {
        validate_details(
            &self.release_date,
            &self.price,
            &self.content,
            &self.average_playtime,
            &self.median_playtime,
            &self.rating,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyForm {
    pub name: String,
    pub country: String,
    pub founded: String,
    pub description: String,
}

impl CompanyForm {
    pub fn validate(&self) -> Result<NewCompany, FieldError> {
        let name = required("name", &self.name)?;
        let founded = parse_date("founded", &self.founded)?;
        Ok(NewCompany {
            name,
            country: optional_text(&self.country),
            founded: Some(founded),
            description: optional_text(&self.description),
        })
    }
}

/// A single name typed to attach a platform or publisher to a game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachForm {
    pub name: String,
}

impl AttachForm {
    /// `field` names the relation ("platform" or "publisher") for messages.
    pub fn validate(&self, field: &'static str) -> Result<String, FieldError> {
        required(field, &self.name)
    }
}

// ── Field rules ─────────────────────────────────────────────────────────────

fn validate_details(
    release_date: &str,
    price: &str,
    content: &str,
    average_playtime: &str,
    median_playtime: &str,
    rating: &str,
) -> Result<GameUpdate, FieldError> {
    Ok(GameUpdate {
        release_date: parse_date("release_date", release_date)?,
        price: parse_number("price", price)?,
        content: optional_text(content),
        average_playtime: parse_number("average_playtime", average_playtime)?,
        median_playtime: parse_number("median_playtime", median_playtime)?,
        rating: parse_number("rating", rating)?,
    })
}

fn required(field: &'static str, value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty { field });
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse a required date and return it in canonical `YYYY-MM-DD` form.
pub fn parse_date(field: &'static str, value: &str) -> Result<String, FieldError> {
    let trimmed = required(field, value)?;
    NaiveDate::parse_from_str(&trimmed, DATE_FORMAT)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .map_err(|_| FieldError::InvalidDate {
            field,
            value: trimmed,
        })
}

/// Parse an optional non-negative number. Blank input is `None`.
pub fn parse_number(field: &'static str, value: &str) -> Result<Option<f64>, FieldError> {
    let Some(trimmed) = optional_text(value) else {
        return Ok(None);
    };
    let n: f64 = trimmed.parse().map_err(|_| FieldError::InvalidNumber {
        field,
        value: trimmed.clone(),
    })?;
    check_number(field, n).map(Some)
}

/// Accept `n` if it is finite and not negative.
pub fn check_number(field: &'static str, n: f64) -> Result<f64, FieldError> {
    if !n.is_finite() {
        return Err(FieldError::InvalidNumber {
            field,
            value: n.to_string(),
        });
    }
    if n < 0.0 {
        return Err(FieldError::Negative { field });
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_is_normalized() {
        assert_eq!(parse_date("d", " 2020-1-5 ").unwrap(), "2020-01-05");
    }

    #[test]
    fn date_rejects_other_formats() {
        assert!(matches!(
            parse_date("d", "05.01.2020"),
            Err(FieldError::InvalidDate { field: "d", .. })
        ));
        assert_eq!(parse_date("d", "  "), Err(FieldError::Empty { field: "d" }));
    }

    #[test]
    fn check_number_rejects_infinite_and_negative() {
        assert_eq!(check_number("n", 0.0), Ok(0.0));
        assert!(matches!(
            check_number("n", f64::INFINITY),
            Err(FieldError::InvalidNumber { field: "n", .. })
        ));
        assert_eq!(check_number("n", -0.5), Err(FieldError::Negative { field: "n" }));
    }

    #[test]
    fn number_rules() {
        assert_eq!(parse_number("n", ""), Ok(None));
        assert_eq!(parse_number("n", "19.99"), Ok(Some(19.99)));
        assert_eq!(
            parse_number("n", "-1"),
            Err(FieldError::Negative { field: "n" })
        );
        assert!(matches!(
            parse_number("n", "NaN"),
            Err(FieldError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_number("n", "cheap"),
            Err(FieldError::InvalidNumber { .. })
        ));
    }
}
