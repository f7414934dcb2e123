use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::validation::{
    format_timestamp, parse_date_creation, parse_date_edition, validate_cpf, validate_email,
    validate_id, validate_name, UserValidationError,
};
use crate::ids::IdGenerator;

/// User record built through validated setters.
///
/// A setter either commits a value that passed its rule or leaves the field
/// untouched and reports the rule that failed, so a `User` never holds a
/// malformed value. Fields start empty; [`User::is_complete`] tells whether
/// construction finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    cpf: Option<String>,
    date_creation: Option<NaiveDateTime>,
    date_edition: Option<NaiveDateTime>,
}

impl User {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_id(&mut self, id: &str) -> Result<&mut Self, UserValidationError> {
        self.id = Some(validate_id(id)?);
        Ok(self)
    }

    pub fn set_name(&mut self, name: &str) -> Result<&mut Self, UserValidationError> {
        self.name = Some(validate_name(name)?);
        Ok(self)
    }

    pub fn set_email(&mut self, email: &str) -> Result<&mut Self, UserValidationError> {
        self.email = Some(validate_email(email)?);
        Ok(self)
    }

    pub fn set_cpf(&mut self, cpf: &str) -> Result<&mut Self, UserValidationError> {
        self.cpf = Some(validate_cpf(cpf)?);
        Ok(self)
    }

    pub fn set_date_creation(&mut self, value: &str) -> Result<&mut Self, UserValidationError> {
        self.date_creation = Some(parse_date_creation(value)?);
        Ok(self)
    }

    pub fn set_date_edition(&mut self, value: &str) -> Result<&mut Self, UserValidationError> {
        self.date_edition = Some(parse_date_edition(value)?);
        Ok(self)
    }

    /// Assign a fresh identifier; the generated value goes through the id rule too.
    pub fn generate_id(
        &mut self,
        generator: &dyn IdGenerator,
    ) -> Result<&mut Self, UserValidationError> {
        self.set_id(&generator.generate())
    }

    pub fn stamp_creation(&mut self, now: NaiveDateTime) -> &mut Self {
        self.date_creation = Some(truncate_to_seconds(now));
        self
    }

    pub fn stamp_edition(&mut self, now: NaiveDateTime) -> &mut Self {
        self.date_edition = Some(truncate_to_seconds(now));
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn cpf(&self) -> Option<&str> {
        self.cpf.as_deref()
    }

    pub fn date_creation(&self) -> Option<NaiveDateTime> {
        self.date_creation
    }

    pub fn date_edition(&self) -> Option<NaiveDateTime> {
        self.date_edition
    }

    /// First field a persisted user must carry but this one lacks.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.id.is_none() {
            Some("id")
        } else if self.name.is_none() {
            Some("name")
        } else if self.email.is_none() {
            Some("email")
        } else if self.cpf.is_none() {
            Some("cpf")
        } else if self.date_creation.is_none() {
            Some("dateCreation")
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            cpf: self.cpf.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            date_creation: self
                .date_creation
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
            date_edition: self.date_edition.as_ref().map(format_timestamp),
        }
    }

    /// Apply already validated changes without re-running the setters.
    pub(crate) fn apply_changes(&mut self, changes: &UserChanges) {
        if let Some(name) = &changes.name {
            self.name = Some(name.clone());
        }
        if let Some(email) = &changes.email {
            self.email = Some(email.clone());
        }
        if let Some(cpf) = &changes.cpf {
            self.cpf = Some(cpf.clone());
        }
        self.date_edition = Some(changes.edited_at);
    }
}

fn truncate_to_seconds(value: NaiveDateTime) -> NaiveDateTime {
    value.with_nanosecond(0).unwrap_or(value)
}

/// Partial update request; absent fields stay as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.cpf.is_none()
    }

    /// Run every supplied field through the creation rules against a copy of `user`.
    pub(crate) fn validate_against(
        &self,
        user: &User,
        edited_at: NaiveDateTime,
    ) -> Result<(User, UserChanges), UserValidationError> {
        if self.is_empty() {
            return Err(UserValidationError::NothingToUpdate);
        }

        let mut patched = user.clone();
        if let Some(name) = &self.name {
            patched.set_name(name)?;
        }
        if let Some(email) = &self.email {
            patched.set_email(email)?;
        }
        if let Some(cpf) = &self.cpf {
            patched.set_cpf(cpf)?;
        }
        patched.stamp_edition(edited_at);

        let changes = UserChanges {
            name: self.name.as_ref().and(patched.name.clone()),
            email: self.email.as_ref().and(patched.email.clone()),
            cpf: self.cpf.as_ref().and(patched.cpf.clone()),
            edited_at: patched.date_edition.unwrap_or(edited_at),
        };
        Ok((patched, changes))
    }
}

/// Validated field changes handed to the store on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub cpf: Option<String>,
    pub edited_at: NaiveDateTime,
}

/// Outward representation of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub date_creation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_edition: Option<String>,
}
