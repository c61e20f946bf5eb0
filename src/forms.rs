//! Create/edit forms validated before anything is sent.

use std::{collections::BTreeMap, fmt};

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{
    ItemCreate, ItemUpdate, SensorDataCreate, UpdatePassword, UserCreate, UserRegister,
    UserUpdate, UserUpdateMe,
};

pub const MIN_PASSWORD_LEN: usize = 8;

// ---------------------------------------------------------------------------
// FieldErrors
// ---------------------------------------------------------------------------

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self
            .0
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

// ---------------------------------------------------------------------------
// Sensor data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SensorDataForm {
    pub equipment_id: String,
    pub value: f64,
    /// Defaults to the submission time.
    pub timestamp: Option<NaiveDateTime>,
}

impl SensorDataForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.equipment_id.trim().is_empty() {
            errors.add("equipment_id", "Equipment Id is required.");
        }
        if !self.value.is_finite() {
            errors.add("value", "Value must be a number.");
        }
        errors.into_result()
    }

    /// Validated body for create and update; `now` fills a missing timestamp.
    pub fn into_body(self, now: NaiveDateTime) -> Result<SensorDataCreate, FieldErrors> {
        self.validate()?;
        Ok(SensorDataCreate {
            equipment_id: self.equipment_id.trim().to_owned(),
            value: self.value,
            timestamp: self.timestamp.unwrap_or(now),
        })
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemForm {
    pub title: String,
    pub description: Option<String>,
}

impl ItemForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.title.trim().is_empty() {
            errors.add("title", "Title is required.");
        }
        errors.into_result()
    }

    pub fn into_create(self) -> Result<ItemCreate, FieldErrors> {
        self.validate()?;
        Ok(ItemCreate {
            title: self.title,
            description: self.description.filter(|d| !d.is_empty()),
        })
    }

    pub fn into_update(self) -> Result<ItemUpdate, FieldErrors> {
        self.validate()?;
        Ok(ItemUpdate {
            title: Some(self.title),
            description: self.description,
        })
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub email: String,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl UserForm {
    fn check(&self, password_required: bool) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(self.email.trim()) {
            errors.add("email", "Invalid email address");
        }
        match self.password.as_deref() {
            None | Some("") if password_required => {
                errors.add("password", "Password is required");
            }
            None | Some("") => {}
            Some(password) => {
                check_password(&mut errors, "password", password);
                if self.confirm_password.as_deref() != Some(password) {
                    errors.add("confirm_password", "The passwords do not match");
                }
            }
        }
        errors
    }

    pub fn into_create(self) -> Result<UserCreate, FieldErrors> {
        self.check(true).into_result()?;
        Ok(UserCreate {
            email: self.email.trim().to_owned(),
            password: self.password.unwrap_or_default(),
            full_name: self.full_name.filter(|n| !n.is_empty()),
            is_active: self.is_active,
            is_superuser: self.is_superuser,
        })
    }

    pub fn into_register(self) -> Result<UserRegister, FieldErrors> {
        self.check(true).into_result()?;
        Ok(UserRegister {
            email: self.email.trim().to_owned(),
            password: self.password.unwrap_or_default(),
            full_name: self.full_name.filter(|n| !n.is_empty()),
        })
    }

    /// Admin edit: the password is only sent when one was typed.
    pub fn into_update(self) -> Result<UserUpdate, FieldErrors> {
        self.check(false).into_result()?;
        Ok(UserUpdate {
            email: Some(self.email.trim().to_owned()),
            password: self.password.filter(|p| !p.is_empty()),
            full_name: self.full_name,
            is_active: Some(self.is_active),
            is_superuser: Some(self.is_superuser),
        })
    }
}

/// Self-service profile edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl ProfileForm {
    pub fn into_update(self) -> Result<UserUpdateMe, FieldErrors> {
        let mut errors = FieldErrors::default();
        if let Some(email) = self.email.as_deref() {
            if !is_valid_email(email.trim()) {
                errors.add("email", "Invalid email address");
            }
        }
        errors.into_result()?;
        Ok(UserUpdateMe {
            full_name: self.full_name,
            email: self.email.map(|e| e.trim().to_owned()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordForm {
    pub fn into_update(self) -> Result<UpdatePassword, FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.current_password.is_empty() {
            errors.add("current_password", "Password is required");
        }
        check_password(&mut errors, "new_password", &self.new_password);
        if self.confirm_password != self.new_password {
            errors.add("confirm_password", "The passwords do not match");
        }
        errors.into_result()?;
        Ok(UpdatePassword {
            current_password: self.current_password,
            new_password: self.new_password,
        })
    }
}

fn check_password(errors: &mut FieldErrors, field: &'static str, password: &str) {
    if password.is_empty() {
        errors.add(field, "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(field, "Password must be at least 8 characters");
    }
}

/// Parse a date-time as typed on the command line: ISO-8601 with `T` or a
/// space, with or without seconds, or a bare date meaning midnight.
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("invalid date-time {raw:?}, expected YYYY-MM-DDTHH:MM[:SS]"))
}

/// `local@domain.tld`: local part of `[A-Za-z0-9._%+-]`, a dotted domain of
/// `[A-Za-z0-9.-]` and a final label of at least two letters.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());
    local_ok && host_ok && tld_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-06-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn sensor_form_requires_equipment_id() {
        let form = SensorDataForm {
            equipment_id: "  ".into(),
            value: 1.0,
            timestamp: None,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("equipment_id"), Some("Equipment Id is required."));
    }

    #[test]
    fn sensor_form_rejects_nan() {
        let form = SensorDataForm {
            equipment_id: "EQ-1".into(),
            value: f64::NAN,
            timestamp: None,
        };
        assert!(form.validate().unwrap_err().get("value").is_some());
    }

    #[test]
    fn sensor_form_defaults_timestamp_to_now() {
        let body = SensorDataForm {
            equipment_id: " EQ-1 ".into(),
            value: 21.5,
            timestamp: None,
        }
        .into_body(now())
        .unwrap();
        assert_eq!(body.equipment_id, "EQ-1");
        assert_eq!(body.timestamp, now());
    }

    #[test]
    fn item_form_requires_title() {
        let errors = ItemForm::default().into_create().unwrap_err();
        assert_eq!(errors.get("title"), Some("Title is required."));
    }

    #[test]
    fn user_create_checks_email_password_and_confirmation() {
        let errors = UserForm {
            email: "not-an-email".into(),
            password: Some("short".into()),
            confirm_password: Some("other".into()),
            ..Default::default()
        }
        .into_create()
        .unwrap_err();

        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(errors.get("password"), Some("Password must be at least 8 characters"));
        assert_eq!(errors.get("confirm_password"), Some("The passwords do not match"));
    }

    #[test]
    fn user_create_requires_password() {
        let errors = UserForm {
            email: "user@example.com".into(),
            ..Default::default()
        }
        .into_create()
        .unwrap_err();
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn user_update_omits_blank_password() {
        let update = UserForm {
            email: "user@example.com".into(),
            password: Some(String::new()),
            is_active: true,
            ..Default::default()
        }
        .into_update()
        .unwrap();
        assert!(update.password.is_none());
        assert_eq!(update.is_active, Some(true));
    }

    #[test]
    fn change_password_requires_matching_confirmation() {
        let errors = ChangePasswordForm {
            current_password: "oldpassword".into(),
            new_password: "newpassword".into(),
            confirm_password: "newpasswore".into(),
        }
        .into_update()
        .unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("The passwords do not match"));
    }

    #[test]
    fn datetime_formats() {
        let expected = now();
        assert_eq!(parse_datetime("2024-06-01T12:00:00"), Ok(expected));
        assert_eq!(parse_datetime("2024-06-01 12:00"), Ok(expected));
        assert_eq!(parse_datetime("2024-06-01T12:00"), Ok(expected));
        assert_eq!(
            parse_datetime("2024-06-01"),
            Ok(NaiveDateTime::parse_from_str("2024-06-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap())
        );
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("missing-at.example.org"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@example.c"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("us er@example.com"));
    }
}
