//! Sign-in and registration forms.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::validation::{Field, FieldErrors, is_blank, is_email};

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum age to register.
pub const MIN_MEMBER_AGE: i16 = 18;

/// Sign-in form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    /// E-mail address.
    pub email: String,

    /// Password.
    pub password: String,
}

impl LoginForm {
    /// Check the form before it's sent to the auth service.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        validate_email(&self.email, &mut errors);
        validate_password(&self.password, &mut errors);

        errors
    }
}

/// Membership registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Full name.
    pub name: String,

    /// E-mail address.
    pub email: String,

    /// Password.
    pub password: String,

    /// Password typed a second time.
    pub confirm_password: String,

    /// Date of birth, `YYYY-MM-DD`.
    pub birthdate: String,

    /// Whether the terms were accepted.
    pub terms_accepted: bool,
}

impl Registration {
    /// Check the form as of `today` (age is checked against it).
    pub fn validate(&self, today: Date) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if is_blank(&self.name) {
            errors.insert(Field::Name, "Name is required");
        }

        validate_email(&self.email, &mut errors);
        validate_password(&self.password, &mut errors);

        if self.password != self.confirm_password {
            errors.insert(Field::ConfirmPassword, "Passwords do not match");
        }

        if is_blank(&self.birthdate) {
            errors.insert(Field::Birthdate, "Date of birth is required");
        } else {
            match self.birthdate.trim().parse::<Date>() {
                Ok(birthdate) if birthdate > today => {
                    errors.insert(Field::Birthdate, "Invalid date");
                }
                Ok(birthdate) if age_on(birthdate, today) < MIN_MEMBER_AGE => {
                    errors.insert(
                        Field::Birthdate,
                        format!("You must be at least {MIN_MEMBER_AGE} years old"),
                    );
                }
                Ok(_) => {}
                Err(_) => errors.insert(Field::Birthdate, "Invalid date"),
            }
        }

        if !self.terms_accepted {
            errors.insert(Field::TermsAccepted, "You must accept the terms and conditions");
        }

        errors
    }
}

fn validate_email(email: &str, errors: &mut FieldErrors) {
    if is_blank(email) {
        errors.insert(Field::Email, "E-mail is required");
    } else if !is_email(email) {
        errors.insert(Field::Email, "Invalid e-mail");
    }
}

fn validate_password(password: &str, errors: &mut FieldErrors) {
    if password.is_empty() {
        errors.insert(Field::Password, "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            Field::Password,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
}

/// Whole years between `birthdate` and `today`.
fn age_on(birthdate: Date, today: Date) -> i16 {
    let years = today.year() - birthdate.year();

    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years - 1
    } else {
        years
    }
}
