//! Form validation primitives.
//!
//! Forms never fail with an `Err`: they collect one message per offending
//! field into [`FieldErrors`], and submission is blocked until it's empty.

use std::{collections::BTreeMap, fmt};

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Name printed on the card.
    CardName,
    /// Card number.
    CardNumber,
    /// Card expiry.
    CardExpiry,
    /// Card verification code.
    CardCvv,
    /// Brazilian taxpayer id.
    Cpf,
    /// Buyer or member name.
    Name,
    /// E-mail address.
    Email,
    /// Phone number.
    Phone,
    /// Checkout terms checkbox.
    AgreeTerms,
    /// Password.
    Password,
    /// Password confirmation.
    ConfirmPassword,
    /// Date of birth.
    Birthdate,
    /// Registration terms checkbox.
    TermsAccepted,
    /// Coupon code.
    Coupon,
    /// Whole-form failure, not tied to an input.
    Submit,
}

impl Field {
    /// The field's form key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CardName => "cardName",
            Self::CardNumber => "cardNumber",
            Self::CardExpiry => "cardExpiry",
            Self::CardCvv => "cardCVV",
            Self::Cpf => "cpf",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::AgreeTerms => "agreeTerms",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Birthdate => "birthdate",
            Self::TermsAccepted => "termsAccepted",
            Self::Coupon => "coupon",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-keyed validation messages. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field`, replacing any earlier message.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Drop the message for `field`, e.g. once the user edits it.
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    /// Message recorded for `field`.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether `field` has a message.
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Whether the form is valid.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of offending fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate fields in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }

            write!(f, "{field}: {message}")?;
        }

        Ok(())
    }
}

/// Whether a required text input was left empty.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Loose e-mail shape check: something, `@`, something, `.`, something.
pub fn is_email(value: &str) -> bool {
    value.split_whitespace().any(|token| {
        let chars: Vec<char> = token.chars().collect();

        let Some(at) = chars.iter().skip(1).position(|c| *c == '@').map(|i| i + 1) else {
            return false;
        };

        let last_dot = chars
            .iter()
            .take(chars.len().saturating_sub(1))
            .rposition(|c| *c == '.');

        last_dot.is_some_and(|dot| dot >= at + 2)
    })
}

/// Keep only ASCII digits.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Drop all whitespace.
pub fn without_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Whether `value` is made of ASCII digits only, with a length in `min..=max`.
pub fn is_digits(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();

    (min..=max).contains(&len) && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_email("ana@luxe.com"));
        assert!(is_email("a@b.c"));
        assert!(is_email("first.last@mail.example.org"));

        assert!(!is_email("ana"));
        assert!(!is_email("ana@luxe"));
        assert!(!is_email("@luxe.com"));
        assert!(!is_email("ana@.com"));
        assert!(!is_email("ana@luxe."));
        assert!(!is_email(""));
    }

    #[test]
    fn digit_helpers() {
        assert_eq!(digits_only("123.456.789-09"), "12345678909");
        assert_eq!(without_whitespace("4111 1111 1111 1111"), "4111111111111111");

        assert!(is_digits("123", 3, 4));
        assert!(is_digits("1234", 3, 4));
        assert!(!is_digits("12", 3, 4));
        assert!(!is_digits("12345", 3, 4));
        assert!(!is_digits("12a", 3, 4));
    }

    #[test]
    fn field_errors_track_messages_per_field() {
        let mut errors = FieldErrors::new();

        assert!(errors.is_empty());

        errors.insert(Field::Email, "E-mail is required");
        errors.insert(Field::Email, "Invalid e-mail");
        errors.insert(Field::Cpf, "Invalid CPF");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(Field::Email), Some("Invalid e-mail"));
        assert_eq!(errors.to_string(), "cpf: Invalid CPF; email: Invalid e-mail");

        errors.clear(Field::Email);

        assert!(!errors.contains(Field::Email));
    }
}
