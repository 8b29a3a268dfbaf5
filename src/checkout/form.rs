//! Checkout form.

use serde::{Deserialize, Serialize};

use crate::{
    auth::User,
    orders::PaymentMethod,
    validation::{Field, FieldErrors, digits_only, is_blank, is_digits, is_email, without_whitespace},
};

/// Digits in a card number.
pub const CARD_NUMBER_DIGITS: usize = 16;

/// Digits in a CPF.
pub const CPF_DIGITS: usize = 11;

/// Payment and contact details typed in at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    /// Name printed on the card.
    pub card_name: String,

    /// Card number; spaces are allowed.
    pub card_number: String,

    /// Card expiry, e.g. `12/27`.
    pub card_expiry: String,

    /// Card verification code.
    #[serde(rename = "cardCVV")]
    pub card_cvv: String,

    /// Brazilian taxpayer id; punctuation is allowed.
    pub cpf: String,

    /// Whether to remember the card.
    pub save_card: bool,

    /// Buyer full name.
    pub name: String,

    /// Buyer e-mail.
    pub email: String,

    /// Buyer phone.
    pub phone: String,

    /// Billing address.
    pub address: String,

    /// Billing city.
    pub city: String,

    /// Billing state.
    pub state: String,

    /// Billing postcode.
    pub zip_code: String,

    /// Whether the terms were accepted.
    pub agree_terms: bool,
}

impl CheckoutForm {
    /// A blank form with the member's name and e-mail filled in.
    #[must_use]
    pub fn prefilled(user: Option<&User>) -> Self {
        let mut form = Self::default();

        if let Some(user) = user {
            form.name.clone_from(&user.name);
            form.email.clone_from(&user.email);
        }

        form
    }

    /// Check the form for `method`. Card fields only matter for credit.
    pub fn validate(&self, method: PaymentMethod) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if method == PaymentMethod::Credit {
            self.validate_card(&mut errors);
        }

        if is_blank(&self.name) {
            errors.insert(Field::Name, "Full name is required");
        }

        if is_blank(&self.email) {
            errors.insert(Field::Email, "E-mail is required");
        } else if !is_email(&self.email) {
            errors.insert(Field::Email, "Invalid e-mail");
        }

        if is_blank(&self.phone) {
            errors.insert(Field::Phone, "Phone is required");
        }

        if is_blank(&self.cpf) {
            errors.insert(Field::Cpf, "CPF is required");
        } else if !is_digits(&digits_only(&self.cpf), CPF_DIGITS, CPF_DIGITS) {
            errors.insert(Field::Cpf, "Invalid CPF");
        }

        if !self.agree_terms {
            errors.insert(Field::AgreeTerms, "You must agree to the terms and conditions");
        }

        errors
    }

    fn validate_card(&self, errors: &mut FieldErrors) {
        if is_blank(&self.card_name) {
            errors.insert(Field::CardName, "Name on card is required");
        }

        if is_blank(&self.card_number) {
            errors.insert(Field::CardNumber, "Card number is required");
        } else if !is_digits(
            &without_whitespace(&self.card_number),
            CARD_NUMBER_DIGITS,
            CARD_NUMBER_DIGITS,
        ) {
            errors.insert(Field::CardNumber, "Invalid card number");
        }

        if is_blank(&self.card_expiry) {
            errors.insert(Field::CardExpiry, "Expiry date is required");
        }

        if self.card_cvv.is_empty() {
            errors.insert(Field::CardCvv, "CVV is required");
        } else if !is_digits(&self.card_cvv, 3, 4) {
            errors.insert(Field::CardCvv, "Invalid CVV");
        }
    }

    /// Last four digits of the card number, for receipts.
    pub fn card_last_four(&self) -> Option<String> {
        let digits = without_whitespace(&self.card_number);
        let start = digits.len().checked_sub(4)?;

        digits.get(start..).map(str::to_string)
    }
}
