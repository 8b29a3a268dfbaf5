use std::io;

use clap::Args;
use luxe::{
    checkout::{CheckoutError, CheckoutForm},
    context::AppContext,
    orders::PaymentMethod,
    receipt,
};

use super::{output_error, signed_in};

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Payment method (credit, boleto, pix)
    #[arg(long, default_value = "pix")]
    method: PaymentMethod,

    /// Coupon code
    #[arg(long)]
    coupon: Option<String>,

    /// Buyer name; defaults to the member's
    #[arg(long)]
    name: Option<String>,

    /// Buyer e-mail; defaults to the member's
    #[arg(long)]
    email: Option<String>,

    /// Buyer phone
    #[arg(long, default_value = "")]
    phone: String,

    /// Buyer CPF
    #[arg(long, default_value = "")]
    cpf: String,

    /// Name printed on the card
    #[arg(long, default_value = "")]
    card_name: String,

    /// Card number
    #[arg(long, default_value = "", hide_default_value = true)]
    card_number: String,

    /// Card expiry (MM/YY)
    #[arg(long, default_value = "")]
    card_expiry: String,

    /// Card verification code
    #[arg(long, default_value = "", hide_default_value = true)]
    card_cvv: String,

    /// Remember the card
    #[arg(long)]
    save_card: bool,

    /// Billing address
    #[arg(long, default_value = "")]
    address: String,

    /// Billing city
    #[arg(long, default_value = "")]
    city: String,

    /// Billing state
    #[arg(long, default_value = "")]
    state: String,

    /// Billing postcode
    #[arg(long, default_value = "")]
    zip_code: String,

    /// Accept the terms and conditions
    #[arg(long)]
    agree_terms: bool,
}

impl CheckoutArgs {
    fn into_form(self, prefilled: CheckoutForm) -> CheckoutForm {
        CheckoutForm {
            card_name: self.card_name,
            card_number: self.card_number,
            card_expiry: self.card_expiry,
            card_cvv: self.card_cvv,
            cpf: self.cpf,
            save_card: self.save_card,
            name: self.name.unwrap_or(prefilled.name),
            email: self.email.unwrap_or(prefilled.email),
            phone: self.phone,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            agree_terms: self.agree_terms,
        }
    }
}

pub(crate) async fn run(
    context: &AppContext,
    mut args: CheckoutArgs,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let user = signed_in(context)?;
    let mut checkout = context.checkout();

    if let Some(code) = args.coupon.take() {
        checkout.apply_coupon(&code).map_err(|error| error.to_string())?;
    }

    let method = args.method;
    let form = args.into_form(CheckoutForm::prefilled(Some(&user)));

    writeln!(out, "Processing {method} payment...").map_err(output_error)?;

    let confirmation = match checkout.submit(&form, method).await {
        Ok(confirmation) => confirmation,
        Err(CheckoutError::Invalid(errors)) => {
            return Err(format!("please fix the checkout form: {errors}"));
        }
        Err(error) => return Err(error.to_string()),
    };

    receipt::write_confirmation(
        out,
        &confirmation.order,
        &confirmation.totals,
        &confirmation.tickets,
    )
    .map_err(output_error)?;

    writeln!(out, "Transaction: {}", confirmation.receipt.transaction_id).map_err(output_error)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::cli::test_helpers::{context, run, sign_in};

    #[tokio::test]
    async fn checkout_requires_sign_in() -> TestResult {
        let context = context()?;

        run(&context, &["cart", "add", "1", "Standard"]).await?;

        let result = run(&context, &["checkout", "--agree-terms"]).await;

        assert!(result.is_err(), "expected error, got {result:?}");
        assert_eq!(context.cart.item_count(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn pix_checkout_issues_tickets_and_empties_cart() -> TestResult {
        let context = context()?;

        sign_in(&context).await?;
        run(&context, &["cart", "add", "3", "VIP", "-q", "2"]).await?;

        let text = run(
            &context,
            &[
                "checkout",
                "--method",
                "pix",
                "--coupon",
                "luxe50",
                "--phone",
                "(11) 99999-0000",
                "--cpf",
                "123.456.789-09",
                "--agree-terms",
            ],
        )
        .await?;

        assert!(text.contains("confirmed"), "missing confirmation in {text}");
        assert!(context.cart.is_empty());
        assert_eq!(context.wallet.tickets().len(), 2);

        let order = context.wallet.purchase_history();

        assert_eq!(
            order.first().map(|order| order.amount_paid()),
            Some(rust_decimal::Decimal::from(225))
        );

        Ok(())
    }

    #[tokio::test]
    async fn invalid_card_keeps_cart() -> TestResult {
        let context = context()?;

        sign_in(&context).await?;
        run(&context, &["cart", "add", "1", "Standard"]).await?;

        let result = run(
            &context,
            &[
                "checkout",
                "--method",
                "credit",
                "--card-number",
                "1234",
                "--phone",
                "(11) 99999-0000",
                "--cpf",
                "123.456.789-09",
                "--agree-terms",
            ],
        )
        .await;

        let message = result.err().map(|error| error.to_string()).unwrap_or_default();

        assert!(message.contains("cardNumber"), "unexpected result: {message}");
        assert_eq!(context.cart.item_count(), 1);
        assert!(context.wallet.tickets().is_empty());

        Ok(())
    }
}
