use std::io;

use clap::Args;
use jiff::Zoned;
use luxe::{
    auth::{LoginForm, Registration},
    context::AppContext,
};

use super::output_error;

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Member e-mail
    #[arg(long)]
    email: String,

    /// Password
    #[arg(long, env = "LUXE_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Full name
    #[arg(long)]
    name: String,

    /// E-mail
    #[arg(long)]
    email: String,

    /// Password, at least 6 characters
    #[arg(long, env = "LUXE_PASSWORD", hide_env_values = true)]
    password: String,

    /// Password again
    #[arg(long)]
    confirm_password: String,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    birthdate: String,

    /// Accept the terms and conditions
    #[arg(long)]
    accept_terms: bool,
}

pub(crate) async fn login(
    context: &AppContext,
    args: LoginArgs,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let form = LoginForm {
        email: args.email,
        password: args.password,
    };

    let errors = form.validate();

    if !errors.is_empty() {
        return Err(errors.to_string());
    }

    let user = context
        .login(form.email.trim(), &form.password)
        .await
        .map_err(|error| error.to_string())?;

    writeln!(
        out,
        "Signed in as {} <{}>. {} ticket(s) in your wallet.",
        user.name,
        user.email,
        context.wallet.tickets().len()
    )
    .map_err(output_error)
}

pub(crate) async fn register(
    context: &AppContext,
    args: RegisterArgs,
    out: &mut impl io::Write,
) -> Result<(), String> {
    let registration = Registration {
        name: args.name,
        email: args.email,
        password: args.password,
        confirm_password: args.confirm_password,
        birthdate: args.birthdate,
        terms_accepted: args.accept_terms,
    };

    let errors = registration.validate(Zoned::now().date());

    if !errors.is_empty() {
        return Err(errors.to_string());
    }

    context
        .register(registration)
        .await
        .map_err(|error| error.to_string())?;

    writeln!(out, "Registration received. Sign in with `luxe login`.").map_err(output_error)
}

pub(crate) fn logout(context: &AppContext, out: &mut impl io::Write) -> Result<(), String> {
    context.logout();

    writeln!(out, "Signed out.").map_err(output_error)
}

pub(crate) fn whoami(context: &AppContext, out: &mut impl io::Write) -> Result<(), String> {
    let written = match context.session.current_user() {
        Some(user) => writeln!(out, "{} <{}>", user.name, user.email),
        None => writeln!(out, "Not signed in."),
    };

    written.map_err(output_error)
}
