#![deny(clippy::all, clippy::pedantic)]

use recipebox::application::{AuthForm, AuthOutcome};
use serde_json::json;

use crate::args::CredentialsArgs;
use crate::context::{CliError, Ctx};
use crate::print::print_json;
use crate::prompt::read_secret_line;

fn password(args: &CredentialsArgs) -> Result<String, CliError> {
    match args.password_env.as_ref() {
        Some(password) => Ok(password.clone()),
        None => read_secret_line("password"),
    }
}

pub async fn login(ctx: &Ctx, args: CredentialsArgs) -> Result<(), CliError> {
    let mut form = AuthForm::new();
    form.password = password(&args)?;
    form.email = args.email;

    form.submit(&ctx.session).await?;
    print_json(&json!({
        "status": "signed_in",
        "userId": ctx.session.current_user_id(),
    }))
}

pub async fn register(ctx: &Ctx, args: CredentialsArgs) -> Result<(), CliError> {
    let mut form = AuthForm::new();
    form.toggle_mode();
    form.password = password(&args)?;
    form.confirm_password = match args.password_env.as_ref() {
        Some(password) => password.clone(),
        None => read_secret_line("confirm password")?,
    };
    form.email = args.email;

    match form.submit(&ctx.session).await? {
        AuthOutcome::Registered(user) => print_json(&user),
        AuthOutcome::SignedIn => print_json(&json!({ "status": "signed_in" })),
    }
}

pub fn logout(ctx: &Ctx) -> Result<(), CliError> {
    ctx.session.logout()?;
    print_json(&json!({ "status": "signed_out" }))
}

pub fn whoami(ctx: &Ctx) -> Result<(), CliError> {
    ctx.require_login()?;
    print_json(&json!({ "userId": ctx.session.current_user_id() }))
}
