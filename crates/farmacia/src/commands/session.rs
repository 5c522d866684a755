//! Login check and account registration.

use secrecy::SecretString;

use farmacia_core::{Controller, User};

use crate::cli::{GlobalOpts, RegisterArgs};
use crate::error::CliError;
use crate::output;

/// Print the user that the configured credentials log in as.
pub fn login(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let user = controller.current_user().ok_or(CliError::NotLoggedIn)?;
    let mode = controller.mode();
    let out = output::render_single(
        &global.output,
        &user,
        |u: &User| {
            output::detail_block(&[
                ("ID", u.id.to_string()),
                ("Name", u.name.clone()),
                ("Email", u.email.clone()),
                ("Mode", mode.to_string()),
            ])
        },
        |u| u.email.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn register(
    controller: &Controller,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let email = args
        .account_email
        .or_else(|| global.email.clone())
        .ok_or_else(|| CliError::validation("email", "pass --account-email or --email"))?;

    let password = match global.password.clone() {
        Some(pw) => pw,
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        return Err(CliError::validation("password", "password cannot be empty"));
    }

    controller
        .register(&args.nome, &email, &SecretString::from(password))
        .await?;
    Ok(())
}
