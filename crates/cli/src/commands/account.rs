//! Login, registration, logout, and profile commands.
//!
//! # Usage
//!
//! ```bash
//! pizza login -e d@jwt.com -p a
//! pizza register -n "Kai Chen" -e d@jwt.com -p a
//! pizza whoami
//! pizza profile --name "Kai Chen" --email kai@jwt.com
//! pizza logout
//! ```

use std::io::Write;

use secrecy::SecretString;

use jwt_pizza_client::{PizzaError, Storefront};

use super::CliError;
use crate::view;

pub async fn login(
    storefront: &mut Storefront,
    out: &mut impl Write,
    email: &str,
    password: SecretString,
) -> Result<(), CliError> {
    let user = storefront.login(email, &password).await?;
    view::user(out, user)?;
    view::navigation(out, &storefront.navigation())?;
    Ok(())
}

pub async fn register(
    storefront: &mut Storefront,
    out: &mut impl Write,
    name: &str,
    email: &str,
    password: SecretString,
) -> Result<(), CliError> {
    let user = storefront.register(name, email, &password).await?;
    view::user(out, user)?;
    Ok(())
}

pub async fn logout(storefront: &mut Storefront, out: &mut impl Write) -> Result<(), CliError> {
    let was_logged_in = storefront.session().is_logged_in();
    storefront.logout().await?;
    if was_logged_in {
        writeln!(out, "Logged out.")?;
    }
    view::navigation(out, &storefront.navigation())?;
    Ok(())
}

pub fn whoami(storefront: &Storefront, out: &mut impl Write) -> Result<(), CliError> {
    let user = storefront.session().user().ok_or(PizzaError::NotLoggedIn)?;
    view::user(out, user)?;
    Ok(())
}

/// Update the profile. Omitted fields keep their current value.
pub async fn profile(
    storefront: &mut Storefront,
    out: &mut impl Write,
    name: Option<String>,
    email: Option<String>,
    password: Option<SecretString>,
) -> Result<(), CliError> {
    let current = storefront.session().user().ok_or(PizzaError::NotLoggedIn)?;
    let name = name.unwrap_or_else(|| current.name.clone());
    let email = email.unwrap_or_else(|| current.email.to_string());

    let user = storefront
        .update_profile(&name, &email, password.as_ref())
        .await?;
    view::user(out, user)?;
    Ok(())
}
