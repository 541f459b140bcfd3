//! Admin dashboard commands.
//!
//! # Usage
//!
//! ```bash
//! pizza admin franchises --filter Pizza
//! pizza admin create-franchise PizzaCorp --admin f@jwt.com
//! pizza admin close-franchise 4
//! pizza admin users
//! pizza admin delete-user 7
//! ```

use std::io::Write;

use jwt_pizza_client::{Capability, Storefront};
use jwt_pizza_core::{FranchiseId, UserId};

use super::{CliError, require};
use crate::view;

const SECTION: &str = "The admin dashboard";

pub async fn franchises(
    storefront: &Storefront,
    out: &mut impl Write,
    filter: &str,
    page: u32,
) -> Result<(), CliError> {
    require(storefront, Capability::AdminDashboard, SECTION)?;
    writeln!(out, "Franchises")?;
    view::franchises(out, &storefront.franchises(filter, page).await?)?;
    Ok(())
}

pub async fn create_franchise(
    storefront: &Storefront,
    out: &mut impl Write,
    name: &str,
    admins: &[String],
) -> Result<(), CliError> {
    require(storefront, Capability::ManageFranchises, SECTION)?;
    let admins: Vec<&str> = admins.iter().map(String::as_str).collect();
    let franchise = storefront.create_franchise(name, &admins).await?;
    writeln!(out, "Created franchise [{}] {}", franchise.id, franchise.name)?;
    Ok(())
}

pub async fn close_franchise(
    storefront: &Storefront,
    out: &mut impl Write,
    franchise_id: FranchiseId,
) -> Result<(), CliError> {
    require(storefront, Capability::ManageFranchises, SECTION)?;
    storefront.close_franchise(franchise_id).await?;
    writeln!(out, "Sorry to see you go. Closed franchise {franchise_id}")?;
    Ok(())
}

pub async fn users(
    storefront: &Storefront,
    out: &mut impl Write,
    filter: &str,
    page: u32,
) -> Result<(), CliError> {
    require(storefront, Capability::ManageUsers, SECTION)?;
    view::users(out, &storefront.list_users(filter, page).await?)?;
    Ok(())
}

pub async fn delete_user(
    storefront: &Storefront,
    out: &mut impl Write,
    user_id: UserId,
) -> Result<(), CliError> {
    require(storefront, Capability::DeleteUser, SECTION)?;
    storefront.delete_user(user_id).await?;
    writeln!(out, "Deleted user {user_id}")?;
    Ok(())
}
