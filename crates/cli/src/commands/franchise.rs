//! Franchise dashboard commands.
//!
//! Shown to franchisees. Store commands are offered for the franchises the
//! user runs; admins may use them on any franchise.

use std::io::Write;

use jwt_pizza_client::{Capability, PizzaError, Storefront};
use jwt_pizza_core::{FranchiseId, StoreId};

use super::{CliError, require};
use crate::view;

/// The dashboard. Users without a franchise get the pitch instead.
pub async fn list(storefront: &Storefront, out: &mut impl Write) -> Result<(), CliError> {
    if !storefront.session().is_logged_in() {
        return Err(PizzaError::NotLoggedIn.into());
    }
    let franchises = if storefront
        .capabilities()
        .allows(Capability::FranchiseDashboard)
    {
        storefront.my_franchises().await?
    } else {
        Vec::new()
    };
    view::franchise_dashboard(out, &franchises)?;
    Ok(())
}

pub async fn create_store(
    storefront: &Storefront,
    out: &mut impl Write,
    franchise_id: FranchiseId,
    name: &str,
) -> Result<(), CliError> {
    require(storefront, Capability::ManageStores(franchise_id), "Creating stores")?;
    let store = storefront.create_store(franchise_id, name).await?;
    writeln!(out, "Created store {franchise_id}/{} {}", store.id, store.name)?;
    Ok(())
}

pub async fn close_store(
    storefront: &Storefront,
    out: &mut impl Write,
    franchise_id: FranchiseId,
    store_id: StoreId,
) -> Result<(), CliError> {
    require(storefront, Capability::ManageStores(franchise_id), "Closing stores")?;
    storefront.close_store(franchise_id, store_id).await?;
    writeln!(out, "Closed store {franchise_id}/{store_id}")?;
    Ok(())
}
