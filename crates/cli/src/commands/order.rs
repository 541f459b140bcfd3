//! Menu, ordering, and order history commands.
//!
//! # Usage
//!
//! ```bash
//! pizza menu
//! pizza franchises --filter Pizza
//! pizza order --store 2/4 --item 1 --item 2
//! pizza history
//! pizza verify eyJpYXQ...
//! ```

use std::io::Write;

use jwt_pizza_client::{StoreTarget, Storefront};
use jwt_pizza_core::MenuItemId;

use super::CliError;
use crate::view;

pub async fn menu(storefront: &Storefront, out: &mut impl Write) -> Result<(), CliError> {
    view::menu(out, &storefront.menu().await?)?;
    Ok(())
}

pub async fn franchises(
    storefront: &Storefront,
    out: &mut impl Write,
    filter: &str,
    page: u32,
) -> Result<(), CliError> {
    view::franchises(out, &storefront.franchises(filter, page).await?)?;
    Ok(())
}

/// Fill the cart, show it, and check out.
pub async fn order(
    storefront: &mut Storefront,
    out: &mut impl Write,
    store: StoreTarget,
    items: &[MenuItemId],
) -> Result<(), CliError> {
    storefront.cart_mut().select_store(store);
    for id in items {
        storefront.add_to_cart(*id).await?;
    }
    view::cart(out, storefront.cart())?;

    let receipt = storefront.checkout().await?;
    view::receipt(out, &receipt)?;
    Ok(())
}

pub async fn history(
    storefront: &Storefront,
    out: &mut impl Write,
    page: u32,
) -> Result<(), CliError> {
    view::history(out, &storefront.order_history(page).await?)?;
    Ok(())
}

pub async fn verify(
    storefront: &Storefront,
    out: &mut impl Write,
    jwt: &str,
) -> Result<(), CliError> {
    view::verification(out, &storefront.verify(jwt).await?)?;
    Ok(())
}

pub async fn docs(storefront: &Storefront, out: &mut impl Write) -> Result<(), CliError> {
    view::docs(out, &storefront.service().docs().await?)?;
    Ok(())
}
