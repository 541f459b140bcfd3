//! Plain-text rendering.
//!
//! Every function writes one screen of state to `out` and nothing else.
//! Decisions about what to show are made by the caller.

use std::io::{self, Write};

use jwt_pizza_client::{Cart, NavItem, OrderReceipt, OrderVerification, ServiceDocs};
use jwt_pizza_core::{Bitcoin, Franchise, FranchiseList, MenuItem, OrderHistory, User, UserList};

pub fn menu(out: &mut impl Write, items: &[MenuItem]) -> io::Result<()> {
    writeln!(out, "Awesome is a click away")?;
    for item in items {
        writeln!(out, "  [{}] {} - {} ({})", item.id, item.title, item.description, item.price)?;
    }
    Ok(())
}

pub fn navigation(out: &mut impl Write, items: &[NavItem]) -> io::Result<()> {
    let labels: Vec<&str> = items.iter().map(NavItem::label).collect();
    writeln!(out, "{}", labels.join(" | "))
}

pub fn user(out: &mut impl Write, user: &User) -> io::Result<()> {
    writeln!(out, "{} ({})", user.name, user.initials())?;
    writeln!(out, "  id:    {}", user.id)?;
    writeln!(out, "  email: {}", user.email)?;
    writeln!(out, "  roles: {}", user.role_summary())
}

pub fn franchises(out: &mut impl Write, list: &FranchiseList) -> io::Result<()> {
    if list.franchises.is_empty() {
        return writeln!(out, "No franchises found.");
    }
    for franchise in &list.franchises {
        franchise_row(out, franchise)?;
    }
    if list.more {
        writeln!(out, "(more on the next page)")?;
    }
    Ok(())
}

/// Franchise dashboard: every store with its revenue.
pub fn franchise_dashboard(out: &mut impl Write, franchises: &[Franchise]) -> io::Result<()> {
    if franchises.is_empty() {
        return writeln!(out, "So you want a piece of the pie? You do not run a franchise yet.");
    }
    for franchise in franchises {
        franchise_row(out, franchise)?;
        writeln!(out, "    total revenue: {}", franchise.total_revenue())?;
    }
    Ok(())
}

fn franchise_row(out: &mut impl Write, franchise: &Franchise) -> io::Result<()> {
    writeln!(out, "[{}] {}", franchise.id, franchise.name)?;
    if !franchise.admins.is_empty() {
        let admins: Vec<String> = franchise
            .admins
            .iter()
            .map(|admin| admin.name.clone().unwrap_or_else(|| admin.email.to_string()))
            .collect();
        writeln!(out, "    admins: {}", admins.join(", "))?;
    }
    for store in &franchise.stores {
        match store.total_revenue {
            Some(revenue) => writeln!(out, "    {}/{} {} {revenue}", franchise.id, store.id, store.name)?,
            None => writeln!(out, "    {}/{} {}", franchise.id, store.id, store.name)?,
        }
    }
    Ok(())
}

pub fn cart(out: &mut impl Write, cart: &Cart) -> io::Result<()> {
    writeln!(out, "Selected pizzas: {}", cart.len())?;
    for item in cart.items() {
        writeln!(out, "  {} {}", item.title, item.price)?;
    }
    writeln!(out, "  total {}", cart.total())
}

pub fn receipt(out: &mut impl Write, receipt: &OrderReceipt) -> io::Result<()> {
    let order = &receipt.order;
    writeln!(out, "Send me those {} pizzas right now!", order.items.len())?;
    match order.id {
        Some(id) => writeln!(out, "  order {id}")?,
        None => writeln!(out, "  order (pending id)")?,
    }
    for item in &order.items {
        writeln!(out, "  {} {}", item.description, item.price)?;
    }
    writeln!(out, "  total {}", order.total())?;
    writeln!(out, "  token {}", receipt.jwt)?;
    if let Some(claims) = receipt.claims() {
        writeln!(out, "  claims {claims}")?;
    }
    Ok(())
}

pub fn verification(out: &mut impl Write, verification: &OrderVerification) -> io::Result<()> {
    writeln!(out, "{}", verification.message)?;
    if !verification.payload.is_null() {
        writeln!(out, "  {}", verification.payload)?;
    }
    Ok(())
}

pub fn history(out: &mut impl Write, history: &OrderHistory) -> io::Result<()> {
    writeln!(out, "Your pizza kitchen")?;
    if history.orders.is_empty() {
        return writeln!(out, "  How have you lived this long without having a pizza?");
    }
    let mut spent = Bitcoin::ZERO;
    for order in &history.orders {
        let id = order.id.map_or_else(|| "?".to_string(), |id| id.to_string());
        let date = order
            .date
            .map_or_else(String::new, |date| date.format("%Y-%m-%d %H:%M").to_string());
        writeln!(out, "  {id} {date} {}", order.total())?;
        spent = spent + order.total();
    }
    writeln!(out, "  spent {spent}")
}

pub fn users(out: &mut impl Write, list: &UserList) -> io::Result<()> {
    if list.users.is_empty() {
        return writeln!(out, "No users found.");
    }
    for user in &list.users {
        writeln!(out, "[{}] {} <{}> {}", user.id, user.name, user.email, user.role_summary())?;
    }
    if list.more {
        writeln!(out, "(more on the next page)")?;
    }
    Ok(())
}

pub fn docs(out: &mut impl Write, docs: &ServiceDocs) -> io::Result<()> {
    writeln!(out, "JWT Pizza API {}", docs.version)?;
    for endpoint in &docs.endpoints {
        let lock = if endpoint.requires_auth { "🔐" } else { "  " };
        writeln!(out, "{lock} {:6} {}", endpoint.method, endpoint.path)?;
        if !endpoint.description.is_empty() {
            writeln!(out, "         {}", endpoint.description)?;
        }
    }
    Ok(())
}
