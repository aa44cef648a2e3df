//! Order Pricer
//!
//! Turns a cart into priced order lines. All arithmetic is `Decimal`;
//! the first unresolvable reference aborts the whole cart. Every step is
//! `checked_*`; a result that does not fit a `Decimal` rejects the cart.
//!
//! ```text
//! line_base       = (menu.price - menu.discount) × quantity
//! add_on_subtotal = Σ add_on.price × add_on.quantity
//! line_subtotal   = line_base + add_on_subtotal
//! total           = Σ line_subtotal
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::{CartLine, OrderAddOn, OrderItem};
use thiserror::Error;

use crate::catalog::{CatalogError, CatalogLookup, ItemKind, PriceQuote};
use crate::db::repository::RepoError;

/// Maximum quantity per line (and per add-on line)
pub const MAX_QUANTITY: i64 = 9999;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Order has no items")]
    Empty,

    #[error("Invalid quantity {quantity} for {kind} {id}")]
    InvalidQuantity {
        kind: ItemKind,
        id: String,
        quantity: i64,
    },

    #[error("Menu {menu_id} does not exist")]
    InvalidMenuReference { menu_id: String },

    #[error("Add-on {add_on_id} does not exist")]
    InvalidAddOnReference { add_on_id: String },

    #[error("Menu {menu_id} is unavailable")]
    MenuUnavailable { menu_id: String },

    #[error("Add-on {add_on_id} is unavailable")]
    AddOnUnavailable { add_on_id: String },

    #[error("Amount for menu {menu_id} is out of range")]
    AmountOverflow { menu_id: String },

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        let message = err.to_string();
        match err {
            PricingError::Empty => AppError::with_message(ErrorCode::OrderEmpty, message),
            PricingError::InvalidQuantity { kind, id, quantity } => {
                AppError::with_message(ErrorCode::InvalidQuantity, message)
                    .with_detail("kind", kind.to_string())
                    .with_detail("id", id)
                    .with_detail("quantity", quantity)
            }
            PricingError::InvalidMenuReference { menu_id } => {
                AppError::with_message(ErrorCode::InvalidMenuReference, message)
                    .with_detail("menu_id", menu_id)
            }
            PricingError::InvalidAddOnReference { add_on_id } => {
                AppError::with_message(ErrorCode::InvalidAddOnReference, message)
                    .with_detail("add_on_id", add_on_id)
            }
            PricingError::MenuUnavailable { menu_id } => {
                AppError::with_message(ErrorCode::MenuUnavailable, message)
                    .with_detail("menu_id", menu_id)
            }
            PricingError::AddOnUnavailable { add_on_id } => {
                AppError::with_message(ErrorCode::AddOnUnavailable, message)
                    .with_detail("add_on_id", add_on_id)
            }
            PricingError::AmountOverflow { menu_id } => {
                AppError::with_message(ErrorCode::InvalidAmount, message)
                    .with_detail("menu_id", menu_id)
            }
            PricingError::Repo(e) => e.into(),
        }
    }
}

impl PricingError {
    fn from_catalog(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound {
                kind: ItemKind::Menu,
                id,
            } => Self::InvalidMenuReference { menu_id: id },
            CatalogError::NotFound {
                kind: ItemKind::AddOn,
                id,
            } => Self::InvalidAddOnReference { add_on_id: id },
            CatalogError::Unavailable {
                kind: ItemKind::Menu,
                id,
            } => Self::MenuUnavailable { menu_id: id },
            CatalogError::Unavailable {
                kind: ItemKind::AddOn,
                id,
            } => Self::AddOnUnavailable { add_on_id: id },
            CatalogError::Repo(e) => Self::Repo(e),
        }
    }
}

/// Priced cart
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub lines: Vec<OrderItem>,
    pub total: Decimal,
}

fn check_quantity(kind: ItemKind, id: &str, quantity: i64) -> Result<u32, PricingError> {
    if (1..=MAX_QUANTITY).contains(&quantity) {
        // bounded above, cannot truncate
        Ok(quantity as u32)
    } else {
        Err(PricingError::InvalidQuantity {
            kind,
            id: id.to_string(),
            quantity,
        })
    }
}

/// Prices carts against a [`CatalogLookup`]
#[derive(Clone)]
pub struct OrderPricer {
    catalog: Arc<dyn CatalogLookup>,
}

impl std::fmt::Debug for OrderPricer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderPricer").finish_non_exhaustive()
    }
}

impl OrderPricer {
    pub fn new(catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { catalog }
    }

    /// Price every line of `cart`
    ///
    /// Quantities are checked before any catalog read. Each distinct id is
    /// resolved once per call, so repeated lines see one consistent price.
    pub async fn price(&self, cart: &[CartLine]) -> Result<PricedOrder, PricingError> {
        if cart.is_empty() {
            return Err(PricingError::Empty);
        }

        let mut quantities = Vec::with_capacity(cart.len());
        for line in cart {
            let qty = check_quantity(ItemKind::Menu, &line.menu_id, line.quantity)?;
            let add_on_qty = line
                .add_on_items
                .iter()
                .map(|a| check_quantity(ItemKind::AddOn, &a.add_on_id, a.quantity))
                .collect::<Result<Vec<_>, _>>()?;
            quantities.push((qty, add_on_qty));
        }

        let mut quotes: HashMap<(ItemKind, String), PriceQuote> = HashMap::new();
        let mut lines = Vec::with_capacity(cart.len());
        let mut total = Decimal::ZERO;

        for (line, (qty, add_on_qty)) in cart.iter().zip(quantities) {
            let overflow = || PricingError::AmountOverflow {
                menu_id: line.menu_id.clone(),
            };
            let menu = self.quote(&mut quotes, ItemKind::Menu, &line.menu_id).await?;
            let line_base = menu
                .price
                .checked_sub(menu.discount)
                .and_then(|net| net.checked_mul(Decimal::from(qty)))
                .ok_or_else(overflow)?;

            let mut add_on_items = Vec::with_capacity(line.add_on_items.len());
            let mut add_on_subtotal = Decimal::ZERO;
            for (add_on, qty) in line.add_on_items.iter().zip(add_on_qty) {
                let quote = self.quote(&mut quotes, ItemKind::AddOn, &add_on.add_on_id).await?;
                let subtotal = quote
                    .price
                    .checked_mul(Decimal::from(qty))
                    .ok_or_else(overflow)?;
                add_on_subtotal = add_on_subtotal.checked_add(subtotal).ok_or_else(overflow)?;
                add_on_items.push(OrderAddOn {
                    add_on_id: add_on.add_on_id.clone(),
                    quantity: qty,
                    unit_price: quote.price,
                    subtotal,
                    note: add_on.note.clone(),
                    add_on_details: None,
                });
            }

            let subtotal = line_base.checked_add(add_on_subtotal).ok_or_else(overflow)?;
            total = total.checked_add(subtotal).ok_or_else(overflow)?;
            lines.push(OrderItem {
                menu_id: line.menu_id.clone(),
                quantity: qty,
                unit_price: menu.price,
                discount: menu.discount,
                add_on_items,
                add_on_subtotal,
                subtotal,
                note: line.note.clone(),
                menu_details: None,
            });
        }

        tracing::debug!(lines = lines.len(), total = %total, "Cart priced");
        Ok(PricedOrder { lines, total })
    }

    async fn quote(
        &self,
        cache: &mut HashMap<(ItemKind, String), PriceQuote>,
        kind: ItemKind,
        id: &str,
    ) -> Result<PriceQuote, PricingError> {
        let key = (kind, id.to_string());
        let quote = match cache.get(&key) {
            Some(quote) => *quote,
            None => {
                let quote = self
                    .catalog
                    .resolve_price(kind, id)
                    .await
                    .map_err(PricingError::from_catalog)?;
                cache.insert(key, quote);
                quote
            }
        };
        quote
            .require_available(kind, id)
            .map_err(PricingError::from_catalog)
    }
}
