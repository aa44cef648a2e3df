//! Catalog Lookup
//!
//! Resolves a menu or add-on identifier to its current price, discount and
//! availability. Read-only; the pricer is the only consumer.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::repository::{AddOnRepository, MenuRepository, RepoError};
use crate::store::StoreHandle;

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Menu,
    AddOn,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Menu => f.write_str("menu"),
            Self::AddOn => f.write_str("add-on"),
        }
    }
}

/// Current price of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: Decimal,
    /// Always zero for add-ons
    pub discount: Decimal,
    pub available: bool,
}

impl PriceQuote {
    /// Turn an unavailable quote into [`CatalogError::Unavailable`]
    pub fn require_available(self, kind: ItemKind, id: &str) -> Result<Self, CatalogError> {
        if self.available {
            Ok(self)
        } else {
            Err(CatalogError::Unavailable {
                kind,
                id: id.to_string(),
            })
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{kind} {id} not found")]
    NotFound { kind: ItemKind, id: String },

    #[error("{kind} {id} is unavailable")]
    Unavailable { kind: ItemKind, id: String },

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { kind, ref id } => {
                let code = match kind {
                    ItemKind::Menu => ErrorCode::MenuNotFound,
                    ItemKind::AddOn => ErrorCode::AddOnNotFound,
                };
                let id = id.clone();
                AppError::with_message(code, err.to_string()).with_detail("id", id)
            }
            CatalogError::Unavailable { kind, ref id } => {
                let code = match kind {
                    ItemKind::Menu => ErrorCode::MenuUnavailable,
                    ItemKind::AddOn => ErrorCode::AddOnUnavailable,
                };
                let id = id.clone();
                AppError::with_message(code, err.to_string()).with_detail("id", id)
            }
            CatalogError::Repo(e) => e.into(),
        }
    }
}

#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Current price/discount/availability of `id`
    ///
    /// Unavailable entries are returned with `available == false`; the
    /// caller decides what to do with them.
    async fn resolve_price(&self, kind: ItemKind, id: &str) -> Result<PriceQuote, CatalogError>;
}

/// Catalog backed by the menu and add-on repositories
#[derive(Debug, Clone)]
pub struct StoreCatalog {
    menus: MenuRepository,
    add_ons: AddOnRepository,
}

impl StoreCatalog {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            menus: MenuRepository::new(store.clone()),
            add_ons: AddOnRepository::new(store),
        }
    }
}

#[async_trait]
impl CatalogLookup for StoreCatalog {
    async fn resolve_price(&self, kind: ItemKind, id: &str) -> Result<PriceQuote, CatalogError> {
        let not_found = || CatalogError::NotFound {
            kind,
            id: id.to_string(),
        };
        match kind {
            ItemKind::Menu => {
                let menu = self.menus.find_by_id(id).await?.ok_or_else(not_found)?;
                Ok(PriceQuote {
                    price: menu.price,
                    discount: menu.discount,
                    available: menu.is_available,
                })
            }
            ItemKind::AddOn => {
                let add_on = self.add_ons.find_by_id(id).await?.ok_or_else(not_found)?;
                Ok(PriceQuote {
                    price: add_on.price,
                    discount: Decimal::ZERO,
                    available: add_on.is_available,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded() -> StoreCatalog {
        let store = StoreHandle::memory();
        store
            .insert(
                "menus",
                json!({
                    "id": "M1", "branch_id": "b1", "category_id": "c1", "title": "Mohinga",
                    "price": "10.00", "discount": "1.00", "is_available": true,
                    "images": [], "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
                })
                .as_object()
                .cloned()
                .unwrap(),
            )
            .await
            .unwrap();
        store
            .insert(
                "add_ons",
                json!({
                    "id": "A1", "title": "Egg", "price": "2.00", "is_available": false,
                    "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
                })
                .as_object()
                .cloned()
                .unwrap(),
            )
            .await
            .unwrap();
        StoreCatalog::new(store)
    }

    #[tokio::test]
    async fn test_resolve_menu_price() {
        let catalog = seeded().await;
        let quote = catalog.resolve_price(ItemKind::Menu, "M1").await.unwrap();
        assert_eq!(quote.price, Decimal::new(1000, 2));
        assert_eq!(quote.discount, Decimal::new(100, 2));
        assert!(quote.available);
    }

    #[tokio::test]
    async fn test_lookup_is_idempotent() {
        let catalog = seeded().await;
        let first = catalog.resolve_price(ItemKind::Menu, "M1").await.unwrap();
        let second = catalog.resolve_price(ItemKind::Menu, "M1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unavailable_is_surfaced() {
        let catalog = seeded().await;
        let quote = catalog.resolve_price(ItemKind::AddOn, "A1").await.unwrap();
        assert!(!quote.available);
        assert_eq!(quote.discount, Decimal::ZERO);
        assert!(matches!(
            quote.require_available(ItemKind::AddOn, "A1"),
            Err(CatalogError::Unavailable { kind: ItemKind::AddOn, .. })
        ));
    }

    #[tokio::test]
    async fn test_not_found() {
        let catalog = seeded().await;
        let err = catalog.resolve_price(ItemKind::Menu, "nope").await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { kind: ItemKind::Menu, .. }));
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::MenuNotFound);
    }
}
