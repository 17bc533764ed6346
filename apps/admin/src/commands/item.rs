//! # Item Master Commands
//!
//! Item lookup, CRUD and per-item unit conversions.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  User types "lap" in the item picker of an invoice line                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search_items({ query: 'lap' })                                         │
//! │       │                                                                 │
//! │       ├── trim + length check (≤ 100 chars)                             │
//! │       ├── empty query ──► first N active items by code                  │
//! │       └── otherwise   ──► code/name LIKE '%lap%' (case-insensitive)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<CatalogItem>, label "ITEM001 - Laptop"                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState, SessionState};
use counterbook_core::validation::{
    validate_item_input, validate_search_query, validate_unit_conversion,
};
use counterbook_core::{CatalogItem, CoreError, ItemInput, UnitConversion};
use counterbook_db::Database;

/// Upper bound on a caller-supplied search limit.
const MAX_SEARCH_LIMIT: u32 = 100;

/// Unit conversion form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UnitConversionInput {
    pub from_unit: String,
    pub to_unit: String,
    pub conversion_factor: f64,
}

/// Searches active items by code or name.
///
/// ## Arguments
/// * `query` - Search term, empty lists active items
/// * `limit` - Maximum results (default from config, max 100)
pub async fn search_items(
    db: &DbState,
    config: &ConfigState,
    session: &SessionState,
    query: String,
    limit: Option<u32>,
) -> Result<Vec<CatalogItem>, ApiError> {
    session.require_user()?;

    let start = Instant::now();
    let query = validate_search_query(&query).map_err(CoreError::from)?;
    let limit = limit.unwrap_or(config.search_limit).clamp(1, MAX_SEARCH_LIMIT);

    debug!(query = %query, limit = %limit, "search_items command");

    let items = db.inner().items().search(&query, limit).await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = items.len(),
        query = %query,
        "search_items complete"
    );

    Ok(items)
}

pub async fn get_item(
    db: &DbState,
    session: &SessionState,
    id: String,
) -> Result<CatalogItem, ApiError> {
    session.require_user()?;
    debug!(id = %id, "get_item command");

    find_item(db.inner(), &id).await
}

/// Creates an item from the item master form.
///
/// ## Returns
/// * `Err(ApiError)` with `fieldErrors` - Form invalid
/// * `Err(ApiError)` with `fieldErrors[0].field == "code"` - Code taken
pub async fn create_item(
    db: &DbState,
    session: &SessionState,
    input: ItemInput,
) -> Result<CatalogItem, ApiError> {
    session.require_user()?;
    debug!(code = %input.code, "create_item command");

    validate_item_input(&input)?;

    let item = db.inner().items().insert(&CatalogItem::from_input(&input)).await?;
    info!(id = %item.id, code = %item.code, "Item created");
    Ok(item)
}

pub async fn update_item(
    db: &DbState,
    session: &SessionState,
    id: String,
    input: ItemInput,
) -> Result<CatalogItem, ApiError> {
    session.require_user()?;
    debug!(id = %id, code = %input.code, "update_item command");

    validate_item_input(&input)?;

    let mut item = find_item(db.inner(), &id).await?;
    item.apply_input(&input);
    db.inner().items().update(&item).await?;

    info!(id = %item.id, "Item updated");
    Ok(item)
}

/// Soft-deletes an item. Past invoices keep their snapshot of it.
pub async fn delete_item(db: &DbState, session: &SessionState, id: String) -> Result<(), ApiError> {
    session.require_user()?;
    debug!(id = %id, "delete_item command");

    db.inner().items().soft_delete(&id).await?;
    info!(id = %id, "Item deleted");
    Ok(())
}

pub async fn list_unit_conversions(
    db: &DbState,
    session: &SessionState,
    item_id: String,
) -> Result<Vec<UnitConversion>, ApiError> {
    session.require_user()?;
    debug!(item_id = %item_id, "list_unit_conversions command");

    find_item(db.inner(), &item_id).await?;
    Ok(db.inner().unit_conversions().list_for_item(&item_id).await?)
}

/// Adds a unit conversion to an item.
///
/// ## Returns
/// * `Err(ApiError)` "This unit conversion already exists" - Pair taken
pub async fn add_unit_conversion(
    db: &DbState,
    session: &SessionState,
    item_id: String,
    input: UnitConversionInput,
) -> Result<UnitConversion, ApiError> {
    session.require_user()?;
    debug!(
        item_id = %item_id,
        from = %input.from_unit,
        to = %input.to_unit,
        "add_unit_conversion command"
    );

    let db = db.inner();
    find_item(db, &item_id).await?;

    let existing = db.unit_conversions().list_for_item(&item_id).await?;
    validate_unit_conversion(
        &input.from_unit,
        &input.to_unit,
        input.conversion_factor,
        &existing,
    )?;

    let conversion = UnitConversion::new(
        &item_id,
        input.from_unit.trim(),
        input.to_unit.trim(),
        input.conversion_factor,
    );

    match db.unit_conversions().insert(&conversion).await {
        Ok(stored) => Ok(stored),
        // Lost a race with a concurrent insert of the same pair.
        Err(e) if e.is_unique_violation() => Err(CoreError::DuplicateConversion {
            from: conversion.from_unit,
            to: conversion.to_unit,
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}

pub async fn remove_unit_conversion(
    db: &DbState,
    session: &SessionState,
    item_id: String,
    id: String,
) -> Result<(), ApiError> {
    session.require_user()?;
    debug!(item_id = %item_id, id = %id, "remove_unit_conversion command");

    db.inner().unit_conversions().delete(&item_id, &id).await?;
    Ok(())
}

/// Active item by id, or `ITEM NOT FOUND`.
pub(crate) async fn find_item(db: &Database, id: &str) -> Result<CatalogItem, ApiError> {
    db.items()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::ItemNotFound(id.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{laptop_input, signed_in};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_create_search_update_delete() {
        let app = signed_in().await;

        let laptop = create_item(&app.db, &app.session, laptop_input()).await.unwrap();
        create_item(
            &app.db,
            &app.session,
            ItemInput {
                code: "ITEM002".to_string(),
                name: "Mouse".to_string(),
                price: 500.0,
                ..ItemInput::default()
            },
        )
        .await
        .unwrap();

        let found = search_items(&app.db, &app.config, &app.session, "  LAP ".into(), None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].label(), "ITEM001 - Laptop");

        let all = search_items(&app.db, &app.config, &app.session, String::new(), Some(1))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);

        let updated = update_item(
            &app.db,
            &app.session,
            laptop.id.clone(),
            ItemInput {
                price: 48000.0,
                ..laptop_input()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, 48000.0);
        let stored = get_item(&app.db, &app.session, laptop.id.clone()).await.unwrap();
        assert_eq!(stored.price, 48000.0);
        assert_eq!(stored.updated_at, updated.updated_at);

        delete_item(&app.db, &app.session, laptop.id.clone()).await.unwrap();
        let err = get_item(&app.db, &app.session, laptop.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_form() {
        let app = signed_in().await;

        let err = create_item(
            &app.db,
            &app.session,
            ItemInput {
                code: String::new(),
                name: "Nameless".to_string(),
                price: -1.0,
                cgst: 120.0,
                ..ItemInput::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        let fields: Vec<String> = err
            .field_errors
            .unwrap()
            .into_iter()
            .map(|f| f.field)
            .collect();
        assert!(fields.contains(&"code".to_string()));
        assert!(fields.contains(&"price".to_string()));
        assert!(fields.contains(&"cgst".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let app = signed_in().await;
        create_item(&app.db, &app.session, laptop_input()).await.unwrap();

        let err = create_item(&app.db, &app.session, laptop_input()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field_errors.unwrap()[0].field, "code");
    }

    #[tokio::test]
    async fn test_unit_conversions() {
        let app = signed_in().await;
        let item = create_item(&app.db, &app.session, laptop_input()).await.unwrap();

        let input = UnitConversionInput {
            from_unit: "BOX".to_string(),
            to_unit: "PCS".to_string(),
            conversion_factor: 12.0,
        };
        let added = add_unit_conversion(&app.db, &app.session, item.id.clone(), input.clone())
            .await
            .unwrap();
        assert_eq!(added.convert(2.0), 24.0);

        let err = add_unit_conversion(&app.db, &app.session, item.id.clone(), input)
            .await
            .unwrap_err();
        assert_eq!(err.message, "This unit conversion already exists");

        let same = add_unit_conversion(
            &app.db,
            &app.session,
            item.id.clone(),
            UnitConversionInput {
                from_unit: "PCS".to_string(),
                to_unit: "PCS".to_string(),
                conversion_factor: 1.0,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            same.field_errors.unwrap()[0].message,
            "From Unit and To Unit cannot be the same"
        );

        let listed = list_unit_conversions(&app.db, &app.session, item.id.clone())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        remove_unit_conversion(&app.db, &app.session, item.id.clone(), added.id)
            .await
            .unwrap();
        assert!(list_unit_conversions(&app.db, &app.session, item.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_commands_require_session() {
        let app = signed_in().await;
        crate::commands::session::sign_out(&app.session);

        let err = search_items(&app.db, &app.config, &app.session, "lap".into(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}
