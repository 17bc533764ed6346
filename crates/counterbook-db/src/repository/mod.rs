//! # Repository Module
//!
//! Database repository implementations for Counterbook.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Admin command                                                          │
//! │       │                                                                 │
//! │       │  db.items().search("lap", 20)                                   │
//! │       ▼                                                                 │
//! │  ItemRepository / UnitConversionRepository / SaleRepository             │
//! │       │                                                                 │
//! │       │  SQL query → private *Row struct (FromRow) → core type           │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ItemRepository`](item::ItemRepository) - Item master CRUD and lookup
//! - [`UnitConversionRepository`](unit_conversion::UnitConversionRepository) -
//!   Per-item unit conversions
//! - [`SaleRepository`](sale::SaleRepository) - Counter sales and dashboard
//!   aggregates

pub mod item;
pub mod sale;
pub mod unit_conversion;

/// Escapes `%`, `_` and `\` so user input matches literally inside a LIKE
/// pattern using `ESCAPE '\'`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("lap"), "%lap%");
        assert_eq!(like_pattern("ITEM_1"), "%ITEM\\_1%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
    }
}
