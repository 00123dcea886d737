//! Text and JSON renderings of catalog state. Purely cosmetic.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    catalog::Catalog,
    ids::{User, UserId},
    item::{ItemType, LibraryItem},
    record::BorrowRecord,
};

/// Multi-line borrow summary: who, what, date range and fine rate
#[must_use]
pub fn format_record(record: &BorrowRecord, currency: &str) -> String {
    format!(
        "Borrowed by User {} -> Item {}\n   Period: {} -> {}\n   Fine Rate: {currency}{}/day",
        record.user_id(),
        record.item_id(),
        record.borrow_date(),
        record.due_date(),
        record.fine_per_day()
    )
}

/// One line of the fine summary
#[must_use]
pub fn format_fine_line(user: &User, amount: Decimal, currency: &str) -> String {
    format!("- {user}: {currency}{amount}")
}

/// Serializable copy of the whole catalog at one point in time
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    /// Every item, in identifier order
    pub items: Vec<LibraryItem>,
    /// Accumulated fine per user who has ever been fined
    pub fines: BTreeMap<UserId, Decimal>,
}

impl CatalogSnapshot {
    /// Copy the current state of `catalog`
    #[must_use]
    pub fn capture(catalog: &Catalog) -> Self {
        Self { items: catalog.items(), fines: catalog.fines() }
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns the serializer error if any value cannot be represented.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Console reports for the circulation desk
#[derive(Debug)]
pub struct CirculationReport;

impl CirculationReport {
    /// Print every item grouped by kind
    pub fn print_catalog(catalog: &Catalog) {
        println!("=== Catalog ===");
        for kind in [ItemType::Book, ItemType::Audiobook, ItemType::EMagazine] {
            let items = catalog.search_by_type(kind);
            if items.is_empty() {
                continue;
            }
            println!("\n{kind}s:");
            for item in items {
                println!("   - {item}");
                match item.current_loan() {
                    Some(loan) => println!("     due {} (User {})", loan.due_date(), loan.user_id()),
                    None => println!("     {}", item.status().get_description()),
                }
            }
        }
    }

    /// Print the accumulated fine of each user
    pub fn print_fine_summary(catalog: &Catalog, users: &[User], currency: &str) {
        println!("\nUser fines summary:");
        for user in users {
            println!("{}", format_fine_line(user, catalog.accumulated_fine(user.id), currency));
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ids::ItemId;

    #[test]
    fn test_fine_line() {
        let user = User::new(UserId(1), "Aisha");
        assert_eq!(format_fine_line(&user, dec!(30), "Rs."), "- Aisha (UserID=1): Rs.30");
        assert_eq!(format_fine_line(&user, Decimal::ZERO, "$"), "- Aisha (UserID=1): $0");
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_snapshot_json_lists_items_and_fines() {
        let catalog = Catalog::new();
        catalog
            .add_item(LibraryItem::book(ItemId(101), "Clean Code", "Robert C. Martin", 464))
            .expect("first insert succeeds");

        let json = CatalogSnapshot::capture(&catalog).to_json().expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["items"][0]["id"], 101);
        assert_eq!(value["items"][0]["kind"]["type"], "Book");
        assert!(value["fines"].as_object().is_some_and(serde_json::Map::is_empty));
    }
}
