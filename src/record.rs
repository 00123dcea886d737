use std::fmt;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    config::DEFAULT_CURRENCY,
    error::{LibraryError, LibraryResult},
    ids::{ItemId, UserId},
    report,
};

/// Immutable snapshot of one loan.
///
/// The fine rate is captured when the loan starts, so a later change to the
/// item's rate never affects an open loan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BorrowRecord {
    /// Borrowing patron
    user_id: UserId,
    /// Borrowed item
    item_id: ItemId,
    /// First day of the loan
    borrow_date: NaiveDate,
    /// Last day the item can be returned without a fine
    due_date: NaiveDate,
    /// Daily penalty in effect for this loan
    fine_per_day: Decimal,
}

impl BorrowRecord {
    /// Start a loan of `loan_days` days on `borrow_date`
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::DateOutOfRange` if the due date cannot be represented.
    pub fn new(
        user_id: UserId,
        item_id: ItemId,
        borrow_date: NaiveDate,
        loan_days: u64,
        fine_per_day: Decimal,
    ) -> LibraryResult<Self> {
        let due_date = borrow_date
            .checked_add_days(Days::new(loan_days))
            .ok_or(LibraryError::DateOutOfRange { start: borrow_date, days: loan_days })?;

        Ok(Self { user_id, item_id, borrow_date, due_date, fine_per_day })
    }

    /// Get the borrowing patron
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Get the borrowed item
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// First day of the loan
    #[must_use]
    pub fn borrow_date(&self) -> NaiveDate {
        self.borrow_date
    }

    /// Last day the item can come back without a fine
    #[must_use]
    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Daily rate captured at borrow time
    #[must_use]
    pub fn fine_per_day(&self) -> Decimal {
        self.fine_per_day
    }

    /// Whole days between the due date and `returned_on`; zero or negative when on time
    #[must_use]
    pub fn days_past_due(&self, returned_on: NaiveDate) -> i64 {
        returned_on.signed_duration_since(self.due_date).num_days()
    }

    /// Settle this loan as of `returned_on`
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::FineOverflow` if the fine does not fit in a `Decimal`.
    pub fn settle(&self, returned_on: NaiveDate) -> LibraryResult<ReturnReceipt> {
        let overdue_days = u64::try_from(self.days_past_due(returned_on)).unwrap_or(0);

        let fine = if overdue_days == 0 {
            Decimal::ZERO
        } else {
            self.fine_per_day
                .checked_mul(Decimal::from(overdue_days))
                .ok_or(LibraryError::FineOverflow(self.item_id))?
        };

        Ok(ReturnReceipt { record: self.clone(), returned_on, overdue_days, fine })
    }
}

impl fmt::Display for BorrowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&report::format_record(self, DEFAULT_CURRENCY))
    }
}

/// Outcome of a successful return
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnReceipt {
    /// The loan that was closed
    pub record: BorrowRecord,
    /// Date the item came back
    pub returned_on: NaiveDate,
    /// Days past the due date, zero when on time
    pub overdue_days: u64,
    /// Fine charged for this return, zero when on time
    pub fine: Decimal,
}

impl ReturnReceipt {
    /// Whether the item came back after its due date
    #[must_use]
    pub fn is_late(&self) -> bool {
        self.overdue_days > 0
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[allow(clippy::expect_used)]
    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[allow(clippy::expect_used)]
    fn fourteen_day_loan() -> BorrowRecord {
        BorrowRecord::new(UserId(1), ItemId(101), date(2025, 3, 1), 14, dec!(10))
            .expect("loan fits in the calendar")
    }

    #[test]
    fn test_due_date_adds_loan_days() {
        let record = fourteen_day_loan();
        assert_eq!(record.due_date(), date(2025, 3, 15));
        assert_eq!(record.borrow_date(), date(2025, 3, 1));
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_settle_late_return() {
        let record = fourteen_day_loan();
        let receipt = record.settle(date(2025, 3, 18)).expect("settles");
        assert_eq!(receipt.overdue_days, 3);
        assert_eq!(receipt.fine, dec!(30));
        assert!(receipt.is_late());
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_settle_on_or_before_due_date() {
        let record = fourteen_day_loan();
        for returned_on in [date(2025, 3, 15), date(2025, 3, 2)] {
            let receipt = record.settle(returned_on).expect("settles");
            assert_eq!(receipt.overdue_days, 0);
            assert_eq!(receipt.fine, Decimal::ZERO);
            assert!(!receipt.is_late());
        }
        assert_eq!(record.days_past_due(date(2025, 3, 2)), -13);
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_fractional_rate_stays_exact() {
        let record = BorrowRecord::new(UserId(2), ItemId(7), date(2025, 1, 1), 7, dec!(0.10))
            .expect("loan fits");
        let receipt = record.settle(date(2025, 1, 11)).expect("settles");
        assert_eq!(receipt.fine, dec!(0.30));
    }

    #[test]
    fn test_due_date_out_of_range() {
        let result = BorrowRecord::new(UserId(1), ItemId(1), date(2025, 1, 1), u64::MAX, dec!(1));
        assert!(matches!(result, Err(LibraryError::DateOutOfRange { days: u64::MAX, .. })));
    }

    #[test]
    fn test_display_matches_borrow_summary() {
        let record = fourteen_day_loan();
        assert_eq!(
            record.to_string(),
            "Borrowed by User 1 -> Item 101\n   Period: 2025-03-01 -> 2025-03-15\n   Fine Rate: Rs.10/day"
        );
    }
}
