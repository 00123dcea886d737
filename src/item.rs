use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::{LibraryError, LibraryResult},
    ids::ItemId,
    item_state::AvailabilityStatus,
    record::BorrowRecord,
};

/// Fine charged per overdue day unless an item says otherwise
pub const DEFAULT_FINE_PER_DAY: Decimal = Decimal::TEN;

/// Kind of a catalog entry, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ItemType {
    /// Printed book
    Book,
    /// Audio recording with transport controls
    Audiobook,
    /// Electronic magazine issue, can be archived
    EMagazine,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Book => "Book",
            Self::Audiobook => "Audiobook",
            Self::EMagazine => "EMagazine",
        };
        f.write_str(name)
    }
}

/// Audiobook transport control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum PlaybackAction {
    /// Start playing
    Play,
    /// Pause playback
    Pause,
    /// Stop playback
    Stop,
}

impl PlaybackAction {
    /// Operation name used in errors and events
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
        }
    }
}

/// Kind-specific payload of a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ItemKind {
    /// Printed book
    Book {
        /// Number of pages
        page_count: u32,
    },
    /// Audio recording
    Audiobook {
        /// Running time
        playback_seconds: u64,
        /// Local transport flag, unrelated to loans
        playing: bool,
    },
    /// Electronic magazine issue
    EMagazine {
        /// Issue number
        issue_number: u32,
        /// Set once by archiving, never cleared
        archived: bool,
    },
}

impl ItemKind {
    /// Kind of this payload
    #[must_use]
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Book { .. } => ItemType::Book,
            Self::Audiobook { .. } => ItemType::Audiobook,
            Self::EMagazine { .. } => ItemType::EMagazine,
        }
    }
}

/// A catalog entry.
///
/// Status is derived rather than stored: archived magazines report
/// `Archived`, anything holding a loan reports `Borrowed`, everything else is
/// `Available`. This keeps "borrowed if and only if a record is held" true by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryItem {
    /// Unique identifier
    id: ItemId,
    /// Title
    title: String,
    /// Author or editor
    author: String,
    /// Daily penalty for late returns
    fine_per_day: Decimal,
    /// Kind-specific payload
    kind: ItemKind,
    /// Active loan, if any
    current_loan: Option<BorrowRecord>,
}

impl LibraryItem {
    /// Create an available item with the default fine rate
    #[must_use]
    pub fn new(id: ItemId, title: &str, author: &str, kind: ItemKind) -> Self {
        Self {
            id,
            title: title.to_string(),
            author: author.to_string(),
            fine_per_day: DEFAULT_FINE_PER_DAY,
            kind,
            current_loan: None,
        }
    }

    /// Create an available book
    #[must_use]
    pub fn book(id: ItemId, title: &str, author: &str, page_count: u32) -> Self {
        Self::new(id, title, author, ItemKind::Book { page_count })
    }

    /// Create an available audiobook, not playing
    #[must_use]
    pub fn audiobook(
        id: ItemId,
        title: &str,
        author: &str,
        playback_seconds: u64,
    ) -> Self {
        Self::new(id, title, author, ItemKind::Audiobook { playback_seconds, playing: false })
    }

    /// Create an available, unarchived e-magazine issue
    #[must_use]
    pub fn e_magazine(id: ItemId, title: &str, author: &str, issue_number: u32) -> Self {
        Self::new(id, title, author, ItemKind::EMagazine { issue_number, archived: false })
    }

    /// Override the daily fine rate. The catalog refuses items with a negative rate.
    #[must_use]
    pub fn with_fine_per_day(mut self, fine_per_day: Decimal) -> Self {
        self.fine_per_day = fine_per_day;
        self
    }

    /// Get the item identifier
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Get the title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the author or editor
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Daily rate charged to loans started from now on
    #[must_use]
    pub fn fine_per_day(&self) -> Decimal {
        self.fine_per_day
    }

    /// Get the kind-specific payload
    #[must_use]
    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Kind of this item
    #[must_use]
    pub fn item_type(&self) -> ItemType {
        self.kind.item_type()
    }

    /// Current availability, derived from the loan and archive flag
    #[must_use]
    pub fn status(&self) -> AvailabilityStatus {
        match (&self.kind, &self.current_loan) {
            (ItemKind::EMagazine { archived: true, .. }, _) => AvailabilityStatus::Archived,
            (_, Some(_)) => AvailabilityStatus::Borrowed,
            (_, None) => AvailabilityStatus::Available,
        }
    }

    /// Whether the item can be borrowed right now
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status() == AvailabilityStatus::Available
    }

    /// The active loan, if the item is out
    #[must_use]
    pub fn current_loan(&self) -> Option<&BorrowRecord> {
        self.current_loan.as_ref()
    }

    /// Whether an audiobook is currently playing; always false for other kinds
    #[must_use]
    pub fn is_playing(&self) -> bool {
        matches!(self.kind, ItemKind::Audiobook { playing: true, .. })
    }

    /// Store the loan record. Only the catalog calls this, under the item guard.
    pub(crate) fn attach_loan(&mut self, record: BorrowRecord) {
        self.current_loan = Some(record);
    }

    /// Clear and hand back the loan record. Only the catalog calls this, under the item guard.
    pub(crate) fn detach_loan(&mut self) -> Option<BorrowRecord> {
        self.current_loan.take()
    }

    /// Archive an e-magazine issue for good.
    ///
    /// Returns `true` if this call archived the issue and `false` if it was
    /// already archived.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UnsupportedOperation` for anything but an e-magazine.
    pub fn archive(&mut self) -> LibraryResult<bool> {
        let id = self.id;
        match &mut self.kind {
            ItemKind::EMagazine { archived, .. } => {
                let changed = !*archived;
                *archived = true;
                Ok(changed)
            }
            other => Err(LibraryError::UnsupportedOperation {
                id,
                kind: other.item_type(),
                operation: "archive",
            }),
        }
    }

    /// Apply a transport control to an audiobook. Loans are not affected.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UnsupportedOperation` for anything but an audiobook.
    pub fn playback(&mut self, action: PlaybackAction) -> LibraryResult<()> {
        let id = self.id;
        match &mut self.kind {
            ItemKind::Audiobook { playing, .. } => {
                *playing = action == PlaybackAction::Play;
                Ok(())
            }
            other => Err(LibraryError::UnsupportedOperation {
                id,
                kind: other.item_type(),
                operation: action.name(),
            }),
        }
    }

    /// Start audiobook playback
    ///
    /// # Errors
    ///
    /// See [`Self::playback`].
    pub fn play(&mut self) -> LibraryResult<()> {
        self.playback(PlaybackAction::Play)
    }

    /// Pause audiobook playback
    ///
    /// # Errors
    ///
    /// See [`Self::playback`].
    pub fn pause(&mut self) -> LibraryResult<()> {
        self.playback(PlaybackAction::Pause)
    }

    /// Stop audiobook playback
    ///
    /// # Errors
    ///
    /// See [`Self::playback`].
    pub fn stop(&mut self) -> LibraryResult<()> {
        self.playback(PlaybackAction::Stop)
    }
}

impl fmt::Display for LibraryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: \"{}\" by {} (ID: {}) - Status: {}",
            self.item_type(),
            self.title,
            self.author,
            self.id,
            self.status()
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ids::UserId;

    #[allow(clippy::expect_used)]
    fn loan_for(item: &LibraryItem) -> BorrowRecord {
        let start = NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date");
        BorrowRecord::new(UserId(1), item.id(), start, 7, item.fine_per_day()).expect("fits")
    }

    #[test]
    fn test_new_item_is_available() {
        let item = LibraryItem::book(ItemId(101), "Clean Code", "Robert C. Martin", 464);
        assert_eq!(item.status(), AvailabilityStatus::Available);
        assert!(item.current_loan().is_none());
        assert_eq!(item.fine_per_day(), dec!(10));
    }

    #[test]
    fn test_attach_and_detach_loan() {
        let mut item = LibraryItem::book(ItemId(101), "Clean Code", "Robert C. Martin", 464);
        let record = loan_for(&item);

        item.attach_loan(record.clone());
        assert_eq!(item.status(), AvailabilityStatus::Borrowed);
        assert_eq!(item.current_loan(), Some(&record));

        assert_eq!(item.detach_loan(), Some(record));
        assert_eq!(item.status(), AvailabilityStatus::Available);
        assert_eq!(item.detach_loan(), None);
    }

    #[test]
    fn test_archive_is_one_way_and_idempotent() {
        let mut magazine = LibraryItem::e_magazine(ItemId(303), "Tech Monthly", "Editor Team", 42);
        assert_eq!(magazine.archive(), Ok(true));
        assert_eq!(magazine.status(), AvailabilityStatus::Archived);
        assert_eq!(magazine.archive(), Ok(false));
        assert_eq!(magazine.status(), AvailabilityStatus::Archived);
    }

    #[test]
    fn test_archive_overrides_borrowed_status() {
        let mut magazine = LibraryItem::e_magazine(ItemId(303), "Tech Monthly", "Editor Team", 42);
        let record = loan_for(&magazine);
        magazine.attach_loan(record);
        assert_eq!(magazine.archive(), Ok(true));
        assert_eq!(magazine.status(), AvailabilityStatus::Archived);

        assert!(magazine.detach_loan().is_some());
        assert_eq!(magazine.status(), AvailabilityStatus::Archived);
    }

    #[test]
    fn test_archive_rejected_for_books() {
        let mut book = LibraryItem::book(ItemId(101), "Clean Code", "Robert C. Martin", 464);
        assert_eq!(
            book.archive(),
            Err(LibraryError::UnsupportedOperation {
                id: ItemId(101),
                kind: ItemType::Book,
                operation: "archive",
            })
        );
    }

    #[test]
    fn test_transport_controls_only_touch_playing_flag() {
        let mut audio = LibraryItem::audiobook(ItemId(202), "Effective Java (Audio)", "Joshua Bloch", 3600);
        assert!(!audio.is_playing());
        assert_eq!(audio.play(), Ok(()));
        assert!(audio.is_playing());
        assert_eq!(audio.status(), AvailabilityStatus::Available);
        assert_eq!(audio.pause(), Ok(()));
        assert!(!audio.is_playing());
        assert_eq!(audio.play(), Ok(()));
        assert_eq!(audio.stop(), Ok(()));
        assert!(!audio.is_playing());
    }

    #[test]
    fn test_transport_controls_rejected_for_magazines() {
        let mut magazine = LibraryItem::e_magazine(ItemId(303), "Tech Monthly", "Editor Team", 42);
        assert!(matches!(
            magazine.play(),
            Err(LibraryError::UnsupportedOperation { operation: "play", .. })
        ));
    }

    #[test]
    fn test_display_line() {
        let magazine = LibraryItem::e_magazine(ItemId(303), "Tech Monthly", "Editor Team", 42);
        assert_eq!(
            magazine.to_string(),
            "EMagazine: \"Tech Monthly\" by Editor Team (ID: 303) - Status: AVAILABLE"
        );
    }
}
