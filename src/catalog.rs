use std::{
    collections::{BTreeMap, HashMap, btree_map::Entry},
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    error::{LibraryError, LibraryResult},
    events::CirculationEvent,
    ids::{ItemId, User, UserId},
    item::{ItemKind, ItemType, LibraryItem, PlaybackAction},
    observers::CirculationObserver,
    parsers::parse_duration_days,
    record::{BorrowRecord, ReturnReceipt},
};

/// Shared handle to one catalog entry; the mutex is the per-item guard
type ItemSlot = Arc<Mutex<LibraryItem>>;

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// No mutation in this module can panic halfway, so a poisoned guard still
/// protects consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The circulation desk: owns every item and the running fine totals.
///
/// Borrow and return on the same item are serialized by that item's guard,
/// held across the availability check and the mutation. Operations on
/// different items never wait on each other; the item map lock is only held
/// long enough to clone an item handle.
pub struct Catalog {
    /// Every item, keyed and iterated by identifier
    items: RwLock<BTreeMap<ItemId, ItemSlot>>,
    /// Accumulated fine per user; absent means zero
    fines: Mutex<HashMap<UserId, Decimal>>,
    /// Registered circulation observers
    observers: Vec<Box<dyn CirculationObserver>>,
}

// Manual implementation of Debug for Catalog
impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("items", &self.items)
            .field("fines", &self.fines)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            fines: Mutex::new(HashMap::new()),
            observers: Vec::new(),
        }
    }

    /// Register an observer to be notified of circulation events
    pub fn register_observer(&mut self, observer: Box<dyn CirculationObserver>) {
        self.observers.push(observer);
    }

    /// Add an item. Items are never removed.
    ///
    /// # Errors
    ///
    /// - `LibraryError::InvalidFineRate` if the item's daily rate is negative
    /// - `LibraryError::DuplicateItem` if the identifier is already taken
    pub fn add_item(&self, item: LibraryItem) -> LibraryResult<()> {
        // Fine totals only grow, so a negative rate never enters the catalog
        if item.fine_per_day() < Decimal::ZERO {
            tracing::warn!(item = %item.id(), rate = %item.fine_per_day(), "Rejected negative fine rate");
            return Err(LibraryError::InvalidFineRate { id: item.id(), rate: item.fine_per_day() });
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.entry(item.id()) {
            Entry::Occupied(_) => {
                tracing::warn!(item = %item.id(), "Rejected duplicate item");
                Err(LibraryError::DuplicateItem(item.id()))
            }
            Entry::Vacant(slot) => {
                tracing::debug!(item = %item.id(), kind = %item.item_type(), "Added item");
                slot.insert(Arc::new(Mutex::new(item)));
                Ok(())
            }
        }
    }

    /// Number of items in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no item has been added yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the guard for an item without holding the map lock afterwards
    fn slot(&self, id: ItemId) -> LibraryResult<ItemSlot> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items.get(&id).cloned().ok_or_else(|| {
            tracing::debug!(item = %id, "Item not found");
            LibraryError::ItemNotFound(id)
        })
    }

    /// Snapshot of one item
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::ItemNotFound` if no item has this identifier.
    pub fn get_item(&self, id: ItemId) -> LibraryResult<LibraryItem> {
        let slot = self.slot(id)?;
        let item = lock(&slot).clone();
        Ok(item)
    }

    /// Snapshot of every item, in identifier order
    #[must_use]
    pub fn items(&self) -> Vec<LibraryItem> {
        self.collect_items(|_| true)
    }

    /// Snapshot of every item of one kind, in identifier order
    #[must_use]
    pub fn search_by_type(&self, kind: ItemType) -> Vec<LibraryItem> {
        self.collect_items(|item| item.item_type() == kind)
    }

    /// Clone the items accepted by `keep`, locking each one in turn
    fn collect_items(&self, keep: impl Fn(&LibraryItem) -> bool) -> Vec<LibraryItem> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items
            .values()
            .filter_map(|slot| {
                let item = lock(slot);
                keep(&item).then(|| item.clone())
            })
            .collect()
    }

    /// Lend an item to `user` for the period in `duration`, starting on `borrowed_on`.
    ///
    /// Nothing changes unless the whole operation succeeds.
    ///
    /// # Errors
    ///
    /// - `LibraryError::ItemNotFound` if the item does not exist
    /// - `LibraryError::ItemUnavailable` if it is borrowed or archived
    /// - `LibraryError::InvalidDurationFormat` or
    ///   `LibraryError::UnsupportedDurationUnit` if `duration` does not parse
    /// - `LibraryError::DateOutOfRange` if the due date cannot be represented
    pub fn borrow_item(
        &self,
        item_id: ItemId,
        user: &User,
        duration: &str,
        borrowed_on: NaiveDate,
    ) -> LibraryResult<BorrowRecord> {
        let slot = self.slot(item_id)?;

        let record = {
            let mut item = lock(&slot);

            if !item.is_available() {
                tracing::warn!(item = %item_id, user = %user.id, status = %item.status(), "Borrow rejected");
                return Err(LibraryError::ItemUnavailable {
                    id: item_id,
                    status: item.status(),
                    display: item.to_string(),
                });
            }

            let days = parse_duration_days(duration)?;
            let record = BorrowRecord::new(user.id, item_id, borrowed_on, days, item.fine_per_day())?;
            item.attach_loan(record.clone());
            record
        };

        self.notify(&CirculationEvent::Borrowed(record.clone()));
        Ok(record)
    }

    /// Take an item back on `returned_on`, charging the borrower for every day
    /// past the due date at the rate captured when the loan started.
    ///
    /// # Errors
    ///
    /// - `LibraryError::ItemNotFound` if the item does not exist
    /// - `LibraryError::ItemNotBorrowed` if it has no active loan
    /// - `LibraryError::FineOverflow` if the fine or the user's total overflows
    pub fn return_item(&self, item_id: ItemId, returned_on: NaiveDate) -> LibraryResult<ReturnReceipt> {
        let slot = self.slot(item_id)?;

        let receipt = {
            let mut item = lock(&slot);

            let Some(record) = item.current_loan() else {
                tracing::warn!(item = %item_id, "Return rejected, no active loan");
                return Err(LibraryError::ItemNotBorrowed { id: item_id, display: item.to_string() });
            };

            let receipt = record.settle(returned_on)?;
            if receipt.is_late() {
                self.add_fine(record.user_id(), receipt.fine, item_id)?;
            }

            item.detach_loan();
            receipt
        };

        self.notify(&CirculationEvent::Returned(receipt.clone()));
        Ok(receipt)
    }

    /// Merge-add `amount` into a user's running total
    fn add_fine(&self, user_id: UserId, amount: Decimal, item_id: ItemId) -> LibraryResult<()> {
        let mut fines = lock(&self.fines);
        let total = fines.get(&user_id).copied().unwrap_or(Decimal::ZERO);
        let total = total.checked_add(amount).ok_or(LibraryError::FineOverflow(item_id))?;
        fines.insert(user_id, total);
        Ok(())
    }

    /// Archive an e-magazine issue. Returns `false` if it was already archived.
    ///
    /// # Errors
    ///
    /// - `LibraryError::ItemNotFound` if the item does not exist
    /// - `LibraryError::UnsupportedOperation` if it is not an e-magazine
    pub fn archive_item(&self, item_id: ItemId) -> LibraryResult<bool> {
        let slot = self.slot(item_id)?;

        let event = {
            let mut item = lock(&slot);
            if !item.archive()? {
                return Ok(false);
            }
            match item.kind() {
                ItemKind::EMagazine { issue_number, .. } => Some(CirculationEvent::Archived {
                    item_id,
                    title: item.title().to_string(),
                    issue_number: *issue_number,
                }),
                ItemKind::Book { .. } | ItemKind::Audiobook { .. } => None,
            }
        };

        if let Some(event) = event {
            self.notify(&event);
        }
        Ok(true)
    }

    /// Apply an audiobook transport control
    ///
    /// # Errors
    ///
    /// - `LibraryError::ItemNotFound` if the item does not exist
    /// - `LibraryError::UnsupportedOperation` if it is not an audiobook
    pub fn playback(&self, item_id: ItemId, action: PlaybackAction) -> LibraryResult<()> {
        let slot = self.slot(item_id)?;

        let title = {
            let mut item = lock(&slot);
            item.playback(action)?;
            item.title().to_string()
        };

        self.notify(&CirculationEvent::Playback { item_id, title, action });
        Ok(())
    }

    /// Running fine total for a user, zero if they were never fined
    #[must_use]
    pub fn accumulated_fine(&self, user_id: UserId) -> Decimal {
        lock(&self.fines).get(&user_id).copied().unwrap_or(Decimal::ZERO)
    }

    /// Copy of every recorded fine total
    #[must_use]
    pub fn fines(&self) -> BTreeMap<UserId, Decimal> {
        lock(&self.fines).iter().map(|(user, amount)| (*user, *amount)).collect()
    }

    /// Hand an event to every observer
    fn notify(&self, event: &CirculationEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}
