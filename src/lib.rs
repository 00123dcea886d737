//! In-memory library circulation desk.
//!
//! This crate models a small lending library: books, audiobooks and
//! e-magazines can be borrowed, returned and fined for lateness. The
//! [`Catalog`] is the only stateful component; it guards each item
//! separately so that an item never has more than one active loan, and it
//! keeps a running fine total per user.

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod item;
pub mod item_state;
pub mod observers;
pub mod parsers;
pub mod record;
pub mod report;

pub use catalog::Catalog;
pub use config::DeskConfig;
pub use error::{ConfigError, LibraryError, LibraryResult};
pub use events::CirculationEvent;
pub use ids::{ItemId, User, UserId};
pub use item::{ItemKind, ItemType, LibraryItem, PlaybackAction};
pub use item_state::AvailabilityStatus;
pub use observers::{CirculationObserver, TracingObserver};
pub use parsers::{parse_duration_days, parse_id};
pub use record::{BorrowRecord, ReturnReceipt};
pub use report::{CatalogSnapshot, CirculationReport};
