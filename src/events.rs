use serde::Serialize;

use crate::{
    ids::ItemId,
    item::PlaybackAction,
    record::{BorrowRecord, ReturnReceipt},
};

/// Things that happened at the circulation desk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CirculationEvent {
    /// A loan was opened
    Borrowed(BorrowRecord),
    /// A loan was closed, possibly with a fine
    Returned(ReturnReceipt),
    /// An e-magazine issue was archived for the first time
    Archived {
        /// Archived item
        item_id: ItemId,
        /// Title of the issue
        title: String,
        /// Issue number
        issue_number: u32,
    },
    /// An audiobook transport control was used
    Playback {
        /// Audiobook
        item_id: ItemId,
        /// Title of the audiobook
        title: String,
        /// Control that was applied
        action: PlaybackAction,
    },
}

impl CirculationEvent {
    /// Item the event is about
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        match self {
            Self::Borrowed(record) => record.item_id(),
            Self::Returned(receipt) => receipt.record.item_id(),
            Self::Archived { item_id, .. } | Self::Playback { item_id, .. } => *item_id,
        }
    }
}
