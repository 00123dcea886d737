use crate::events::CirculationEvent;

/// Trait for circulation event observation.
///
/// Observers are called after the item guard is released, so they may read
/// the catalog again. Events from one thread arrive in the order that thread
/// made its changes. Across threads there is no ordering guarantee: the
/// `Returned` event of a loan may reach an observer before its `Borrowed`
/// event.
pub trait CirculationObserver: Send + Sync {
    /// Called once per successful state change
    fn on_event(&self, event: &CirculationEvent);
}

/// Logs every circulation event through `tracing`
#[derive(Debug, Default)]
pub struct TracingObserver;

impl CirculationObserver for TracingObserver {
    fn on_event(&self, event: &CirculationEvent) {
        match event {
            CirculationEvent::Borrowed(record) => {
                tracing::info!(
                    user = %record.user_id(),
                    item = %record.item_id(),
                    due = %record.due_date(),
                    "User {} borrowed Item {} until {}",
                    record.user_id(),
                    record.item_id(),
                    record.due_date()
                );
            }
            CirculationEvent::Returned(receipt) if receipt.is_late() => {
                tracing::info!(
                    user = %receipt.record.user_id(),
                    item = %receipt.record.item_id(),
                    overdue_days = receipt.overdue_days,
                    fine = %receipt.fine,
                    "User {} returned Item {} late by {} days -> Fine: {}",
                    receipt.record.user_id(),
                    receipt.record.item_id(),
                    receipt.overdue_days,
                    receipt.fine
                );
            }
            CirculationEvent::Returned(receipt) => {
                tracing::info!(
                    user = %receipt.record.user_id(),
                    item = %receipt.record.item_id(),
                    "User {} returned Item {} on time. No fine.",
                    receipt.record.user_id(),
                    receipt.record.item_id()
                );
            }
            CirculationEvent::Archived { item_id, title, issue_number } => {
                tracing::info!(
                    item = %item_id,
                    "Archived e-magazine issue: {issue_number} (\"{title}\")"
                );
            }
            CirculationEvent::Playback { item_id, title, action } => {
                tracing::debug!(item = %item_id, action = action.name(), "Audiobook \"{title}\"");
            }
        }
    }
}
