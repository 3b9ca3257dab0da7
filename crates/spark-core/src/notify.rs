//! In-process change notifications.
//!
//! The data access layer publishes one [`ChangeEvent`] per successful mutation.
//! Subscribers register a callback for a single table; the event only says
//! that something changed, so callbacks are expected to re-fetch.

use std::fmt;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Areas,
    Projects,
    Tasks,
    Subtasks,
    RecurringRules,
    TimeBlocks,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Areas => "areas",
            Table::Projects => "projects",
            Table::Tasks => "tasks",
            Table::Subtasks => "subtasks",
            Table::RecurringRules => "recurring_rules",
            Table::TimeBlocks => "time_blocks",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
}

/// Fan-out of change events to per-table subscribers.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn publish(&self, table: Table, kind: ChangeKind) {
        let _ = self.sender.send(ChangeEvent { table, kind });
    }

    /// Runs `callback` for every change to `table` until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<F>(&self, table: Table, callback: F) -> Subscription
    where
        F: Fn(ChangeEvent) + Send + 'static,
    {
        let mut receiver = self.sender.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.table == table => callback(event),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(%table, skipped, "change subscriber lagged");
                        callback(ChangeEvent {
                            table,
                            kind: ChangeKind::Update,
                        });
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Subscription { handle }
    }
}

/// Handle to a running subscription. Dropping it stops delivery.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        self.handle.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_callback_receives_only_its_table() {
        let notifier = ChangeNotifier::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = notifier.subscribe(Table::Tasks, move |event| {
            let _ = tx.send(event);
        });
        tokio::task::yield_now().await;

        notifier.publish(Table::Projects, ChangeKind::Insert);
        notifier.publish(Table::Tasks, ChangeKind::Delete);

        let event = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(
            event,
            ChangeEvent {
                table: Table::Tasks,
                kind: ChangeKind::Delete
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let notifier = ChangeNotifier::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = notifier.subscribe(Table::Areas, move |event| {
            let _ = tx.send(event);
        });
        subscription.unsubscribe();
        tokio::task::yield_now().await;

        notifier.publish(Table::Areas, ChangeKind::Update);
        let received = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(matches!(received, Ok(None)) || received.is_err());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let notifier = ChangeNotifier::new(4);
        notifier.publish(Table::TimeBlocks, ChangeKind::Insert);
    }
}
