//! Floor Status Projector
//!
//! In-memory view of occupied tables, kept current from the order ledger's
//! event stream. Readers never touch storage.
//!
//! - Seeded from storage at startup ([`FloorStatusProjector::rebuild`])
//! - Each [`OrderEvent`] upserts or clears one table
//! - When the event channel lags, the projection is rebuilt from storage
//!   and subscribers get [`FloorEvent::Resynced`]

use crate::storage::{LedgerStorage, with_read_retry};
use crate::utils::LedgerResult;
use parking_lot::RwLock;
use shared::models::{FloorEvent, OrderEvent, TableStatus};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Projected table plus the order version it was built from
#[derive(Debug, Clone)]
struct Projected {
    version: u64,
    status: TableStatus,
}

pub struct FloorStatusProjector {
    storage: LedgerStorage,
    tables: RwLock<BTreeMap<String, Projected>>,
    floor_tx: broadcast::Sender<FloorEvent>,
}

impl std::fmt::Debug for FloorStatusProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloorStatusProjector")
            .field("tables", &self.tables.read().len())
            .finish()
    }
}

impl FloorStatusProjector {
    pub fn new(storage: LedgerStorage, capacity: usize) -> Self {
        let (floor_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            storage,
            tables: RwLock::new(BTreeMap::new()),
            floor_tx,
        }
    }

    /// Current occupied tables, ordered by table identifier
    pub fn get_floor_status(&self) -> Vec<TableStatus> {
        self.tables
            .read()
            .values()
            .map(|p| p.status.clone())
            .collect()
    }

    /// Status of one table, if occupied
    pub fn table_status(&self, table_identifier: &str) -> Option<TableStatus> {
        self.tables
            .read()
            .get(table_identifier)
            .map(|p| p.status.clone())
    }

    /// Receive projection changes
    pub fn subscribe(&self) -> broadcast::Receiver<FloorEvent> {
        self.floor_tx.subscribe()
    }

    /// Replace the projection with the open orders in storage
    pub fn rebuild(&self) -> LedgerResult<usize> {
        let open = with_read_retry("floor_rebuild", || self.storage.list_open_orders())?;

        let fresh: BTreeMap<String, Projected> = open
            .iter()
            .map(|order| {
                (
                    order.table_identifier.clone(),
                    Projected {
                        version: order.version,
                        status: TableStatus::from(order),
                    },
                )
            })
            .collect();
        let count = fresh.len();
        *self.tables.write() = fresh;

        let _ = self.floor_tx.send(FloorEvent::Resynced);
        tracing::info!(tables = count, "Floor projection rebuilt");
        Ok(count)
    }

    /// Fold one order event into the projection
    pub fn apply(&self, event: &OrderEvent) {
        let order = &event.order;
        let floor_event = {
            let mut tables = self.tables.write();
            if event.occupies_table() {
                if let Some(existing) = tables.get(&order.table_identifier)
                    && existing.status.order_id == order.id
                    && existing.version > order.version
                {
                    // stale replay after a rebuild
                    return;
                }
                let status = TableStatus::from(order);
                tables.insert(
                    order.table_identifier.clone(),
                    Projected {
                        version: order.version,
                        status: status.clone(),
                    },
                );
                FloorEvent::Upserted(status)
            } else {
                match tables.get(&order.table_identifier) {
                    Some(existing) if existing.status.order_id == order.id => {
                        tables.remove(&order.table_identifier);
                    }
                    // table already holds a newer tab (or nothing)
                    _ => return,
                }
                FloorEvent::Cleared {
                    table_identifier: order.table_identifier.clone(),
                    order_id: order.id.clone(),
                }
            }
        };

        let _ = self.floor_tx.send(floor_event);
    }

    /// Follow the order event stream until shutdown
    pub async fn run(
        self: Arc<Self>,
        mut events: broadcast::Receiver<OrderEvent>,
        shutdown: CancellationToken,
    ) {
        tracing::info!("Floor projector started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = events.recv() => match received {
                    Ok(event) => self.apply(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Floor projector lagged, rebuilding");
                        if let Err(e) = self.rebuild() {
                            tracing::error!(error = %e, "Floor rebuild failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        tracing::info!("Floor projector stopped");
    }
}
