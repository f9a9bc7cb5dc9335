//! 服务器状态 - 所有账本组件的共享句柄
//!
//! `ServerState` 是 Clone 的 (内部全是 Arc)，作为 axum 的 State 传给每个 handler。

use crate::checkout::CheckoutOrchestrator;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerError};
use crate::floor::FloorStatusProjector;
use crate::inventory::InventoryLedger;
use crate::orders::OrderLedger;
use crate::sales::SessionSalesAggregator;
use crate::services::{
    CategoryCatalog, LogPrinter, ReceiptPrintWorker, ReceiptPrinter, ReceiptReceiver, StaticCatalog,
    receipt_queue,
};
use crate::storage::LedgerStorage;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub storage: LedgerStorage,
    pub catalog: Arc<dyn CategoryCatalog>,
    pub inventory: Arc<InventoryLedger>,
    pub orders: Arc<OrderLedger>,
    pub checkout: Arc<CheckoutOrchestrator>,
    pub floor: Arc<FloorStatusProjector>,
    pub sales: Arc<SessionSalesAggregator>,
    printer: Arc<dyn ReceiptPrinter>,
    /// 小票队列的接收端，启动打印 worker 时取走
    receipt_rx: Arc<Mutex<Option<ReceiptReceiver>>>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 打开 WORK_DIR 下的数据库并组装所有组件
    ///
    /// 数据库打不开时返回错误，调用方应当终止进程。
    pub fn initialize(config: &Config) -> Result<Self> {
        if config.event_channel_capacity == 0 {
            return Err(ServerError::Config(
                "EVENT_CHANNEL_CAPACITY must be positive".into(),
            ));
        }

        std::fs::create_dir_all(&config.work_dir)?;
        let db_path = config.db_path();
        let storage = LedgerStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Ledger storage opened");

        Ok(Self::from_storage(config.clone(), storage, Arc::new(LogPrinter)))
    }

    /// 用现成的存储组装 (测试用内存库)
    pub fn from_storage(
        config: Config,
        storage: LedgerStorage,
        printer: Arc<dyn ReceiptPrinter>,
    ) -> Self {
        let catalog: Arc<dyn CategoryCatalog> =
            Arc::new(StaticCatalog::new(config.known_categories.clone()));
        let inventory = Arc::new(
            InventoryLedger::new(storage.clone(), catalog.clone())
                .with_low_stock_threshold(config.low_stock_threshold),
        );
        let orders = Arc::new(OrderLedger::with_capacity(
            storage.clone(),
            inventory.clone(),
            config.event_channel_capacity,
        ));
        let (receipt_tx, receipt_rx) = receipt_queue();
        let checkout = Arc::new(CheckoutOrchestrator::new(orders.clone(), receipt_tx));
        let floor = Arc::new(FloorStatusProjector::new(
            storage.clone(),
            config.event_channel_capacity,
        ));
        let sales = Arc::new(SessionSalesAggregator::new(storage.clone()));

        Self {
            config,
            storage,
            catalog,
            inventory,
            orders,
            checkout,
            floor,
            sales,
            printer,
            receipt_rx: Arc::new(Mutex::new(Some(receipt_rx))),
        }
    }

    /// 启动后台任务
    ///
    /// 先订阅订单事件再从存储重建楼面投影，这样重建期间提交的变更不会丢。
    /// 小票打印 worker 只能启动一次 (接收端被取走)。
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let events = self.orders.subscribe();
        if let Err(e) = self.floor.rebuild() {
            tracing::error!(error = %e, "Initial floor projection failed; starting empty");
        }
        let shutdown = tasks.shutdown_token();
        tasks.spawn(
            "floor_projector",
            TaskKind::Listener,
            self.floor.clone().run(events, shutdown),
        );

        match self.receipt_rx.lock().take() {
            Some(receipts) => {
                let worker = ReceiptPrintWorker::new(self.printer.clone());
                let shutdown = tasks.shutdown_token();
                tasks.spawn(
                    "receipt_printer",
                    TaskKind::Worker,
                    worker.run(receipts, shutdown),
                );
            }
            None => tracing::warn!("Receipt print worker already started"),
        }

        tracing::info!("Background tasks registered: {}", tasks.len());
        tasks
    }
}
