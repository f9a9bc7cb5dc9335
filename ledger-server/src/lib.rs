//! Bar Ledger Server - 酒吧 POS 的订单与库存账本
//!
//! # 架构概述
//!
//! - **库存账本** (`inventory`): 商品库存与只追加的库存流水
//! - **订单账本** (`orders`): 每桌一张未结订单，加菜/退菜与库存同事务
//! - **结账** (`checkout`): 现金结账、释放桌台、打印小票
//! - **楼面状态** (`floor`): 由订单事件驱动的内存投影
//! - **当班销售** (`sales`): 操作员本班次已结订单汇总
//! - **HTTP API** (`api`): axum 路由
//!
//! # 模块结构
//!
//! ```text
//! ledger-server/src/
//! ├── core/          # 配置、状态、后台任务、错误
//! ├── storage/       # redb 持久化
//! ├── inventory/     # 库存账本
//! ├── orders/        # 订单账本、金额计算
//! ├── checkout/      # 结账
//! ├── floor/         # 楼面投影
//! ├── sales/         # 当班销售
//! ├── services/      # 分类、打印、HTTP 组装
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod checkout;
pub mod core;
pub mod floor;
pub mod inventory;
pub mod orders;
pub mod sales;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export 公共类型
pub use checkout::CheckoutOrchestrator;
pub use core::{Config, Server, ServerState};
pub use floor::FloorStatusProjector;
pub use inventory::InventoryLedger;
pub use orders::OrderLedger;
pub use sales::SessionSalesAggregator;
pub use storage::{LedgerStorage, StorageError};
pub use utils::{ApiResponse, AppError, AppResult, LedgerError, LedgerResult};

pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 .env 并初始化日志
pub fn setup_environment() -> anyhow::Result<()> {
    // .env 可选
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());
    init_logger_with_file(&log_level, log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __             __
   / /  ___ ___  / /__ ____ ____
  / /__/ -_) _ \/ / _ `/ -_) __/
 /____/\__/\_,_/_/\_, /\__/_/
                 /___/   v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
