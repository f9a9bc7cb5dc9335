//! 服务层 - 账本的外部协作者
//!
//! - [`CategoryCatalog`] - 产品分类校验
//! - [`ReceiptPrinter`] / [`ReceiptPrintWorker`] - 结账小票输出 (后台队列)
//! - [`http`] - HTTP 应用组装

pub mod catalog;
pub mod http;
pub mod printing;

pub use catalog::{CategoryCatalog, StaticCatalog};
pub use http::build_app;
pub use printing::{
    LogPrinter, PrintError, ReceiptPrintWorker, ReceiptPrinter, ReceiptReceiver, ReceiptSender,
    receipt_queue,
};
