//! Receipt printing
//!
//! Checkout queues the closed order on a [`ReceiptSender`] after the payment
//! has been committed. [`ReceiptPrintWorker`] drains the queue in the
//! background, so a slow or broken printer never holds up a request. A
//! printer failure is logged and never undoes the payment.

use shared::models::ClosedOrderProjection;
use std::fmt::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const RECEIPT_WIDTH: usize = 40;

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Printer unavailable: {0}")]
    Unavailable(String),

    #[error("Render failed: {0}")]
    Render(#[from] std::fmt::Error),
}

/// Output device for receipts
pub trait ReceiptPrinter: Send + Sync {
    fn print(&self, receipt: &ClosedOrderProjection) -> Result<(), PrintError>;
}

/// Writes rendered receipts to the log (no physical printer attached)
#[derive(Debug, Default, Clone)]
pub struct LogPrinter;

impl ReceiptPrinter for LogPrinter {
    fn print(&self, receipt: &ClosedOrderProjection) -> Result<(), PrintError> {
        let text = render_receipt(receipt)?;
        tracing::info!(
            target: "receipt",
            order_id = %receipt.order_id,
            table = %receipt.table_identifier,
            "\n{}",
            text
        );
        Ok(())
    }
}

pub type ReceiptSender = mpsc::UnboundedSender<ClosedOrderProjection>;
pub type ReceiptReceiver = mpsc::UnboundedReceiver<ClosedOrderProjection>;

pub fn receipt_queue() -> (ReceiptSender, ReceiptReceiver) {
    mpsc::unbounded_channel()
}

/// Background consumer of the receipt queue
pub struct ReceiptPrintWorker {
    printer: Arc<dyn ReceiptPrinter>,
}

impl ReceiptPrintWorker {
    pub fn new(printer: Arc<dyn ReceiptPrinter>) -> Self {
        Self { printer }
    }

    /// Print queued receipts until shutdown or until every sender is gone
    ///
    /// Printers may block on I/O, so each job runs on the blocking pool.
    pub async fn run(self, mut receipts: ReceiptReceiver, shutdown: CancellationToken) {
        tracing::info!("Receipt print worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Receipt print worker received shutdown signal");
                    break;
                }
                receipt = receipts.recv() => {
                    let Some(receipt) = receipt else {
                        tracing::info!("Receipt queue closed, print worker stopping");
                        break;
                    };
                    self.print_one(receipt).await;
                }
            }
        }
    }

    async fn print_one(&self, receipt: ClosedOrderProjection) {
        let printer = self.printer.clone();
        let order_id = receipt.order_id.clone();
        match tokio::task::spawn_blocking(move || printer.print(&receipt)).await {
            Ok(Ok(())) => tracing::debug!(order_id = %order_id, "Receipt printed"),
            Ok(Err(e)) => {
                tracing::warn!(order_id = %order_id, error = %e, "Receipt printing failed")
            }
            Err(e) => tracing::error!(order_id = %order_id, error = %e, "Receipt print job panicked"),
        }
    }
}

/// Plain-text receipt, fixed width
pub fn render_receipt(receipt: &ClosedOrderProjection) -> Result<String, PrintError> {
    let rule = "-".repeat(RECEIPT_WIDTH);
    let closed_at = chrono::DateTime::from_timestamp_millis(receipt.closed_at)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    let mut out = String::new();
    writeln!(out, "{:^width$}", "RECEIPT", width = RECEIPT_WIDTH)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "Table: {}", receipt.table_identifier)?;
    writeln!(out, "Cashier: {}", receipt.cashier)?;
    writeln!(out, "Date: {}", closed_at)?;
    writeln!(out, "{}", rule)?;

    for item in &receipt.items {
        let label = format!("{} x{}", item.name, item.quantity);
        let amount = format!("{:.2}", item.line_total());
        writeln!(out, "{}", pad_line(&label, &amount))?;
    }

    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", pad_line("TOTAL", &format!("{:.2}", receipt.total)))?;
    writeln!(out, "{}", pad_line("CASH", &format!("{:.2}", receipt.tendered)))?;
    writeln!(out, "{}", pad_line("CHANGE", &format!("{:.2}", receipt.change)))?;
    write!(out, "{}", rule)?;
    Ok(out)
}

fn pad_line(label: &str, amount: &str) -> String {
    let label_width = RECEIPT_WIDTH.saturating_sub(amount.chars().count() + 1);
    let label: String = label.chars().take(label_width).collect();
    format!("{:<label_width$} {}", label, amount)
}
