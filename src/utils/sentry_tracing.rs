use sentry::{Transaction, TransactionContext};

/// Starts a sentry performance transaction when trace logging is active.
pub fn start_trace_transaction(name: &str, operation: &str) -> Option<Transaction> {
    if log::max_level() >= log::LevelFilter::Trace {
        let ctx = TransactionContext::new(name, operation);
        Some(sentry::start_transaction(ctx))
    } else {
        None
    }
}

/// Records a lifecycle breadcrumb message (start, stop, reload) to sentry.
/// A no-op when sentry is not initialized.
pub fn capture_lifecycle(message: &str) {
    if message.is_empty() {
        return;
    }
    sentry::capture_message(message, sentry::Level::Info);
}
