//! Read-only views over the ledger

pub mod view;

pub use view::{BlockView, ChainView, InputView, OutputView, TransactionView};
