//! Core quote types and local operations

pub mod book;
pub mod clock;
pub mod quote;
pub mod transfer;

pub use book::{ImportSummary, QuoteBook};
pub use clock::{Clock, SystemClock};
pub use quote::{CategoryFilter, CategorySet, Quote, default_quotes};
pub use transfer::{export_quotes, parse_import};
