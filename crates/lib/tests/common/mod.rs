#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the `vizon` integration tests.

use std::sync::Once;
use vizon::types::{Cell, Table};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once per test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// A small sales table with one categorical and one numeric column.
pub fn sales_table() -> Table {
    Table::new(
        vec!["Item".to_string(), "Price".to_string()],
        vec![
            vec![Cell::from("Coffee"), Cell::from(4.5)],
            vec![Cell::from("Tea"), Cell::from(3)],
        ],
    )
}
