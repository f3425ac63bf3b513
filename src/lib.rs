#![doc(test(attr(deny(warnings))))]

//! Subscription billing schedules: next-due-date computation, monthly spend
//! reports, and the JSON store and shell built around them.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("subtrack tracing initialized");
    });
}
