pub mod api;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod error;
pub mod evaluator;
pub mod optimizer;
pub mod pool;
pub mod snapshot;
pub mod sink;
// cmd and reports are binary modules (declared in main.rs).
