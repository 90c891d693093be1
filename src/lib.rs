// Library surface for headless/integration tests and the binary.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod puzzle;
pub mod runtime;
pub mod scramble;
pub mod session;
pub mod stats;
pub mod store;
pub mod timer;
pub mod ui;
pub mod util;
