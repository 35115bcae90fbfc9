//! Process state shared by the dev server, the watcher and Ctrl+C handling.

mod state;

pub use state::{is_serving, is_shutdown, register_server, set_serving, setup_shutdown_handler};
