//! Actor system for watch mode
//!
//! ```text
//! FsActor --> TaskActor --> WsActor
//! (watch)      (tasks)     (broadcast)
//! ```
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `task` - Watch rules and task execution
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod task;
pub mod ws;

pub use coordinator::Coordinator;
