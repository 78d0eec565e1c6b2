//! Virtual DAQ Board Simulation Library
//!
//! This crate provides a simulated multi-channel acquisition board for
//! exercising the host protocol without physical hardware. It includes:
//!
//! - **[`VirtualBoard`]**: the board state machine: channel catalog,
//!   session state, command interpreter, and sampler
//! - **[`run_board_task`]**: an async protocol loop that drives a board over
//!   any byte stream (a serial port in production, an in-memory duplex in
//!   tests)
//! - **[`ValueSource`]**: the seam behind which real acquisition can replace
//!   the deterministic [`SyntheticSource`]
//!
//! # Example
//!
//! ```rust
//! use daq_sim::{BoardConfig, VirtualBoard};
//!
//! let mut board = VirtualBoard::with_synthetic_source(BoardConfig::default());
//!
//! // Drive the protocol directly
//! board.process_line("s1,50,101000");
//! board.sample().unwrap();
//!
//! // Collect the wire-encoded replies
//! while let Some(bytes) = board.take_output() {
//!     println!("board output: {}", String::from_utf8_lossy(&bytes));
//! }
//! ```

pub mod board;
pub mod board_task;
pub mod catalog;
pub mod session;

pub use board::{BoardConfig, VirtualBoard};
pub use board_task::{run_board_task, BoardTaskCommand};
pub use catalog::{ChannelCatalog, ReadError, SyntheticSource, ValueSource};
pub use session::{SessionState, DEFAULT_RATE_HZ};
