//! System utilities for embedded devices.
//!
//! # Available Utilities
//!
//! - **[`timer`]**: periodic timer and clock used by the MQTT keep-alive
//!   scheduler and by every bounded wait on the transport

/// Periodic timer abstraction.
///
/// Defines the [`Timer`](timer::Timer) collaborator and the [`Tick`](timer::Tick)
/// signal a timer interrupt or thread posts for the poll loop to consume.
pub mod timer;
