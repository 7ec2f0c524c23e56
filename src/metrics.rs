//! Metric helpers for `packframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Available behind the
//! `metrics` feature.

use metrics::counter;

/// Name of the counter tracking messages packed into buffers.
pub const FRAMES_PACKED: &str = "packframe_frames_packed_total";
/// Name of the counter tracking messages recovered from buffers.
pub const FRAMES_UNPACKED: &str = "packframe_frames_unpacked_total";
/// Name of the counter tracking packed buffers handed to the transport.
pub const BUFFERS_SUBMITTED: &str = "packframe_buffers_submitted_total";

/// Record a message packed into a buffer.
pub fn inc_frames_packed() { counter!(FRAMES_PACKED).increment(1); }

/// Record a message recovered from a received buffer.
pub fn inc_frames_unpacked() { counter!(FRAMES_UNPACKED).increment(1); }

/// Record a packed buffer submitted to the transport.
pub fn inc_buffers_submitted() { counter!(BUFFERS_SUBMITTED).increment(1); }
