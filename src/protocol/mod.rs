//! Echo protocol: framing disciplines and the structured payload.
//!
//! # Routes
//!
//! | Path | Framing |
//! |------|---------|
//! | `/copy` | [`Framing::Copy`] |
//! | `/readWrite` | [`Framing::FixedBuffer`] (100 bytes) |
//! | `/sendRecvText` | [`Framing::Text`] |
//! | `/sendRecvArrayBuffer`, `/sendRecvBlob` | [`Framing::Binary`] |
//! | `/json` | [`Framing::Json`] |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `framing` | Framing disciplines and decoded units |
//! | `payload` | `{ "Msg", "Path" }` JSON record |

// ============================================================================
// Submodules
// ============================================================================

/// Framing disciplines.
pub mod framing;

/// Structured JSON payload.
pub mod payload;

// ============================================================================
// Re-exports
// ============================================================================

pub use framing::{COPY_BUFFER_SIZE, DEFAULT_CHUNK_SIZE, Framing, Unit, message_kind};
pub use payload::Payload;
