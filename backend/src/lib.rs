//! # Zelo Backend
//!
//! Domain logic and storage for the Zelo medication-reminder service.
//! The layering follows a strict dependency direction:
//!
//! - `domain` — entities, services, and the invariants they enforce
//! - `storage` — pluggable persistence behind trait boundaries
//! - `io` — REST adapter translating HTTP to domain operations
//! - `speech` — optional text-to-speech client, degraded on failure
//!
//! The domain layer never reads a clock: callers pass "now" and "today"
//! explicitly, which keeps every service deterministic under test.

pub mod domain;
pub mod io;
pub mod speech;
pub mod storage;

pub use storage::csv::CsvConnection;
