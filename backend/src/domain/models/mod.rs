//! Domain entity models.

pub mod elder;
pub mod intake_log;
pub mod medication;
