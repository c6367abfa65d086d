// crates/contract-gate-config/src/lib.rs
// ============================================================================
// Module: Contract Gate Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for contract-gate.toml semantics.
// Dependencies: contract-gate-core, contract-gate-probe, serde, toml
// ============================================================================

//! ## Overview
//! `contract-gate-config` defines the configuration model for Contract Gate:
//! which contracts to check, how live probes run, when a diff fails, where
//! reports go, and whether audit events are recorded. Validation is strict
//! and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
