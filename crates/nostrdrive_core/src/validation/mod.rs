//! Product policy checks applied by services.
//!
//! # Responsibility
//! - Gate which record kinds may become folder members.
//!
//! # Invariants
//! - Validators are pure and hold no mutable state after construction.

pub mod kind;
