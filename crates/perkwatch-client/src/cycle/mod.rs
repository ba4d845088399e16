//! Benefit-cycle calculation engine.
//!
//! Everything here is a pure function of its arguments: the reference date is
//! always passed in, nothing reads the clock, nothing logs, and failures come
//! back as [`CycleError`](crate::CycleError) values for the caller to handle.

pub mod date;
pub mod definition;
pub mod expiry;
pub mod resolve;

pub use date::{never_expires, reference_date_of};
pub use definition::{CardAnniversary, CycleDefinition, CycleType, CycleWindow};
pub use expiry::{
    DEFAULT_EXPIRING_SOON_DAYS, ExpiryResult, ExpiryStatus, ParsedCycle, calculate_next_expiry,
    calculate_next_expiry_from_raw, classify_expiry, expiry_from_bounds, is_expiring_soon,
};
pub use resolve::{
    CycleBounds, resolve_current_cycle_end, resolve_current_cycle_start, resolve_cycle,
    resolve_next_reset_date,
};
