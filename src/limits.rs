//! Hard caps checked at entry points. Kept in one place so every limit is
//! auditable at a glance.

/// Widest report range accepted by the driver, in calendar days.
pub const MAX_RANGE_DAYS: i64 = 400;

/// Longest accepted organization/venue name.
pub const MAX_NAME_LEN: usize = 256;

/// Longest accepted unit code ("MAIN", "H1", "Q4", ...).
pub const MAX_UNIT_CODE_LEN: usize = 16;

/// Most venue ids a single booking fetch may name.
pub const MAX_VENUE_IDS_PER_FETCH: usize = 4096;
