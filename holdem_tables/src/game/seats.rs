//! Clockwise seat search.

use super::entities::SeatIndex;

/// First seat after `from` (wrapping) for which `eligible` holds.
///
/// Scans at most `len` seats: `from + 1` through `from + len`, so `from`
/// itself is the last seat considered. Returns `None` when no seat
/// qualifies or the table is empty.
pub fn next_eligible_seat<F>(len: usize, from: SeatIndex, mut eligible: F) -> Option<SeatIndex>
where
    F: FnMut(SeatIndex) -> bool,
{
    (1..=len).map(|step| (from + step) % len).find(|&idx| eligible(idx))
}
