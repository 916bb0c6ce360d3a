use serde::{Deserialize, Serialize};

/// The TOTAL_FORMS / MIN_NUM_FORMS pair read by server-side form binding.
///
/// Both counters move together and are never clamped. Removal is already gated by the
/// one-block floor, so `total_count` cannot drop below the number of bound blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementRecord {
    pub total_count: i64,
    pub min_required_count: i64,
}

impl ManagementRecord {
    pub fn new(total_count: i64, min_required_count: i64) -> Self {
        Self {
            total_count,
            min_required_count,
        }
    }

    pub fn step(&mut self, increment: bool) {
        let delta = if increment { 1 } else { -1 };
        self.total_count += delta;
        self.min_required_count += delta;
    }
}
