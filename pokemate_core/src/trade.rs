//! Trade fairness arithmetic.

/// Ratio of given value to received value below which a trade counts as
/// unfair.
const FAIR_RATIO: f64 = 0.8;

/// Outcome of a fairness check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeVerdict {
    pub ratio: f64,
    pub fair: bool,
}

impl TradeVerdict {
    /// Reply line in the shape users see.
    #[must_use]
    pub fn message(&self) -> String {
        if self.fair {
            format!("✅ Fair trade ({:.2})", self.ratio)
        } else {
            format!("⚠️ Unfair trade ({:.2})", self.ratio)
        }
    }
}

/// Compare what a user gives against what they receive.
///
/// A receive amount of zero has no ratio and yields `None`; the caller
/// turns that into a usage reply.
#[must_use]
pub fn assess(give: f64, take: f64) -> Option<TradeVerdict> {
    if take.abs() < f64::EPSILON {
        return None;
    }
    let ratio = give / take;
    Some(TradeVerdict {
        ratio,
        fair: ratio >= FAIR_RATIO,
    })
}
