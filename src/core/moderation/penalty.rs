// Escalating penalty table - maps an offender's cumulative violation count
// to the length of their next temporary restriction.

const DAY_SECS: u64 = 86_400;
const WEEK_SECS: u64 = 7 * DAY_SECS;

/// Restriction length in seconds for the given cumulative violation count.
///
/// 1st violation: 24 hours, 2nd: 3 days, 3rd: 7 days, then one extra week per
/// violation past the third. Monotonically non-decreasing.
pub fn duration_for(count: u32) -> u64 {
    match count {
        0 | 1 => DAY_SECS,
        2 => 3 * DAY_SECS,
        3 => WEEK_SECS,
        n => WEEK_SECS + WEEK_SECS * (n as u64 - 3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_anchors() {
        assert_eq!(duration_for(1), 86_400);
        assert_eq!(duration_for(2), 259_200);
        assert_eq!(duration_for(3), 604_800);
        assert_eq!(duration_for(4), 1_209_600);
        assert_eq!(duration_for(5), 1_814_400);
    }

    #[test]
    fn never_decreases() {
        for count in 1..200 {
            assert!(
                duration_for(count) <= duration_for(count + 1),
                "duration dropped between count {} and {}",
                count,
                count + 1
            );
        }
    }
}
