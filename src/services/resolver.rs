use crate::constants::PRIMARY_CODE_MAX_DIGITS;
use crate::models::Venue;

/// Venue candidates for a bare security code, in try order.
///
/// Rule: short all-digit codes and codes containing "B" (bond/fixed-income
/// fund convention, case-insensitive) list on the primary exchange far more
/// often, so they are tried Primary-first; everything else OTC-first. Never
/// empty, never errors - the acquisition service confirms the venue by
/// actually getting data back.
pub fn venue_candidates(code: &str) -> [Venue; 2] {
    let short_numeric =
        code.len() <= PRIMARY_CODE_MAX_DIGITS && code.chars().all(|c| c.is_ascii_digit());
    let bond_convention = code.chars().any(|c| c == 'B' || c == 'b');

    if short_numeric || bond_convention {
        [Venue::Primary, Venue::OverTheCounter]
    } else {
        [Venue::OverTheCounter, Venue::Primary]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_numeric_codes_try_primary_first() {
        assert_eq!(venue_candidates("2330")[0], Venue::Primary);
        assert_eq!(venue_candidates("50")[0], Venue::Primary);
        assert_eq!(venue_candidates("0050")[0], Venue::Primary);
    }

    #[test]
    fn test_bond_codes_try_primary_first_regardless_of_length() {
        assert_eq!(venue_candidates("00687B")[0], Venue::Primary);
        assert_eq!(venue_candidates("00687b")[0], Venue::Primary);
    }

    #[test]
    fn test_other_codes_try_otc_first() {
        // 5 digits, no B
        assert_eq!(venue_candidates("00878")[0], Venue::OverTheCounter);
        // Alphanumeric without B
        assert_eq!(venue_candidates("123A5")[0], Venue::OverTheCounter);
    }

    #[test]
    fn test_always_two_candidates_covering_both_venues() {
        for code in ["2330", "00687B", "00878", ""] {
            let candidates = venue_candidates(code);
            assert_ne!(candidates[0], candidates[1]);
        }
    }
}
