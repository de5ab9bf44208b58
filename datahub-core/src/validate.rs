//! Field validators: frequency, logon, airport code, CPDLC login.
//!
//! Each validator is a pure function over one field value. Frequencies are
//! checked in integer kHz so that sub-MHz remainders are exact.

use crate::types::FieldError;

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

/// Lowest valid VHF air-band frequency (inclusive), in kHz.
pub const FREQUENCY_MIN_KHZ: u32 = 118_000;
/// Upper bound of the air band (exclusive), in kHz.
pub const FREQUENCY_MAX_KHZ: u32 = 138_000;

/// Channel step of the 8.33 kHz plan, expressed as its 5 kHz name grid.
const CHANNEL_STEP_KHZ: u32 = 5;

/// Sub-MHz remainders that sit on the 5 kHz grid but are reserved.
const RESERVED_REMAINDERS_KHZ: [u32; 2] = [20, 70];

/// Round to 3 decimal places and return the result in kHz.
///
/// Rounds the exact binary value once, via decimal formatting: `118.0045`
/// is stored just below the tie and becomes 118.004. `None` for non-finite
/// input or values too large for kHz.
fn round_to_khz(mhz: f64) -> Option<i64> {
    if !mhz.is_finite() {
        return None;
    }
    let text = format!("{mhz:.3}");
    let (whole, fraction) = text.split_once('.')?;
    let negative = whole.starts_with('-');
    let whole: i64 = whole.trim_start_matches('-').parse().ok()?;
    let fraction: i64 = fraction.parse().ok()?;
    let khz = whole.checked_mul(1000)?.checked_add(fraction)?;
    Some(if negative { -khz } else { khz })
}

fn format_khz(khz: u32) -> String {
    format!("{}.{:03}", khz / 1000, khz % 1000)
}

/// Validate a frequency in MHz and return it rounded to 3 decimals, as an
/// integer number of kHz.
///
/// Rejects anything outside [118.000, 138.000) and any channel whose
/// sub-MHz remainder is not a multiple of 5 kHz or is one of the reserved
/// 20/70 kHz offsets.
pub fn frequency_khz(mhz: f64) -> Result<u32, FieldError> {
    let khz = round_to_khz(mhz)
        .and_then(|khz| u32::try_from(khz).ok())
        .filter(|khz| (FREQUENCY_MIN_KHZ..FREQUENCY_MAX_KHZ).contains(khz))
        .ok_or_else(|| FieldError::InvalidFrequency {
            value: format!("{mhz}"),
            reason: "must be >= 118.000 MHz and < 138.000 MHz",
        })?;

    let remainder = khz % 1000;
    if remainder % CHANNEL_STEP_KHZ != 0 || RESERVED_REMAINDERS_KHZ.contains(&remainder) {
        return Err(FieldError::InvalidFrequency {
            value: format_khz(khz),
            reason: "not a valid 8.33 kHz channel",
        });
    }

    Ok(khz)
}

/// Parse a frequency given as text (e.g. `"118.500"`) and validate it.
pub fn parse_frequency(text: &str) -> Result<u32, FieldError> {
    let mhz: f64 = text.trim().parse().map_err(|_| FieldError::InvalidFrequency {
        value: text.to_string(),
        reason: "not a number",
    })?;
    frequency_khz(mhz)
}

// ---------------------------------------------------------------------------
// Logon
// ---------------------------------------------------------------------------

/// Separator between logon components.
pub const LOGON_SEPARATOR: char = '_';

fn is_upper_alnum(part: &str) -> bool {
    part.bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Validate a station logon (`EDDF_TWR`, `EDDF_N_APP`, `EDGG_GIN_CTR`).
///
/// Grammar: prefix of 2–5 uppercase letters/digits, an optional middle of
/// 1–8 uppercase letters/digits, and a role suffix of 2–4 uppercase letters,
/// joined by underscores. Lowercase or other separators are rejected.
pub fn validate_logon(logon: &str) -> Result<&str, FieldError> {
    let parts: Vec<&str> = logon.split(LOGON_SEPARATOR).collect();
    let invalid = || FieldError::InvalidLogon(logon.to_string());

    let (prefix, middle, suffix) = match parts.as_slice() {
        [prefix, suffix] => (*prefix, None, *suffix),
        [prefix, middle, suffix] => (*prefix, Some(*middle), *suffix),
        _ => return Err(invalid()),
    };

    if !(2..=5).contains(&prefix.len()) || !is_upper_alnum(prefix) {
        return Err(invalid());
    }
    if let Some(middle) = middle {
        if !(1..=8).contains(&middle.len()) || !is_upper_alnum(middle) {
            return Err(invalid());
        }
    }
    if !(2..=4).contains(&suffix.len()) || !suffix.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(invalid());
    }

    Ok(logon)
}

// ---------------------------------------------------------------------------
// Airport code / CPDLC login
// ---------------------------------------------------------------------------

/// Require exactly 4 ASCII letters, then normalize to uppercase.
/// Surrounding whitespace is not stripped and fails the check.
pub fn validate_icao(code: &str) -> Result<String, FieldError> {
    if code.len() == 4 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(FieldError::InvalidAirportCode(code.to_string()))
    }
}

/// CPDLC logins are exactly 4 characters.
pub fn validate_cpdlc_login(login: &str) -> Result<&str, FieldError> {
    if login.chars().count() == 4 {
        Ok(login)
    } else {
        Err(FieldError::InvalidCpdlcLogin(login.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_valid_channels() {
        for (f, khz) in [
            (118.005, 118_005),
            (118.010, 118_010),
            (118.015, 118_015),
            (118.025, 118_025),
            (118.5, 118_500),
            (121.8, 121_800),
            (137.995, 137_995),
        ] {
            assert_eq!(frequency_khz(f), Ok(khz), "{f}");
        }
    }

    #[test]
    fn test_frequency_reserved_offsets() {
        assert!(frequency_khz(118.020).is_err());
        assert!(frequency_khz(118.070).is_err());
        // Only the exact 20/70 kHz remainders are reserved.
        assert!(frequency_khz(118.120).is_ok());
    }

    #[test]
    fn test_frequency_off_grid() {
        assert!(frequency_khz(118.001).is_err());
        assert!(frequency_khz(137.997).is_err());
        assert!(frequency_khz(123.4567).is_err());
    }

    #[test]
    fn test_frequency_out_of_band() {
        assert!(frequency_khz(117.995).is_err());
        assert!(frequency_khz(138.0).is_err());
        assert!(frequency_khz(140.0).is_err());
        assert!(frequency_khz(f64::NAN).is_err());
    }

    #[test]
    fn test_frequency_rounds_before_checking() {
        // 118.0049 rounds to 118.005
        assert_eq!(frequency_khz(118.0049), Ok(118_005));
        // 137.9996 rounds up to 138.000 and leaves the band
        assert!(frequency_khz(137.9996).is_err());
    }

    #[test]
    fn test_frequency_half_way_rounds_once() {
        // 118.0045 is stored below the tie and rounds to the off-grid 118.004
        assert!(frequency_khz(118.0045).is_err());
        // 118.0055 is stored below the tie as well and rounds to 118.005
        assert_eq!(frequency_khz(118.0055), Ok(118_005));
        assert_eq!(parse_frequency("118.0055"), Ok(118_005));
        assert!(parse_frequency("118.0045").is_err());
    }

    #[test]
    fn test_round_to_khz() {
        assert_eq!(round_to_khz(118.5), Some(118_500));
        assert_eq!(round_to_khz(-118.5), Some(-118_500));
        assert_eq!(round_to_khz(f64::INFINITY), None);
        assert!(frequency_khz(1e300).is_err());
        assert!(frequency_khz(-118.5).is_err());
    }

    #[test]
    fn test_frequency_idempotent() {
        for f in [118.005, 124.355, 135.725] {
            let once = frequency_khz(f).unwrap();
            assert_eq!(frequency_khz(once as f64 / 1000.0), Ok(once));
            assert_eq!(parse_frequency(&format_khz(once)), Ok(once));
        }
    }

    #[test]
    fn test_parse_frequency_text() {
        assert_eq!(parse_frequency("118.500"), Ok(118_500));
        assert_eq!(parse_frequency(" 135.725 "), Ok(135_725));
        assert!(matches!(
            parse_frequency("one-one-eight"),
            Err(FieldError::InvalidFrequency { .. })
        ));
    }

    #[test]
    fn test_logon_valid() {
        for logon in ["EDDF_TWR", "EDDF_N_APP", "EDGG_GIN_CTR", "ETNW_GND", "EDDM_1_DEL"] {
            assert_eq!(validate_logon(logon), Ok(logon));
        }
    }

    #[test]
    fn test_logon_invalid() {
        for logon in [
            "",
            "EDDF",
            "eddf_twr",
            "EDDF-TWR",
            "EDDF__TWR",
            "EDDF_A_B_TWR",
            "E_TWR",
            "EDDF_TOWER",
            "EDDF_T1",
        ] {
            assert_eq!(
                validate_logon(logon),
                Err(FieldError::InvalidLogon(logon.to_string())),
                "{logon}"
            );
        }
    }

    #[test]
    fn test_icao_normalizes_case() {
        assert_eq!(validate_icao("eddl"), Ok("EDDL".into()));
        assert_eq!(validate_icao("EDDB"), Ok("EDDB".into()));
    }

    #[test]
    fn test_icao_rejects_bad_codes() {
        assert!(validate_icao("1ADW").is_err());
        assert!(validate_icao("EDD").is_err());
        assert!(validate_icao("EDDTT").is_err());
        assert!(validate_icao(" EDDF").is_err());
        assert!(validate_icao("EDDF ").is_err());
    }

    #[test]
    fn test_cpdlc_login() {
        assert_eq!(validate_cpdlc_login("EDGG"), Ok("EDGG"));
        assert!(validate_cpdlc_login("EDG").is_err());
        assert!(validate_cpdlc_login("EDGGX").is_err());
    }
}
