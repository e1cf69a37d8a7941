//! XP progress exports. These need no handle.

use crate::{TrickipediaError, parse_cstr, write_json_out};
use std::ffi::c_char;
use trickipedia_progress::{ContributionKind, XpTable};

/// Writes the tier progress for a point total as JSON.
///
/// # Safety
/// - `out_json` must be a valid pointer. The result must be freed with
///   `trickipedia_free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_calculate_progress(
    total_points: u64,
    out_json: *mut *mut c_char,
) -> TrickipediaError {
    let progress = XpTable::standard().calculate_progress(total_points);
    unsafe { write_json_out(out_json, &progress) }
}

/// Credits one contribution (e.g. `"trick_submitted"`) to a user at
/// `total_points` and writes the award, including any level-up, as JSON.
///
/// # Safety
/// - `kind` must be a valid null-terminated UTF-8 string.
/// - `out_json` must be a valid pointer. The result must be freed with
///   `trickipedia_free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_award_xp(
    total_points: u64,
    kind: *const c_char,
    out_json: *mut *mut c_char,
) -> TrickipediaError {
    let kind = match unsafe { parse_cstr(kind) } {
        Ok(k) => k,
        Err(e) => return e,
    };
    let kind: ContributionKind =
        match serde_json::from_value(serde_json::Value::String(kind.to_string())) {
            Ok(k) => k,
            Err(_) => return TrickipediaError::InvalidArgument,
        };
    let award = XpTable::standard().award(total_points, kind);
    unsafe { write_json_out(out_json, &award) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::take_json;
    use std::ffi::CString;
    use std::ptr;

    #[test]
    fn progress_json_matches_calculation() {
        let mut out = ptr::null_mut();
        let result = unsafe { trickipedia_calculate_progress(750, &mut out) };
        assert_eq!(result, TrickipediaError::Ok);

        let json = take_json(out);
        assert_eq!(json["current_tier"]["name"], "Apprentice");
        assert_eq!(json["next_tier"]["tier"], 3);
        assert_eq!(json["points_to_next"], 250);
        assert_eq!(json["progress_percent"], 50.0);
    }

    #[test]
    fn max_tier_has_null_next() {
        let mut out = ptr::null_mut();
        unsafe { trickipedia_calculate_progress(9_000, &mut out) };
        let json = take_json(out);
        assert_eq!(json["current_tier"]["name"], "Legend");
        assert!(json["next_tier"].is_null());
        assert_eq!(json["progress_percent"], 100.0);
    }

    #[test]
    fn null_out_pointer_is_rejected() {
        let result = unsafe { trickipedia_calculate_progress(0, ptr::null_mut()) };
        assert_eq!(result, TrickipediaError::NullPointer);
    }

    #[test]
    fn award_reports_level_up() {
        let kind = CString::new("submission_approved").unwrap();
        let mut out = ptr::null_mut();
        let result = unsafe { trickipedia_award_xp(450, kind.as_ptr(), &mut out) };
        assert_eq!(result, TrickipediaError::Ok);

        let json = take_json(out);
        assert_eq!(json["new_total"], 550);
        assert_eq!(json["level_up"]["to"]["name"], "Apprentice");
        assert_eq!(json["level_up"]["unlocked"][0], "submit_tricks");
    }

    #[test]
    fn unknown_contribution_is_rejected() {
        let kind = CString::new("bribe").unwrap();
        let mut out = ptr::null_mut();
        let result = unsafe { trickipedia_award_xp(0, kind.as_ptr(), &mut out) };
        assert_eq!(result, TrickipediaError::InvalidArgument);
        assert!(out.is_null());
    }
}
