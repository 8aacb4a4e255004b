// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The cookie-based profile override boundary.
//!
//! Hosts may let a client report, via a cookie, which profiles earlier
//! detections resolved to, e.g. a device family that only client-side
//! script can distinguish. The cookie value is a `|`-separated list of
//! integer profile IDs. This module owns the boundary only: it parses the
//! cookie and emits the collection script. What "applying" an ID to a
//! match result means belongs to the host, which passes the mutation in
//! as a closure.
//!
//! Malformed tokens are non-fatal by contract: each is skipped on its
//! own with a debug-level diagnostic, and parsing continues with the
//! rest.

/// Token separator inside the override cookie value.
pub const OVERRIDE_SEPARATOR: char = '|';

/// Default name of the override cookie.
pub const OVERRIDE_COOKIE: &str = "ProfileOverrides";

/// Parse an override cookie value into the ordered list of valid profile
/// IDs. Tokens that do not parse as `i32` are discarded individually and
/// logged at debug level; they never abort the remaining tokens.
pub fn parse_override_ids(cookie_value: &str) -> Vec<i32> {
    cookie_value
        .split(OVERRIDE_SEPARATOR)
        .filter_map(|token| match token.parse::<i32>() {
            Ok(id) => Some(id),
            Err(err) => {
                log::debug!("discarding malformed profile override token {:?}: {}", token, err);
                None
            }
        })
        .collect()
}

/// Apply every valid override ID from the cookie to a match result, one
/// at a time, through the host's mutation hook.
pub fn apply_overrides<F>(cookie_value: &str, mut update_profile: F)
where
    F: FnMut(i32),
{
    for id in parse_override_ids(cookie_value) {
        update_profile(id);
    }
}

/// Emit the client-side script that, on first encounter with a session,
/// reads the detected value of `property` and writes it into the
/// override cookie for subsequent requests.
pub fn override_script(property: &str, cookie_name: &str) -> String {
    format!(
        concat!(
            "(function () {{\n",
            "  if (document.cookie.indexOf('{cookie}=') !== -1) {{ return; }}\n",
            "  var ids = [];\n",
            "  var value = window['{property}'];\n",
            "  if (value !== undefined && value !== null) {{ ids.push(value); }}\n",
            "  document.cookie = '{cookie}=' + ids.join('{separator}') + '; path=/';\n",
            "}})();\n"
        ),
        cookie = cookie_name,
        property = property,
        separator = OVERRIDE_SEPARATOR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids_parse_in_order() {
        assert_eq!(parse_override_ids("10|20|30"), vec![10, 20, 30]);
    }

    #[test]
    fn malformed_tokens_are_skipped_individually() {
        // An out-of-range number and a non-number are each discarded
        // without aborting the rest.
        assert_eq!(parse_override_ids("12345|99999999999999|abc"), vec![12345]);
        assert_eq!(parse_override_ids("abc|7|...|9"), vec![7, 9]);
    }

    #[test]
    fn empty_value_yields_nothing() {
        assert_eq!(parse_override_ids(""), Vec::<i32>::new());
        assert_eq!(parse_override_ids("|"), Vec::<i32>::new());
    }

    #[test]
    fn apply_calls_hook_per_id() {
        let mut seen = Vec::new();
        apply_overrides("3|bad|5", |id| seen.push(id));
        assert_eq!(seen, vec![3, 5]);
    }

    #[test]
    fn script_mentions_cookie_and_property() {
        let script = override_script("ScreenPixelsWidth", OVERRIDE_COOKIE);
        assert!(script.contains("ProfileOverrides="));
        assert!(script.contains("ScreenPixelsWidth"));
        assert!(script.contains("document.cookie"));
    }
}
