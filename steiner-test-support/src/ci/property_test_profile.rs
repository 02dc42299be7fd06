//! Property-test run profile read from the environment.
//!
//! CI raises the case count through `PROGTEST_CASES` and may ask suites to
//! fork each case with `STEINER_PBT_FORK`. Invalid overrides are logged and
//! ignored.

use std::env;

/// Environment variable overriding the number of cases per property.
pub const PROGTEST_CASES_ENV_KEY: &str = "PROGTEST_CASES";
/// Environment variable toggling forked proptest execution.
pub const STEINER_PBT_FORK_ENV_KEY: &str = "STEINER_PBT_FORK";

/// Case count and fork mode for one property suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads overrides from the environment, falling back to the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use steiner_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(32, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self {
            cases: override_or(PROGTEST_CASES_ENV_KEY, default_cases, parse_cases),
            fork: override_or(STEINER_PBT_FORK_ENV_KEY, default_fork, parse_switch),
        }
    }

    /// Number of cases to run per property.
    #[must_use]
    #[rustfmt::skip]
    pub fn cases(&self) -> u32 { self.cases }

    /// Whether each case runs in a forked subprocess.
    #[must_use]
    #[rustfmt::skip]
    pub fn fork(&self) -> bool { self.fork }
}

fn override_or<T: Copy>(key: &'static str, default: T, parse: fn(&str) -> Option<T>) -> T {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    parse(raw.trim()).unwrap_or_else(|| {
        tracing::warn!(env = key, raw = %raw, "ignoring invalid property-test override");
        default
    })
}

fn parse_cases(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|&cases| cases > 0)
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rstest::rstest;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Sets both variables for the duration of `body`, restoring them after.
    fn with_env(cases: Option<&str>, fork: Option<&str>, body: impl FnOnce()) {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let saved = [
            (PROGTEST_CASES_ENV_KEY, env::var(PROGTEST_CASES_ENV_KEY).ok()),
            (STEINER_PBT_FORK_ENV_KEY, env::var(STEINER_PBT_FORK_ENV_KEY).ok()),
        ];
        for (key, value) in [(PROGTEST_CASES_ENV_KEY, cases), (STEINER_PBT_FORK_ENV_KEY, fork)] {
            // SAFETY: ENV_LOCK serializes every test that touches these keys.
            unsafe {
                match value {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
        body();
        for (key, value) in saved {
            // SAFETY: ENV_LOCK is still held.
            unsafe {
                match value {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn defaults_apply_without_overrides() {
        with_env(None, None, || {
            let profile = ProptestRunProfile::load(64, false);
            assert_eq!(profile.cases(), 64);
            assert!(!profile.fork());
        });
    }

    #[rstest]
    #[case::one("1", 1)]
    #[case::padded(" 250 ", 250)]
    #[case::large("25000", 25_000)]
    #[case::zero("0", 64)]
    #[case::negative("-1", 64)]
    #[case::garbage("abc", 64)]
    fn case_overrides(#[case] raw: &str, #[case] expected: u32) {
        with_env(Some(raw), None, || {
            assert_eq!(ProptestRunProfile::load(64, false).cases(), expected);
        });
    }

    #[rstest]
    #[case::word("true", false, true)]
    #[case::shouting("YES", false, true)]
    #[case::digit("0", true, false)]
    #[case::off("off", true, false)]
    #[case::empty("", true, true)]
    #[case::unknown("maybe", false, false)]
    #[case::two("2", true, true)]
    fn fork_overrides(#[case] raw: &str, #[case] default: bool, #[case] expected: bool) {
        with_env(None, Some(raw), || {
            assert_eq!(ProptestRunProfile::load(64, default).fork(), expected);
        });
    }
}
