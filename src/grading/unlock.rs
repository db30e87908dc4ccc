// src/grading/unlock.rs

use std::sync::LazyLock;

use regex::Regex;

static NUMBERED_MODULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>.+)_(?P<number>\d+)$").expect("valid module id pattern")
});

/// Derives the advisory next-module id from a passed module: `Module_01` -> `Module_02`.
///
/// Returns `None` for failed attempts and for ids without a `<prefix>_<NN>`
/// suffix. The hint is client-side gating only and never blocks a submission.
pub fn resolve_next_module(module_id: &str, passed: bool) -> Option<String> {
    if !passed {
        return None;
    }

    let caps = NUMBERED_MODULE.captures(module_id)?;
    let number: u64 = caps["number"].parse().ok()?;
    let next = number.checked_add(1)?;

    Some(format!("{}_{:02}", &caps["prefix"], next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_numeric_suffix() {
        assert_eq!(
            resolve_next_module("Module_01", true).as_deref(),
            Some("Module_02")
        );
        assert_eq!(
            resolve_next_module("Module_09", true).as_deref(),
            Some("Module_10")
        );
        assert_eq!(
            resolve_next_module("Module_99", true).as_deref(),
            Some("Module_100")
        );
    }

    #[test]
    fn keeps_prefix_with_underscores() {
        assert_eq!(
            resolve_next_module("rust_basics_3", true).as_deref(),
            Some("rust_basics_04")
        );
    }

    #[test]
    fn no_hint_without_numeric_suffix() {
        assert_eq!(resolve_next_module("Custom", true), None);
        assert_eq!(resolve_next_module("Module_", true), None);
        assert_eq!(resolve_next_module("Module_1a", true), None);
    }

    #[test]
    fn no_hint_when_failed() {
        assert_eq!(resolve_next_module("Module_01", false), None);
    }
}
