//! Boundary-matching configuration.
//!
//! The strict/lenient toggle is exposed to operators as a single
//! environment variable, but inside the codebase it is always an explicit
//! [`BoundaryMode`] value passed into the matcher — never ambient state —
//! so both modes can run side by side in one process for regression
//! comparison.

use crate::error::{Result, SenseboundError};

/// Environment variable controlling the boundary-matching mode.
///
/// Unset, or set to anything other than an explicit off sentinel, selects
/// strict matching. Only `off`, `0`, or `false` (case-insensitive) opt
/// back into the legacy lenient behavior.
pub const STRICT_BOUNDARY_ENV: &str = "SENSEBOUND_STRICT_BOUNDARY";

/// Policy for attaching inferred examples across sense boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode {
    /// Reject attachments whose heading trail is inconsistent with the
    /// target sense. The safe default.
    #[default]
    Strict,
    /// Legacy behavior: always attach to the nearest preceding sense in
    /// document order, regardless of part-of-speech consistency.
    Lenient,
}

impl BoundaryMode {
    /// Resolve the mode from [`STRICT_BOUNDARY_ENV`].
    pub fn from_env() -> Self {
        Self::from_env_var(STRICT_BOUNDARY_ENV)
    }

    /// Resolve the mode from a named environment variable. Split out so
    /// tests can use unique variable names without interfering.
    pub fn from_env_var(name: &str) -> Self {
        match std::env::var(name) {
            Ok(val) if is_off_sentinel(&val) => BoundaryMode::Lenient,
            _ => BoundaryMode::Strict,
        }
    }
}

/// Only an explicit off sentinel disables strict matching; empty strings
/// and unrecognized values stay strict.
fn is_off_sentinel(val: &str) -> bool {
    let v = val.trim();
    v.eq_ignore_ascii_case("off") || v == "0" || v.eq_ignore_ascii_case("false")
}

impl std::str::FromStr for BoundaryMode {
    type Err = SenseboundError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(BoundaryMode::Strict),
            "lenient" => Ok(BoundaryMode::Lenient),
            other => Err(SenseboundError::config(format!(
                "unknown boundary mode '{other}': expected 'strict' or 'lenient'"
            ))),
        }
    }
}

impl std::fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryMode::Strict => write!(f, "strict"),
            BoundaryMode::Lenient => write!(f, "lenient"),
        }
    }
}
