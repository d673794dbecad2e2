// SPDX-License-Identifier: AGPL-3.0-only

//! Pass/fail harness for the validation binary.
//!
//! Checks compare an observed number to a documented reference from
//! [`crate::tolerances`]. The run ends with a summary on stdout and exit
//! code 0 (all passed) or 1 (any failed).

use std::fmt;
use std::process;

use tracing::{info, warn};

/// One recorded check.
#[derive(Debug, Clone)]
pub struct Check {
    /// Human-readable label
    pub label: String,
    /// Whether this check passed
    pub passed: bool,
    /// Observed value
    pub observed: f64,
    /// Expected value or bound
    pub expected: f64,
    /// Tolerance used
    pub tolerance: f64,
    /// How the tolerance was applied
    pub mode: ToleranceMode,
}

/// How a tolerance threshold is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceMode {
    /// |observed - expected| < tolerance
    Absolute,
    /// |observed - expected| / |expected| < tolerance
    Relative,
    /// ‖lhs - rhs‖ / ‖rhs‖ < tolerance, observed is the difference norm
    Identity,
    /// observed < threshold
    UpperBound,
    /// observed > threshold
    LowerBound,
    /// boolean condition
    Flag,
}

impl fmt::Display for ToleranceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute => write!(f, "abs"),
            Self::Relative => write!(f, "rel"),
            Self::Identity => write!(f, "id"),
            Self::UpperBound => write!(f, "<"),
            Self::LowerBound => write!(f, ">"),
            Self::Flag => write!(f, "flag"),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = if self.passed { "✓" } else { "✗" };
        write!(
            f,
            "  {icon} {}: observed={:.6e}, expected={:.6e}, tol={:.2e} ({})",
            self.label, self.observed, self.expected, self.tolerance, self.mode
        )
    }
}

/// Accumulates checks for one validation run.
#[derive(Debug, Default)]
#[must_use]
pub struct ValidationHarness {
    /// Name of the run
    pub name: String,
    /// All checks performed
    pub checks: Vec<Check>,
}

impl ValidationHarness {
    /// Create a harness for a named run.
    #[must_use = "validation harness must be used to run checks"]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            checks: Vec::new(),
        }
    }

    fn record(&mut self, check: Check) {
        if check.passed {
            info!(label = %check.label, observed = check.observed, "check passed");
        } else {
            warn!(
                label = %check.label,
                observed = check.observed,
                expected = check.expected,
                tolerance = check.tolerance,
                mode = %check.mode,
                "check failed"
            );
        }
        self.checks.push(check);
    }

    /// |observed - expected| < tolerance
    pub fn check_abs(&mut self, label: &str, observed: f64, expected: f64, tolerance: f64) {
        self.record(Check {
            label: label.to_string(),
            passed: (observed - expected).abs() < tolerance,
            observed,
            expected,
            tolerance,
            mode: ToleranceMode::Absolute,
        });
    }

    /// |observed - expected| / |expected| < tolerance, absolute when expected is 0
    pub fn check_rel(&mut self, label: &str, observed: f64, expected: f64, tolerance: f64) {
        let passed = if expected.abs() > f64::EPSILON {
            ((observed - expected) / expected).abs() < tolerance
        } else {
            observed.abs() < tolerance
        };
        self.record(Check {
            label: label.to_string(),
            passed,
            observed,
            expected,
            tolerance,
            mode: ToleranceMode::Relative,
        });
    }

    /// Operator identity `lhs = rhs` given `‖lhs - rhs‖` and `‖rhs‖`.
    ///
    /// Passes when the difference is below `tolerance · max(‖rhs‖, 1)`:
    /// relative for `‖rhs‖ ≥ 1`, absolute below that.
    pub fn check_identity(
        &mut self,
        label: &str,
        difference_norm: f64,
        reference_norm: f64,
        tolerance: f64,
    ) {
        let scale = reference_norm.max(1.0);
        self.record(Check {
            label: label.to_string(),
            passed: difference_norm.is_finite() && difference_norm < tolerance * scale,
            observed: difference_norm,
            expected: 0.0,
            tolerance: tolerance * scale,
            mode: ToleranceMode::Identity,
        });
    }

    /// observed < threshold
    pub fn check_upper(&mut self, label: &str, observed: f64, threshold: f64) {
        self.record(Check {
            label: label.to_string(),
            passed: observed < threshold,
            observed,
            expected: threshold,
            tolerance: threshold,
            mode: ToleranceMode::UpperBound,
        });
    }

    /// observed > threshold
    pub fn check_lower(&mut self, label: &str, observed: f64, threshold: f64) {
        self.record(Check {
            label: label.to_string(),
            passed: observed > threshold,
            observed,
            expected: threshold,
            tolerance: threshold,
            mode: ToleranceMode::LowerBound,
        });
    }

    /// Boolean pass/fail.
    pub fn check_bool(&mut self, label: &str, passed: bool) {
        self.record(Check {
            label: label.to_string(),
            passed,
            observed: f64::from(u8::from(passed)),
            expected: 1.0,
            tolerance: 0.0,
            mode: ToleranceMode::Flag,
        });
    }

    /// Number of checks that passed.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Total number of checks.
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.checks.len()
    }

    /// Whether all checks passed. Vacuously true with no checks.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Summary table, one line per check.
    #[must_use]
    pub fn format_summary(&self) -> String {
        use std::fmt::Write;
        let mut s = String::new();
        let _ = writeln!(
            s,
            "═══ {} validation: {}/{} checks passed ═══",
            self.name,
            self.passed_count(),
            self.total_count()
        );
        for check in &self.checks {
            let _ = writeln!(s, "{check}");
        }
        s
    }

    /// Print summary and exit: 0 if all checks pass, 1 otherwise.
    pub fn finish(&self) -> ! {
        println!();
        print!("{}", self.format_summary());

        if self.all_passed() {
            println!("ALL CHECKS PASSED");
            process::exit(0);
        }
        let failed: Vec<&str> = self
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.label.as_str())
            .collect();
        println!("FAILED CHECKS: {}", failed.join(", "));
        process::exit(1);
    }
}
