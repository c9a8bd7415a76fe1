//! Error types for Bramble property-based testing.

use crate::property::TestStatistics;
use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// Main error type for Bramble generators and runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A shrink tree was filtered by a predicate its own value violates.
    #[error("value rejected by filter")]
    FilterRejected,

    /// The generator could not produce a value this time; redraw.
    #[error("generation discarded")]
    Discard,

    /// A weighted choice carried a weight outside `[0, 1]`.
    #[error("weight {weight} of choice {index} is outside [0, 1]")]
    InvalidWeight { index: usize, weight: f64 },

    /// The explicit weights of a weighted choice exceed certainty.
    #[error("weights sum to {sum}, which exceeds 1.0")]
    WeightsExceedOne { sum: f64 },

    /// A weighted choice with nothing that can ever be selected.
    #[error("no choice has a positive weight")]
    NoCandidates,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    /// Whether this error asks for the draw to be retried.
    pub fn is_discard(&self) -> bool {
        matches!(self, Error::Discard | Error::FilterRejected)
    }
}

/// Result type for Bramble operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Where in the source an assertion failed or a predicate panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        SourceLocation {
            file: location.file().to_string(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// An assertion failure reported by a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Failure {
    /// A failure located at the caller.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Failure {
            message: message.into(),
            location: Some(Location::caller().into()),
        }
    }

    /// A failure with no known source location.
    pub fn unlocated(message: impl Into<String>) -> Self {
        Failure {
            message: message.into(),
            location: None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {}", self.message, location),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A shrinking step in the failure progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrinkStep {
    /// The counterexample value at this step.
    pub counterexample: String,
    /// The step number (0 = original, 1+ = accepted shrinks).
    pub step: usize,
    /// The argument position that moved at this step.
    pub position: usize,
}

/// Outcome of a property run.
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    /// Every trial passed, or the property succeeded early.
    Pass {
        tests_run: usize,
        discards: usize,
        property_name: Option<String>,
        statistics: TestStatistics,
    },

    /// A counterexample was found and shrunk.
    Fail {
        counterexample: String,
        tests_run: usize,
        shrinks_performed: usize,
        property_name: Option<String>,
        failure: Failure,
        /// The shrinking progression showing how we reached the minimal counterexample.
        shrink_steps: Vec<ShrinkStep>,
        seed: u64,
    },

    /// Too many trials were discarded.
    GaveUp {
        tests_run: usize,
        discards: usize,
        property_name: Option<String>,
        reason: String,
        seed: u64,
    },

    /// The property raised an error unrelated to its assertions.
    Error {
        message: String,
        counterexample: String,
        tests_run: usize,
        property_name: Option<String>,
        seed: u64,
    },
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail { .. })
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Pass {
                tests_run,
                discards,
                property_name,
                statistics,
            } => {
                let prop_name = property_name.as_deref().unwrap_or("property");
                write!(f, "  ✓ {prop_name} passed {tests_run} tests")?;
                if *discards > 0 {
                    write!(f, " ({discards} discarded)")?;
                }
                write!(f, ".")?;

                if !statistics.classifications.is_empty() {
                    writeln!(f)?;
                    writeln!(f)?;
                    write!(f, "  Test data distribution:")?;
                    let mut names: Vec<_> = statistics.classifications.keys().collect();
                    names.sort();
                    for name in names {
                        let count = statistics.classifications[name];
                        let total = statistics.total_tests.max(1) as f64;
                        let percentage = count as f64 / total * 100.0;
                        write!(f, "\n    {percentage:>3.0}% {name}")?;
                    }
                }

                for (name, summary) in statistics.summaries() {
                    write!(
                        f,
                        "\n    {name}: min={:.1}, max={:.1}, avg={:.1}",
                        summary.min, summary.max, summary.mean
                    )?;
                }
                Ok(())
            }
            TestResult::Fail {
                counterexample,
                tests_run,
                shrinks_performed,
                property_name,
                failure,
                shrink_steps,
                seed,
            } => {
                let prop_name = property_name.as_deref().unwrap_or("property");
                writeln!(
                    f,
                    "  ✗ {prop_name} failed after {tests_run} tests \
                     and {shrinks_performed} shrinks."
                )?;

                if !shrink_steps.is_empty() {
                    writeln!(f)?;
                    writeln!(f, "    Shrinking progression:")?;
                    for step in shrink_steps {
                        if step.step == 0 {
                            writeln!(f, "      │ Original: {}", step.counterexample)?;
                        } else {
                            writeln!(
                                f,
                                "      │ Step {} (argument {}): {}",
                                step.step, step.position, step.counterexample
                            )?;
                        }
                    }
                    writeln!(f)?;
                }

                writeln!(f, "    === {failure} ===")?;
                writeln!(f, "    Minimal counterexample: {counterexample}")?;
                write!(f, "    Replay with BRAMBLE_SEED={seed}")
            }
            TestResult::GaveUp {
                tests_run,
                discards,
                property_name,
                reason,
                seed,
            } => {
                let prop_name = property_name.as_deref().unwrap_or("property");
                write!(
                    f,
                    "  ⚐ {prop_name} gave up after {tests_run} tests and {discards} discards: \
                     {reason} (seed {seed})"
                )
            }
            TestResult::Error {
                message,
                counterexample,
                tests_run,
                property_name,
                seed,
            } => {
                let prop_name = property_name.as_deref().unwrap_or("property");
                writeln!(f, "  ✗ {prop_name} raised an error after {tests_run} tests.")?;
                writeln!(f, "    === {message} ===")?;
                writeln!(f, "    Input: {counterexample}")?;
                write!(f, "    Replay with BRAMBLE_SEED={seed}")
            }
        }
    }
}
