//! Property definitions and the trial loop.

use crate::data::Config;
use crate::error::{Failure, Result, SourceLocation, TestResult};
use crate::gen::Gen;
use crate::random::Random;
use crate::shrink::{minimize, Trees};
use crate::tree::Tree;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Once;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// What a single evaluation of a property concluded.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass,
    /// An assertion failed. Only this outcome is shrunk.
    Fail(Failure),
    /// The inputs are unsuitable; draw new ones.
    Discard,
    /// Stop the run early and report a pass.
    Succeed,
    /// Something unrelated to the property's assertions went wrong.
    Error(String),
}

impl Outcome {
    /// An assertion failure located at the caller.
    #[track_caller]
    pub fn fail(message: impl Into<String>) -> Self {
        Outcome::Fail(Failure::new(message))
    }

    /// `Pass` if `condition` holds, otherwise a located failure.
    #[track_caller]
    pub fn check(condition: bool, message: impl Into<String>) -> Self {
        if condition {
            Outcome::Pass
        } else {
            Outcome::fail(message)
        }
    }
}

/// Values a property body may return.
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome {
        self
    }
}

impl IntoOutcome for bool {
    fn into_outcome(self) -> Outcome {
        if self {
            Outcome::Pass
        } else {
            Outcome::Fail(Failure::unlocated("property returned false"))
        }
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Outcome::Pass
    }
}

impl<T, E> IntoOutcome for std::result::Result<T, E>
where
    T: IntoOutcome,
    E: Display,
{
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(value) => value.into_outcome(),
            Err(error) => Outcome::Error(error.to_string()),
        }
    }
}

/// The argument generators of a property.
///
/// Each generator is one argument, and each argument is shrunk as its own
/// position.
pub trait Generators: 'static {
    type Values: Clone + Debug + 'static;
    type Shrinks: Trees<Values = Self::Values>;

    fn generate(&self, random: &mut Random) -> Result<Self::Shrinks>;
}

impl<A> Generators for Gen<A>
where
    A: Clone + Debug + 'static,
{
    type Values = A;
    type Shrinks = Tree<A>;

    fn generate(&self, random: &mut Random) -> Result<Tree<A>> {
        Gen::generate(self, random)
    }
}

macro_rules! tuple_generators {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name),+> Generators for ($(Gen<$name>,)+)
        where
            $($name: Clone + Debug + 'static,)+
        {
            type Values = ($($name,)+);
            type Shrinks = ($(Tree<$name>,)+);

            fn generate(&self, random: &mut Random) -> Result<Self::Shrinks> {
                Ok(($(self.$idx.generate(random)?,)+))
            }
        }
    };
}

tuple_generators!(A: 0, B: 1);
tuple_generators!(A: 0, B: 1, C: 2);
tuple_generators!(A: 0, B: 1, C: 2, D: 3);
tuple_generators!(A: 0, B: 1, C: 2, D: 3, E: 4);

/// Statistics gathered during property testing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestStatistics {
    pub classifications: HashMap<String, usize>,
    pub collections: HashMap<String, Vec<f64>>,
    pub total_tests: usize,
}

/// Minimum, maximum and mean of one collected measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl TestStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_classification(&mut self, name: &str) {
        *self.classifications.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn record_collection(&mut self, name: &str, value: f64) {
        self.collections
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    /// Summaries of every collection, sorted by name. NaN samples are ignored.
    pub fn summaries(&self) -> Vec<(String, Summary)> {
        let mut summaries: Vec<(String, Summary)> = self
            .collections
            .iter()
            .filter_map(|(name, samples)| {
                let finite: Vec<f64> = samples.iter().copied().filter(|v| !v.is_nan()).collect();
                if finite.is_empty() {
                    return None;
                }
                let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
                let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mean = finite.iter().sum::<f64>() / finite.len() as f64;
                Some((name.clone(), Summary { min, max, mean }))
            })
            .collect();
        summaries.sort_by(|a, b| a.0.cmp(&b.0));
        summaries
    }
}

/// Diagnostics scoped to exactly one run.
#[derive(Debug, Default)]
pub struct RunContext {
    pub statistics: TestStatistics,
    /// The failure raised by the most recently accepted counterexample.
    pub last_failure: Option<Failure>,
}

type Predicate<T> = Rc<dyn Fn(&T) -> Outcome>;
type ClassificationFn<T> = Box<dyn Fn(&T) -> bool>;
type CollectionFn<T> = Box<dyn Fn(&T) -> f64>;

/// A property that can be tested with generated inputs.
pub struct Property<G: Generators> {
    generators: G,
    predicate: Predicate<G::Values>,
    name: Option<String>,
    variable_name: Option<String>,
    classifications: Vec<(String, ClassificationFn<G::Values>)>,
    collections: Vec<(String, CollectionFn<G::Values>)>,
}

impl<G: Generators> fmt::Debug for Property<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("variable_name", &self.variable_name)
            .finish_non_exhaustive()
    }
}

impl<G: Generators> Property<G> {
    /// Create a property over `generators` checked by `predicate`.
    pub fn for_all<F, O>(generators: G, predicate: F) -> Self
    where
        F: Fn(&G::Values) -> O + 'static,
        O: IntoOutcome,
    {
        Property {
            generators,
            predicate: Rc::new(move |values| predicate(values).into_outcome()),
            name: None,
            variable_name: None,
            classifications: Vec::new(),
            collections: Vec::new(),
        }
    }

    /// Like [`Property::for_all`], naming the input in reports.
    pub fn for_all_named<F, O>(generators: G, variable_name: &str, predicate: F) -> Self
    where
        F: Fn(&G::Values) -> O + 'static,
        O: IntoOutcome,
    {
        let mut property = Property::for_all(generators, predicate);
        property.variable_name = Some(variable_name.to_string());
        property
    }

    /// Name the property in reports.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Add a classification to categorize test inputs.
    pub fn classify<F>(mut self, name: &str, predicate: F) -> Self
    where
        F: Fn(&G::Values) -> bool + 'static,
    {
        self.classifications
            .push((name.to_string(), Box::new(predicate)));
        self
    }

    /// Add a collection to gather numerical statistics from test inputs.
    pub fn collect<F>(mut self, name: &str, extractor: F) -> Self
    where
        F: Fn(&G::Values) -> f64 + 'static,
    {
        self.collections
            .push((name.to_string(), Box::new(extractor)));
        self
    }

    /// Run this property with the given configuration.
    pub fn run(&self, config: &Config) -> TestResult {
        let seed = match config.resolve_seed() {
            Ok(seed) => seed,
            Err(error) => {
                return TestResult::Error {
                    message: error.to_string(),
                    counterexample: String::new(),
                    tests_run: 0,
                    property_name: self.name.clone(),
                    seed: 0,
                }
            }
        };
        debug!(
            seed,
            test_limit = config.test_limit,
            shrink_limit = config.shrink_limit,
            discard_limit = config.discard_limit,
            "starting property run"
        );

        let mut context = RunContext::default();
        let mut random = Random::from_seed(seed);
        let started = Instant::now();
        let mut tests_run = 0;
        let mut discards = 0;

        while tests_run < config.test_limit {
            if let Some(limit) = config.time_limit {
                if started.elapsed() >= limit {
                    warn!(tests_run, ?limit, "time limit reached, stopping early");
                    break;
                }
            }

            let snapshot = random.clone();
            let trees = match self.generators.generate(&mut random) {
                Ok(trees) => trees,
                Err(error) if error.is_discard() => {
                    discards += 1;
                    debug!(discards, "generation discarded");
                    if discards > config.discard_limit {
                        return self.give_up(tests_run, discards, seed);
                    }
                    continue;
                }
                Err(error) => {
                    return TestResult::Error {
                        message: error.to_string(),
                        counterexample: String::new(),
                        tests_run,
                        property_name: self.name.clone(),
                        seed,
                    }
                }
            };

            let values = trees.values();
            trace!(trial = tests_run + 1, input = ?values, "running trial");
            match self.evaluate(&values) {
                Outcome::Pass => {
                    tests_run += 1;
                    self.record_statistics(&values, &mut context.statistics);
                }
                Outcome::Succeed => {
                    tests_run += 1;
                    self.record_statistics(&values, &mut context.statistics);
                    debug!(tests_run, "property succeeded early");
                    break;
                }
                Outcome::Discard => {
                    discards += 1;
                    debug!(discards, "trial discarded");
                    if discards > config.discard_limit {
                        return self.give_up(tests_run, discards, seed);
                    }
                }
                Outcome::Error(message) => {
                    warn!(%message, "property raised an error");
                    return TestResult::Error {
                        message,
                        counterexample: self.describe(&values),
                        tests_run: tests_run + 1,
                        property_name: self.name.clone(),
                        seed,
                    };
                }
                Outcome::Fail(failure) => {
                    tests_run += 1;
                    info!(tests_run, input = ?values, "property falsified, shrinking");
                    let trees = self.replay(snapshot).unwrap_or(trees);
                    context.last_failure = Some(failure);
                    return self.shrink_failure(trees, tests_run, seed, config, context);
                }
            }
        }

        context.statistics.total_tests = tests_run;
        TestResult::Pass {
            tests_run,
            discards,
            property_name: self.name.clone(),
            statistics: context.statistics,
        }
    }

    /// Regenerate a trial's trees from the generator state saved before it.
    fn replay(&self, mut snapshot: Random) -> Result<G::Shrinks> {
        self.generators.generate(&mut snapshot)
    }

    fn shrink_failure(
        &self,
        trees: G::Shrinks,
        tests_run: usize,
        seed: u64,
        config: &Config,
        mut context: RunContext,
    ) -> TestResult {
        let minimized = minimize(trees, config.shrink_limit, |values| {
            match self.evaluate(values) {
                Outcome::Fail(failure) => {
                    context.last_failure = Some(failure);
                    true
                }
                _ => false,
            }
        });
        let counterexample = self.describe(&minimized.trees.values());
        info!(shrinks = minimized.shrinks, %counterexample, "shrinking complete");

        TestResult::Fail {
            counterexample,
            tests_run,
            shrinks_performed: minimized.shrinks,
            property_name: self.name.clone(),
            failure: context
                .last_failure
                .unwrap_or_else(|| Failure::unlocated("property failed")),
            shrink_steps: minimized.steps,
            seed,
        }
    }

    fn give_up(&self, tests_run: usize, discards: usize, seed: u64) -> TestResult {
        warn!(tests_run, discards, "too many discards, giving up");
        TestResult::GaveUp {
            tests_run,
            discards,
            property_name: self.name.clone(),
            reason: "discard limit exceeded".to_string(),
            seed,
        }
    }

    fn describe(&self, values: &G::Values) -> String {
        match &self.variable_name {
            Some(name) => format!("{name} = {values:?}"),
            None => format!("{values:?}"),
        }
    }

    fn record_statistics(&self, values: &G::Values, statistics: &mut TestStatistics) {
        for (name, predicate) in &self.classifications {
            if predicate(values) {
                statistics.record_classification(name);
            }
        }
        for (name, extractor) in &self.collections {
            statistics.record_collection(name, extractor(values));
        }
    }

    /// Invoke the predicate, turning a panic into an assertion failure.
    fn evaluate(&self, values: &G::Values) -> Outcome {
        install_panic_hook();
        let was_quiet = QUIET_PANICS.with(|quiet| quiet.replace(true));
        let result = panic::catch_unwind(AssertUnwindSafe(|| (self.predicate)(values)));
        QUIET_PANICS.with(|quiet| quiet.set(was_quiet));

        match result {
            Ok(outcome) => outcome,
            Err(payload) => {
                Outcome::Fail(Failure {
                    message: panic_message(payload.as_ref()),
                    location: PANIC_LOCATION.with(|slot| slot.borrow_mut().take()),
                })
            }
        }
    }
}

/// Create a property whose predicate reports an [`Outcome`] directly.
pub fn property<G, F>(generators: G, predicate: F) -> Property<G>
where
    G: Generators,
    F: Fn(&G::Values) -> Outcome + 'static,
{
    Property::for_all(generators, predicate)
}

/// Create a property that checks a condition for all generated inputs.
pub fn for_all<G, F, O>(generators: G, predicate: F) -> Property<G>
where
    G: Generators,
    F: Fn(&G::Values) -> O + 'static,
    O: IntoOutcome,
{
    Property::for_all(generators, predicate)
}

/// Create a property with a named input.
pub fn for_all_named<G, F, O>(generators: G, variable_name: &str, predicate: F) -> Property<G>
where
    G: Generators,
    F: Fn(&G::Values) -> O + 'static,
    O: IntoOutcome,
{
    Property::for_all_named(generators, variable_name, predicate)
}

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
    static PANIC_LOCATION: RefCell<Option<SourceLocation>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Silence panic output raised inside predicates on this thread, keeping
/// the location for the report. Other panics reach the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if QUIET_PANICS.with(Cell::get) {
                let location = info.location().map(SourceLocation::from);
                PANIC_LOCATION.with(|slot| *slot.borrow_mut() = location);
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
