use std::{fmt, sync::Arc};

use crate::{partition::Partition, tree::PopulationBounds};

/// A named predicate every partition in a chain must satisfy.
#[derive(Clone)]
pub struct Constraint {
    name: Arc<str>,
    check: Arc<dyn Fn(&Partition) -> bool + Send + Sync>,
}

impl Constraint {
    pub fn new(name: &str, check: impl Fn(&Partition) -> bool + Send + Sync + 'static) -> Self {
        Self { name: name.into(), check: Arc::new(check) }
    }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn check(&self, partition: &Partition) -> bool { (self.check)(partition) }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Decides whether a proposal that passed every constraint is taken.
#[derive(Clone)]
pub struct Acceptance(Arc<dyn Fn(&Partition) -> bool + Send + Sync>);

impl Acceptance {
    pub fn new(accept: impl Fn(&Partition) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(accept))
    }

    #[inline] pub fn accept(&self, partition: &Partition) -> bool { (self.0)(partition) }
}

impl fmt::Debug for Acceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Acceptance")
    }
}

/// Take every proposal that passes the constraints.
pub fn always_accept() -> Acceptance {
    Acceptance::new(|_| true)
}

/// Every district's `series` total strictly within `epsilon` of the ideal, where the ideal
/// is the `initial` partition's total over its district count.
/// A partition lacking the series fails.
pub fn within_percent_of_ideal_population(initial: &Partition, epsilon: f64, series: &str) -> Constraint {
    let ideal = initial.tallies(series)
        .map(|tallies| tallies.iter().sum::<f64>() / initial.num_districts() as f64)
        .unwrap_or(f64::NAN);
    let bounds = PopulationBounds::around(ideal, epsilon);
    let series = series.to_string();

    Constraint::new("within_percent_of_ideal_population", move |partition| {
        partition.tallies(&series)
            .is_some_and(|tallies| tallies.iter().all(|&p| bounds.contains(p)))
    })
}

/// Every district induces a connected subgraph.
pub fn contiguous() -> Constraint {
    Constraint::new("contiguous", Partition::is_contiguous)
}
