//! Append-only store of the evaluated points.

use crate::types::Observation;

use ndarray::{Array1, Array2};
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};

/// Observations in arrival order. Entries are never mutated or removed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationStore {
    observations: Vec<Observation>,
}

impl ObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observation
    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// A copy of the store extended with `observation`
    pub fn with(&self, observation: Observation) -> Self {
        let mut store = self.clone();
        store.push(observation);
        store
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Observation> {
        self.observations.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Input dimension, `None` when empty
    pub fn dim(&self) -> Option<usize> {
        self.observations.first().map(|o| o.x().len())
    }

    /// Inputs as a (n, nx) matrix
    pub fn x_data(&self) -> Array2<f64> {
        let nx = self.dim().unwrap_or(0);
        let mut x_data = Array2::zeros((self.len(), nx));
        for (mut row, obs) in x_data.rows_mut().into_iter().zip(self.iter()) {
            row.assign(obs.x());
        }
        x_data
    }

    /// Objective values
    pub fn f_data(&self) -> Array1<f64> {
        self.iter().map(|o| o.f()).collect()
    }

    /// Constraint values
    pub fn v_data(&self) -> Array1<f64> {
        self.iter().map(|o| o.v()).collect()
    }

    /// Best objective value observed so far regardless of the constraint
    pub fn incumbent(&self) -> Option<f64> {
        self.f_data().max().ok().copied()
    }

    /// Index and observation with the best objective value among the
    /// observations satisfying `v >= v_min`. First recorded wins ties.
    pub fn best_feasible(&self, v_min: f64) -> Option<(usize, &Observation)> {
        self.iter()
            .enumerate()
            .filter(|(_, o)| o.is_feasible(v_min))
            .fold(None, |best: Option<(usize, &Observation)>, (i, o)| match best {
                Some((_, b)) if b.f() >= o.f() => best,
                _ => Some((i, o)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn obs(x: f64, f: f64, v: f64) -> Observation {
        Observation::new(array![x], f, v)
    }

    #[test]
    fn test_store_derives_parallel_data() {
        let mut store = ObservationStore::new();
        assert!(store.is_empty());
        assert_eq!(store.incumbent(), None);
        assert_eq!(store.x_data().dim(), (0, 0));
        store.push(obs(1.0, 2.0, 1.5));
        store.push(obs(3.0, 5.0, 1.0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.x_data(), array![[1.0], [3.0]]);
        assert_eq!(store.f_data(), array![2.0, 5.0]);
        assert_eq!(store.v_data(), array![1.5, 1.0]);
        assert_eq!(store.incumbent(), Some(5.0));
    }

    #[test]
    fn test_best_feasible() {
        let mut store = ObservationStore::new();
        store.push(obs(1.0, 2.0, 1.5));
        store.push(obs(3.0, 5.0, 1.3));
        store.push(obs(4.0, 9.0, 1.0));
        let (i, best) = store.best_feasible(1.2).unwrap();
        assert_eq!(i, 1);
        assert_eq!(best.x(), &array![3.0]);
        assert!(store.best_feasible(2.0).is_none());
    }

    #[test]
    fn test_best_feasible_threshold_is_inclusive_and_ties_keep_first() {
        let mut store = ObservationStore::new();
        store.push(obs(0.5, 1.0, 1.2));
        store.push(obs(2.5, 1.0, 2.0));
        let (i, _) = store.best_feasible(1.2).unwrap();
        assert_eq!(i, 0);
    }

    #[test]
    fn test_with_does_not_modify_store() {
        let store = ObservationStore::new();
        let extended = store.with(obs(1.0, 0.0, 0.0));
        assert_eq!(store.len(), 0);
        assert_eq!(extended.len(), 1);
    }
}
