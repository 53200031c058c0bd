//! Safe EGO optimizer service.
//!
//! Implements the optimizer as a service, the caller being in charge of the
//! evaluation of the objective and the constraint. The interaction follows an
//! ask-and-tell pattern: record each evaluated point with
//! [`SafeBoService::add_observation()`], ask for the next point to evaluate with
//! [`SafeBoService::next_point()`] and finally get the recommendation with
//! [`SafeBoService::best_answer()`].
//!
//! ```no_run
//! use ndarray::array;
//! use safebo_ego::{SafeBoConfig, SafeBoService};
//!
//! let f = |x: f64| -(x - 2.5).abs();
//! let v = |_x: f64| 2.0;
//!
//! let config = SafeBoConfig::default()
//!     .xlimits(&array![[0., 5.]])
//!     .seed(42)
//!     .check()
//!     .expect("valid configuration");
//! let mut service = SafeBoService::new(config);
//!
//! // a safe initial point
//! service.add_observation(&array![0.7], f(0.7), v(0.7)).unwrap();
//! for _ in 0..20 {
//!     let x = service.next_point().unwrap();
//!     service.add_observation(&x, f(x[0]), v(x[0])).unwrap();
//! }
//! let x_best = service.best_answer().unwrap();
//! println!("best point {x_best}");
//! ```
use crate::criteria::{ConstrainedEi, InfillCriterion};
use crate::errors::{EgoError, Result};
use crate::solver::config::ValidSafeBoConfig;
use crate::solver::observation_store::ObservationStore;
use crate::solver::solver_infill_optim::{
    optimize_infill_criterion, GlobalMultiStarter, InfillOptProblem, LocalOptimSettings,
};
use crate::surrogates::SurrogateOracle;
use crate::types::{InfillObjData, Observation};
use crate::utils::{check_in_domain, SAFEBO_LOG};

use env_logger::{Builder, Env};
use log::{debug, info};
use ndarray::{Array1, ArrayBase, Data, Ix1};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use safebo_gp::{correlation_models::Matern52Corr, GpParams, Surrogate, SurrogateBuilder};

/// Safe constrained Bayesian optimizer used as a service.
///
/// Both surrogates are refitted from the whole history each time an observation
/// is recorded, hence every query sees models consistent with the recorded data.
pub struct SafeBoService<SB: SurrogateBuilder = GpParams<Matern52Corr>> {
    config: ValidSafeBoConfig<SB>,
    store: ObservationStore,
    obj_oracle: SurrogateOracle<SB>,
    cstr_oracle: SurrogateOracle<SB>,
    criterion: ConstrainedEi,
    rng: Xoshiro256Plus,
}

impl<SB: SurrogateBuilder> SafeBoService<SB> {
    /// Constructor of the optimization service given a validated configuration.
    ///
    /// Logging is initialized from the `SAFEBO_LOG` environment variable
    /// (default level: info) unless a logger is already installed.
    pub fn new(config: ValidSafeBoConfig<SB>) -> Self {
        let env = Env::new().filter_or(SAFEBO_LOG, "info");
        let mut builder = Builder::from_env(env);
        let builder = builder.target(env_logger::Target::Stdout);
        builder.try_init().ok();

        let rng = match config.seed() {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };
        let obj_oracle = SurrogateOracle::new("Objective", config.objective_gp().clone());
        let cstr_oracle = SurrogateOracle::new("Constraint", config.constraint_gp().clone());
        SafeBoService {
            config,
            store: ObservationStore::new(),
            obj_oracle,
            cstr_oracle,
            criterion: ConstrainedEi,
            rng,
        }
    }

    /// Constructor using the given surrogate configurations in place of the
    /// ones of `config`
    pub fn with_builders(mut config: ValidSafeBoConfig<SB>, objective_gp: SB, constraint_gp: SB) -> Self {
        config.0.objective_gp = objective_gp;
        config.0.constraint_gp = constraint_gp;
        Self::new(config)
    }

    /// Validated configuration of the service
    pub fn config(&self) -> &ValidSafeBoConfig<SB> {
        &self.config
    }

    /// Recorded observations
    pub fn observations(&self) -> &ObservationStore {
        &self.store
    }

    pub fn n_observations(&self) -> usize {
        self.store.len()
    }

    fn check_observation(
        &self,
        x: &ArrayBase<impl Data<Elem = f64>, Ix1>,
        f: f64,
        v: f64,
    ) -> Result<()> {
        if x.len() != self.config.dim() {
            return Err(EgoError::InvalidObservation {
                n_obs: self.store.len(),
                reason: format!(
                    "expected a point of dimension {}, got {}",
                    self.config.dim(),
                    x.len()
                ),
            });
        }
        if !check_in_domain(x, self.config.xlimits()) {
            return Err(EgoError::InvalidObservation {
                n_obs: self.store.len(),
                reason: format!("point {x} is outside of the domain"),
            });
        }
        if !f.is_finite() || !v.is_finite() {
            return Err(EgoError::InvalidObservation {
                n_obs: self.store.len(),
                reason: format!(
                    "objective and constraint values should be finite, got f={f}, v={v}"
                ),
            });
        }
        Ok(())
    }

    /// Train both surrogates on the given history, in parallel
    fn train_oracles(
        &self,
        store: &ObservationStore,
    ) -> Result<(Box<dyn Surrogate>, Box<dyn Surrogate>)> {
        let xt = store.x_data();
        let ft = store.f_data();
        let vt = store.v_data();
        let (obj_model, cstr_model) = rayon::join(
            || self.obj_oracle.train(xt.view(), ft.view()),
            || self.cstr_oracle.train(xt.view(), vt.view()),
        );
        Ok((obj_model?, cstr_model?))
    }

    /// Record the evaluation `(f, v)` at `x` and refit both surrogates on the
    /// whole history.
    ///
    /// The update is atomic: when the observation is rejected or a surrogate
    /// cannot be fitted, the history and the models are left unchanged.
    pub fn add_observation(
        &mut self,
        x: &ArrayBase<impl Data<Elem = f64>, Ix1>,
        f: f64,
        v: f64,
    ) -> Result<()> {
        self.check_observation(x, f, v)?;
        let store = self.store.with(Observation::new(x.to_owned(), f, v));
        let (obj_model, cstr_model) = self.train_oracles(&store)?;
        self.store = store;
        self.obj_oracle.install(obj_model);
        self.cstr_oracle.install(cstr_model);
        info!(
            "Observation #{} recorded: x={x}, f={f}, v={v}{}",
            self.store.len(),
            if v >= self.config.v_min() {
                ""
            } else {
                " (unsafe)"
            }
        );
        Ok(())
    }

    /// Refit both surrogates on the recorded history.
    ///
    /// Models are only replaced when both fits succeed.
    pub fn refit(&mut self) -> Result<()> {
        self.fitted_models("refit")?;
        let (obj_model, cstr_model) = self.train_oracles(&self.store)?;
        self.obj_oracle.install(obj_model);
        self.cstr_oracle.install(cstr_model);
        Ok(())
    }

    fn fitted_models(&self, operation: &'static str) -> Result<(&dyn Surrogate, &dyn Surrogate)> {
        match (self.obj_oracle.model(), self.cstr_oracle.model()) {
            (Some(obj), Some(cstr)) if !self.store.is_empty() => Ok((obj, cstr)),
            _ => Err(EgoError::InvalidState {
                operation,
                n_obs: self.store.len(),
                reason: "surrogates are fitted once an observation is recorded".to_string(),
            }),
        }
    }

    fn infill_data(&self, operation: &'static str) -> Result<InfillObjData> {
        let f_best = self.store.incumbent().ok_or(EgoError::InvalidState {
            operation,
            n_obs: 0,
            reason: "no observation recorded".to_string(),
        })?;
        Ok(InfillObjData {
            f_best,
            v_min: self.config.v_min(),
            f_slack: self.config.f_slack(),
            v_slack: self.config.v_slack(),
        })
    }

    /// Acquisition value at `x`: expected improvement over the best recorded
    /// objective value weighted by the probability of feasibility.
    pub fn acquisition(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> Result<f64> {
        let (obj_model, cstr_model) = self.fitted_models("acquisition")?;
        let infill_data = self.infill_data("acquisition")?;
        self.criterion
            .value(&x.view(), obj_model, cstr_model, &infill_data)
    }

    /// Objective surrogate posterior `(mean, std)` at `x`
    pub fn predict_objective(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> Result<(f64, f64)> {
        self.fitted_models("predict_objective")?;
        self.obj_oracle.predict(&x.view())
    }

    /// Constraint surrogate posterior `(mean, std)` at `x`
    pub fn predict_constraint(
        &self,
        x: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    ) -> Result<(f64, f64)> {
        self.fitted_models("predict_constraint")?;
        self.cstr_oracle.predict(&x.view())
    }

    /// Propose the next point to evaluate as the maximizer of the acquisition
    /// over the domain, found by multistart local optimizations.
    ///
    /// The service is not modified apart from its random generator state, which
    /// only advances when a point is actually searched for: the returned point is
    /// not recorded until the caller gives its evaluation.
    pub fn next_point(&mut self) -> Result<Array1<f64>> {
        let infill_data = self.infill_data("next_point")?;
        self.fitted_models("next_point")?;
        // rejected calls leave the generator untouched
        let seed = self.rng.r#gen::<u64>();
        let (obj_model, cstr_model) = self.fitted_models("next_point")?;
        debug!("Infill data: {infill_data:?}");

        let multistarter =
            GlobalMultiStarter::new(self.config.xlimits(), Xoshiro256Plus::seed_from_u64(seed));
        let problem = InfillOptProblem::new(&self.criterion, obj_model, cstr_model, &infill_data);
        let settings = LocalOptimSettings {
            max_iters: self.config.max_local_iters(),
            memory: self.config.lbfgs_memory(),
        };
        let (value, x) = optimize_infill_criterion(
            &problem,
            multistarter,
            self.config.xlimits(),
            self.config.n_start(),
            settings,
            self.store.len(),
        )?;
        info!(
            "{} criterion max found = {value} at x={x}",
            self.criterion.name()
        );
        Ok(x)
    }

    /// Best feasible observation: highest objective value among observations
    /// with a constraint value reaching the safety threshold.
    pub fn best_observation(&self) -> Result<&Observation> {
        self.store
            .best_feasible(self.config.v_min())
            .map(|(_, obs)| obs)
            .ok_or(EgoError::NoFeasiblePoint {
                n_obs: self.store.len(),
                v_min: self.config.v_min(),
            })
    }

    /// Recommended solution: location of the best feasible observation
    pub fn best_answer(&self) -> Result<Array1<f64>> {
        self.best_observation().map(|obs| obs.x().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::config::SafeBoConfig;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn service() -> SafeBoService {
        let config = SafeBoConfig::default()
            .xlimits(&array![[0., 5.]])
            .seed(42)
            .check()
            .unwrap();
        SafeBoService::new(config)
    }

    #[test]
    fn test_queries_before_any_observation_fail() {
        let mut service = service();
        assert!(matches!(
            service.next_point(),
            Err(EgoError::InvalidState {
                operation: "next_point",
                n_obs: 0,
                ..
            })
        ));
        assert!(matches!(
            service.acquisition(&array![1.]),
            Err(EgoError::InvalidState { .. })
        ));
        assert!(matches!(
            service.predict_objective(&array![1.]),
            Err(EgoError::InvalidState { .. })
        ));
        assert!(matches!(service.refit(), Err(EgoError::InvalidState { .. })));
        assert!(matches!(
            service.best_answer(),
            Err(EgoError::NoFeasiblePoint { n_obs: 0, .. })
        ));
    }

    #[test]
    fn test_no_feasible_point() {
        let mut service = service();
        service.add_observation(&array![2.], 3.0, 1.0).unwrap();
        assert!(matches!(
            service.best_answer(),
            Err(EgoError::NoFeasiblePoint { n_obs: 1, .. })
        ));
    }

    #[test]
    fn test_best_answer_is_best_feasible() {
        let mut service = service();
        service.add_observation(&array![1.], 2.0, 1.5).unwrap();
        service.add_observation(&array![3.], 5.0, 1.3).unwrap();
        assert_eq!(service.best_answer().unwrap(), array![3.]);
        // better objective but unsafe
        service.add_observation(&array![4.], 9.0, 1.0).unwrap();
        assert_eq!(service.best_answer().unwrap(), array![3.]);
        assert_eq!(service.best_observation().unwrap().f(), 5.0);
    }

    #[test]
    fn test_add_observation_grows_history_and_refits() {
        let mut service = service();
        service.add_observation(&array![1.], -1.5, 2.0).unwrap();
        assert_eq!(service.n_observations(), 1);
        let (m1, _) = service.predict_objective(&array![1.]).unwrap();
        service.add_observation(&array![1.05], 1.0, 2.0).unwrap();
        assert_eq!(service.n_observations(), 2);
        let (m2, _) = service.predict_objective(&array![1.]).unwrap();
        assert!(m2 > m1);
        assert_eq!(service.observations().get(1).unwrap().x(), &array![1.05]);
    }

    #[test]
    fn test_invalid_observations_are_rejected() {
        let mut service = service();
        service.add_observation(&array![1.], -1.5, 2.0).unwrap();
        for (x, f, v) in [
            (array![6.], 0., 2.),
            (array![1., 2.], 0., 2.),
            (array![2.], f64::NAN, 2.),
            (array![2.], 0., f64::INFINITY),
        ] {
            assert!(matches!(
                service.add_observation(&x, f, v),
                Err(EgoError::InvalidObservation { n_obs: 1, .. })
            ));
        }
        assert_eq!(service.n_observations(), 1);
    }

    #[test]
    fn test_failed_fit_leaves_service_unchanged() {
        // duplicated point with a near zero objective noise makes the fit fail
        let config = SafeBoConfig::default()
            .xlimits(&array![[0., 5.]])
            .objective_gp(
                GpParams::new(Matern52Corr::new(0.25))
                    .noise_level(0.)
                    .jitter(0.),
            )
            .check()
            .unwrap();
        let mut fragile = SafeBoService::new(config);
        fragile.add_observation(&array![1.], -1.5, 2.0).unwrap();
        assert!(matches!(
            fragile.add_observation(&array![1.], -1.0, 2.0),
            Err(EgoError::FitError { n_obs: 2, .. })
        ));
        assert_eq!(fragile.n_observations(), 1);
        assert_eq!(fragile.observations().get(0).unwrap().f(), -1.5);
        assert!(fragile.predict_objective(&array![1.]).is_ok());
    }

    #[test]
    fn test_with_builders_overrides_surrogates() {
        let config = SafeBoConfig::default()
            .xlimits(&array![[0., 5.]])
            .check()
            .unwrap();
        let cstr = GpParams::new(Matern52Corr::new(0.25)).prior_mean(-3.);
        let mut service = SafeBoService::with_builders(config, GpParams::default(), cstr.clone());
        assert_eq!(service.config().constraint_gp(), &cstr);
        service.add_observation(&array![0.5], 0., 2.0).unwrap();
        let (v_mu, _) = service.predict_constraint(&array![4.5]).unwrap();
        assert_abs_diff_eq!(v_mu, -3., epsilon = 1e-6);
    }

    #[test]
    fn test_acquisition_is_consistent_with_models() {
        let mut service = service();
        service.add_observation(&array![1.], -1.5, 2.0).unwrap();
        service.add_observation(&array![2.2], -0.3, 2.0).unwrap();
        let x = array![2.4];
        let (f_mu, f_sigma) = service.predict_objective(&x).unwrap();
        let (v_mu, v_sigma) = service.predict_constraint(&x).unwrap();
        let expected = crate::criteria::expected_improvement(f_mu, f_sigma, -0.3, 0.01)
            * crate::criteria::probability_of_feasibility(v_mu, v_sigma, 1.2, 0.);
        assert_abs_diff_eq!(service.acquisition(&x).unwrap(), expected, epsilon = 1e-12);
        assert!(f_sigma > 0. && v_sigma > 0.);
    }

    #[test]
    fn test_next_point_within_domain_and_not_recorded() {
        let mut service = service();
        service.add_observation(&array![0.7], -1.8, 2.0).unwrap();
        let x = service.next_point().unwrap();
        assert_eq!(x.len(), 1);
        assert!((0. ..=5.).contains(&x[0]));
        assert_eq!(service.n_observations(), 1);
        assert!(service.acquisition(&x).unwrap() >= 0.);
    }

    #[test]
    fn test_rejected_next_point_keeps_proposals_reproducible() {
        let mut rejected = service();
        assert!(rejected.next_point().is_err());
        let mut fresh = service();
        for service in [&mut rejected, &mut fresh] {
            service.add_observation(&array![1.], -1.5, 2.0).unwrap();
        }
        assert_eq!(rejected.next_point().unwrap(), fresh.next_point().unwrap());
    }

    #[test]
    fn test_next_point_reproducible_with_seed() {
        let propose = || {
            let mut service = service();
            service.add_observation(&array![0.7], -1.8, 2.0).unwrap();
            service.add_observation(&array![4.1], -1.6, 2.0).unwrap();
            (service.next_point().unwrap(), service.next_point().unwrap())
        };
        assert_eq!(propose(), propose());
    }
}
