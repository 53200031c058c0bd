use super::InfillCriterion;
use crate::errors::Result;
use crate::types::InfillObjData;
use crate::utils::{norm_cdf, norm_pdf};

use ndarray::ArrayView1;
use safebo_gp::Surrogate;
use serde::{Deserialize, Serialize};

/// Expected improvement of a gaussian posterior `N(f_mu, f_sigma^2)` over `f_best + f_slack`
/// (maximization).
///
/// Can be slightly negative when `f_slack > 0` and the posterior mean is well below the incumbent.
pub fn expected_improvement(f_mu: f64, f_sigma: f64, f_best: f64, f_slack: f64) -> f64 {
    let diff = f_mu - f_best - f_slack;
    let z = diff / f_sigma;
    diff * norm_cdf(z) + f_sigma * norm_pdf(z)
}

/// Probability that a gaussian posterior `N(v_mu, v_sigma^2)` exceeds `v_min + v_slack`
pub fn probability_of_feasibility(v_mu: f64, v_sigma: f64, v_min: f64, v_slack: f64) -> f64 {
    norm_cdf((v_mu - v_min - v_slack) / v_sigma)
}

/// Constrained expected improvement: expected improvement of the objective
/// weighted by the probability of feasibility of the constraint.
///
/// The criterion vanishes where the constraint is confidently violated
/// as well as where no objective improvement is expected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstrainedEi;

impl InfillCriterion for ConstrainedEi {
    fn name(&self) -> &'static str {
        "CEI"
    }

    fn value(
        &self,
        x: &ArrayView1<f64>,
        obj_model: &dyn Surrogate,
        cstr_model: &dyn Surrogate,
        infill_data: &InfillObjData,
    ) -> Result<f64> {
        let (f_mu, f_sigma) = obj_model.predict(x)?;
        let (v_mu, v_sigma) = cstr_model.predict(x)?;
        let pof = probability_of_feasibility(
            v_mu,
            v_sigma,
            infill_data.v_min,
            infill_data.v_slack,
        );
        let ei = expected_improvement(f_mu, f_sigma, infill_data.f_best, infill_data.f_slack);
        Ok(ei * pof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::fmt;

    /// Surrogate with a constant posterior
    #[derive(Debug)]
    struct ConstSurrogate {
        mean: f64,
        std: f64,
    }

    impl fmt::Display for ConstSurrogate {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "Const({}, {})", self.mean, self.std)
        }
    }

    impl Surrogate for ConstSurrogate {
        fn predict(&self, _x: &ArrayView1<f64>) -> safebo_gp::Result<(f64, f64)> {
            Ok((self.mean, self.std))
        }
        fn n_samples(&self) -> usize {
            1
        }
        fn dim(&self) -> usize {
            1
        }
    }

    fn infill_data() -> InfillObjData {
        InfillObjData {
            f_best: 0.,
            v_min: 1.2,
            f_slack: 0.01,
            v_slack: 0.,
        }
    }

    #[test]
    fn test_expected_improvement() {
        // No slack, mean at incumbent: EI = sigma * pdf(0)
        assert_abs_diff_eq!(
            expected_improvement(1., 2., 1., 0.),
            2. * norm_pdf(0.),
            epsilon = 1e-15
        );
        // Confident large improvement: EI ~ mean - best
        assert_abs_diff_eq!(expected_improvement(10., 1e-3, 1., 0.), 9., epsilon = 1e-9);
        // Confident no improvement
        assert_abs_diff_eq!(expected_improvement(-10., 0.1, 1., 0.), 0., epsilon = 1e-12);
    }

    #[test]
    fn test_probability_of_feasibility() {
        assert_abs_diff_eq!(probability_of_feasibility(1.2, 0.5, 1.2, 0.), 0.5);
        assert!(probability_of_feasibility(3., 0.1, 1.2, 0.) > 0.999_999);
        assert!(probability_of_feasibility(3., 0.1, 1.2, 2.) < 1e-6);
    }

    #[test]
    fn test_feasibility_gate_dominates() {
        let x = array![1.0];
        let cstr = ConstSurrogate { mean: -5., std: 0.1 };
        for (mean, std) in [(10., 0.1), (100., 5.), (0., 10.)] {
            let obj = ConstSurrogate { mean, std };
            let v = ConstrainedEi
                .value(&x.view(), &obj, &cstr, &infill_data())
                .unwrap();
            assert_abs_diff_eq!(v, 0., epsilon = 1e-12);
        }
    }

    #[test]
    fn test_improvement_gate_dominates() {
        let x = array![1.0];
        let obj = ConstSurrogate { mean: -10., std: 0.1 };
        for (mean, std) in [(10., 0.1), (1.2, 1.), (-3., 2.)] {
            let cstr = ConstSurrogate { mean, std };
            let v = ConstrainedEi
                .value(&x.view(), &obj, &cstr, &infill_data())
                .unwrap();
            assert_abs_diff_eq!(v, 0., epsilon = 1e-12);
        }
    }

    #[test]
    fn test_criterion_is_product() {
        let x = array![1.0];
        let obj = ConstSurrogate { mean: 0.5, std: 0.3 };
        let cstr = ConstSurrogate { mean: 1.5, std: 0.2 };
        let v = ConstrainedEi
            .value(&x.view(), &obj, &cstr, &infill_data())
            .unwrap();
        let expected = expected_improvement(0.5, 0.3, 0., 0.01)
            * probability_of_feasibility(1.5, 0.2, 1.2, 0.);
        assert_abs_diff_eq!(v, expected, epsilon = 1e-15);
        assert!(v > 0.);
    }
}
