use libm::erfc;
use ndarray::{Array1, ArrayBase, Data, Ix1, Ix2, Zip};

const SQRT_2PI: f64 = 2.5066282746310007;

/// Cumulative distribution function of Standard Normal at x
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Probability density function of Standard Normal at x
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / SQRT_2PI
}

// Domain handling functions
///////////////////////////////////////////////////////////////////////////////

/// Check `x` lies within `xlimits` given as a (nx, 2) matrix of [lower, upper] bounds
pub fn check_in_domain(
    x: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> bool {
    x.len() == xlimits.nrows()
        && Zip::from(x)
            .and(xlimits.rows())
            .all(|&xi, lims| lims[0] <= xi && xi <= lims[1])
}

/// Clip `x` componentwise to `xlimits` bounds
pub fn clip_to_bounds(
    x: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Array1<f64> {
    let mut clipped = x.to_owned();
    Zip::from(&mut clipped)
        .and(xlimits.rows())
        .for_each(|xi, lims| *xi = xi.clamp(lims[0], lims[1]));
    clipped
}

/// Same as [`clip_to_bounds`] working on a slice, used by local optimizers
pub fn clip_slice(x: &[f64], xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Vec<f64> {
    x.iter()
        .zip(xlimits.rows())
        .map(|(&xi, lims)| xi.clamp(lims[0], lims[1]))
        .collect()
}
