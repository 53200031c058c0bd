//! Safe optimization of a 1D toy problem.
//!
//! Maximizes `f(x) = -|x - 2.5|` over `[0, 5]` with a constant constraint
//! `v(x) = 2` starting from a random safe point, then reports the regret of the
//! recommended solution.
//!
//! Run with `SAFEBO_LOG=debug cargo run --example toy_problem` to see details.
use ndarray::{array, Array};
use ndarray_rand::rand::seq::SliceRandom;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use safebo_ego::utils::check_in_domain;
use safebo_ego::{SafeBoConfig, SafeBoService, DEFAULT_V_MIN};

const N_ITERS: usize = 20;

fn f(x: f64) -> f64 {
    -(x - 2.5).abs()
}

fn v(_x: f64) -> f64 {
    2.0
}

fn main() -> safebo_ego::Result<()> {
    let xlimits = array![[0., 5.]];

    // pick a safe initial point at random on a regular grid
    let mut rng = Xoshiro256Plus::seed_from_u64(0);
    let mut safe_points: Vec<f64> = Array::linspace(0., 5., 4000)
        .into_iter()
        .filter(|&x| v(x) >= DEFAULT_V_MIN)
        .collect();
    safe_points.shuffle(&mut rng);
    let x_init = *safe_points.first().expect("at least one safe point");

    let config = SafeBoConfig::default().xlimits(&xlimits).seed(0).check()?;
    let mut service = SafeBoService::new(config);
    service.add_observation(&array![x_init], f(x_init), v(x_init))?;

    for i in 0..N_ITERS {
        let x = service.next_point()?;
        assert!(check_in_domain(&x, &xlimits), "proposed point outside of the domain");
        let (fx, vx) = (f(x[0]), v(x[0]));
        println!("Iteration {:>2}: x = {:.4} f = {fx:.4} v = {vx:.4}", i + 1, x[0]);
        service.add_observation(&x, fx, vx)?;
    }

    let x_best = service.best_answer()?;
    assert!(check_in_domain(&x_best, &xlimits), "solution outside of the domain");
    let f_opt = f(2.5);
    let regret = if v(x_best[0]) < DEFAULT_V_MIN {
        1.
    } else {
        f_opt - f(x_best[0])
    };
    println!("Optimal value: {f_opt}");
    println!("Proposed solution: {x_best}");
    println!("Solution value: {}", f(x_best[0]));
    println!("Regret: {regret}");
    if regret < 0.2 {
        println!("Regret below 0.2");
    }
    Ok(())
}
