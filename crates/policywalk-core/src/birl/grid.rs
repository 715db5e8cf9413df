use ndarray::{Array1, ArrayBase, Data, Dimension};
use rand::Rng;

/// Snap a value onto the lattice `k * step_size`, rounding half away from zero.
pub fn stick_to_grid(uncorrected: f64, step_size: f64) -> f64 {
    (uncorrected / step_size).round() * step_size
}

/// Snap every element of an array onto the `step_size` lattice.
pub(crate) fn stick_array_to_grid<S, D>(
    uncorrected: &ArrayBase<S, D>,
    step_size: f64,
) -> ndarray::Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    uncorrected.mapv(|value| stick_to_grid(value, step_size))
}

/// Draw `+1.0` or `-1.0` with equal probability.
pub(crate) fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(0.5) { 1.0 } else { -1.0 }
}

/// Move every coordinate by an independent `±step` and clamp to `[-bound, bound]`.
pub(crate) fn step_clamped<S, D, R>(
    current: &ArrayBase<S, D>,
    step: f64,
    bound: f64,
    rng: &mut R,
) -> ndarray::Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
    R: Rng + ?Sized,
{
    current.mapv(|value| (value + random_direction(rng) * step).clamp(-bound, bound))
}

/// Flatten an array into a row-major vector.
pub(crate) fn flatten<S, D>(array: &ArrayBase<S, D>) -> Array1<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    array.iter().copied().collect()
}
