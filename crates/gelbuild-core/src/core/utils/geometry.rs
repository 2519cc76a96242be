use nalgebra::{Point3, Vector3};
use rand::Rng;
use thiserror::Error;

const NEAR_ZERO: f64 = 1e-9;
const DIRECTION_JITTER: f64 = 0.02;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Plane normal is undefined: the spanning vectors are colinear or coincident")]
    DegeneratePlane,
}

/// Returns `n` points evenly spaced strictly between `a` and `b`.
///
/// Point `i` (1-based) is `a + i * (b - a) / (n + 1)`.
pub fn interpolate(n: usize, a: &Point3<f64>, b: &Point3<f64>) -> Vec<Point3<f64>> {
    let step = (b - a) / (n as f64 + 1.0);
    (1..=n).map(|i| a + step * i as f64).collect()
}

/// Minimum-image displacement from `pi` to `pj` in a cubic box of edge `box_length`.
///
/// A non-positive `box_length` disables wrapping and returns the plain difference.
pub fn minimum_image_vector(pi: &Point3<f64>, pj: &Point3<f64>, box_length: f64) -> Vector3<f64> {
    let delta = pj - pi;
    if box_length <= 0.0 {
        return delta;
    }
    delta.map(|component| {
        let s = component / box_length;
        (s - s.round()) * box_length
    })
}

/// Squared norm of [`minimum_image_vector`].
pub fn minimum_image_sq_distance(pi: &Point3<f64>, pj: &Point3<f64>, box_length: f64) -> f64 {
    minimum_image_vector(pi, pj, box_length).norm_squared()
}

/// Unit normal of the plane spanned by `pi -> pj` and `pi -> pk`.
///
/// # Errors
///
/// Returns [`GeometryError::DegeneratePlane`] if the two vectors are (nearly) colinear.
pub fn plane_normal(
    pi: &Point3<f64>,
    pj: &Point3<f64>,
    pk: &Point3<f64>,
    box_length: f64,
) -> Result<Vector3<f64>, GeometryError> {
    let r1 = minimum_image_vector(pi, pj, box_length);
    let r2 = minimum_image_vector(pi, pk, box_length);
    r1.cross(&r2)
        .try_normalize(NEAR_ZERO)
        .ok_or(GeometryError::DegeneratePlane)
}

/// Unit vector pointing from `center` away from its three neighbors, i.e. the direction of
/// the fourth substituent of an ideal tetrahedron.
///
/// When the neighbor directions cancel out (a planar trigonal arrangement) the free direction
/// is the normal of the plane through the three neighbors.
///
/// # Errors
///
/// Returns [`GeometryError::DegeneratePlane`] if the directions cancel and the neighbors are
/// colinear.
pub fn tetrahedral_complement(
    center: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    p4: &Point3<f64>,
    box_length: f64,
) -> Result<Vector3<f64>, GeometryError> {
    let sum = minimum_image_vector(center, p2, box_length)
        + minimum_image_vector(center, p3, box_length)
        + minimum_image_vector(center, p4, box_length);
    match (-sum).try_normalize(NEAR_ZERO) {
        Some(direction) => Ok(direction),
        None => plane_normal(p2, p3, p4, box_length),
    }
}

/// Returns `true` if `point` lies closer than `threshold` to any of `candidates`.
pub fn is_within_distance<'a, I>(
    point: &Point3<f64>,
    candidates: I,
    threshold: f64,
    box_length: f64,
) -> bool
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let threshold_sq = threshold * threshold;
    candidates
        .into_iter()
        .any(|candidate| minimum_image_sq_distance(point, candidate, box_length) < threshold_sq)
}

/// Draws a vector of exactly `length` that is approximately orthogonal to the mean direction
/// of `a -> b` and `b -> c`.
///
/// The mean direction is perturbed by a small uniform jitter before a random vector is
/// projected onto its orthogonal complement. Degenerate draws fall back to a cross product
/// with the coordinate axis least aligned with the direction.
pub fn random_perpendicular_vector<R: Rng + ?Sized>(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    length: f64,
    box_length: f64,
    rng: &mut R,
) -> Vector3<f64> {
    let mean = (minimum_image_vector(a, b, box_length) + minimum_image_vector(b, c, box_length)) / 2.0;
    let mut direction = mean.try_normalize(NEAR_ZERO).unwrap_or(mean);
    direction += Vector3::from_fn(|_, _| (rng.r#gen::<f64>() - 0.5) * DIRECTION_JITTER);
    let direction = direction
        .try_normalize(NEAR_ZERO)
        .unwrap_or_else(Vector3::x);

    let trial = Vector3::from_fn(|_, _| 2.0 * (rng.r#gen::<f64>() - 0.5));
    let projected = trial - direction * direction.dot(&trial);
    let perpendicular = projected
        .try_normalize(NEAR_ZERO)
        .unwrap_or_else(|| least_aligned_axis(&direction).cross(&direction).normalize());

    perpendicular * length
}

/// Draws a uniformly distributed unit vector.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    loop {
        let v = Vector3::from_fn(|_, _| 2.0 * rng.r#gen::<f64>() - 1.0);
        let norm_sq = v.norm_squared();
        if norm_sq > NEAR_ZERO && norm_sq <= 1.0 {
            return v / norm_sq.sqrt();
        }
    }
}

fn least_aligned_axis(direction: &Vector3<f64>) -> Vector3<f64> {
    let abs = direction.abs();
    if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    }
}
