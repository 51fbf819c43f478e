// Relativistic kinematics helpers.
//
// Four-vectors are nalgebra `Vector4<f64>` laid out as (E, px, py, pz) in GeV.

use nalgebra::{Rotation3, Vector3, Vector4};
use std::f64::consts::PI;

/// Four-momentum of a particle with the given mass and three-momentum.
pub fn four_momentum(mass: f64, p: Vector3<f64>) -> Vector4<f64> {
    let energy = (mass * mass + p.norm_squared()).sqrt();
    Vector4::new(energy, p.x, p.y, p.z)
}

pub fn three_momentum(p4: &Vector4<f64>) -> Vector3<f64> {
    Vector3::new(p4[1], p4[2], p4[3])
}

/// Minkowski square E^2 - |p|^2
pub fn mass_squared(p4: &Vector4<f64>) -> f64 {
    p4[0] * p4[0] - three_momentum(p4).norm_squared()
}

/// Invariant mass; a slightly negative m^2 from rounding maps to 0.
pub fn invariant_mass(p4: &Vector4<f64>) -> f64 {
    mass_squared(p4).max(0.0).sqrt()
}

/// Momentum of either daughter in the rest frame of a two-body decay
/// `a -> b c`. Returns 0 below threshold.
pub fn two_body_momentum(a: f64, b: f64, c: f64) -> f64 {
    if a <= 0.0 {
        return 0.0;
    }
    let x = (a * a - (b + c) * (b + c)) * (a * a - (b - c) * (b - c));
    if x <= 0.0 {
        0.0
    } else {
        x.sqrt() / (2.0 * a)
    }
}

/// Unit vector with polar cosine `cos_theta` and azimuth `phi`.
pub fn unit_direction(cos_theta: f64, phi: f64) -> Vector3<f64> {
    let cos_theta = cos_theta.clamp(-1.0, 1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Polar cosine and azimuth in [0, 2pi) of a three-vector. The zero vector
/// maps to (1, 0).
pub fn polar_angles(p: &Vector3<f64>) -> (f64, f64) {
    let norm = p.norm();
    if norm == 0.0 {
        return (1.0, 0.0);
    }
    let cos_theta = (p.z / norm).clamp(-1.0, 1.0);
    let mut phi = p.y.atan2(p.x);
    if phi < 0.0 {
        phi += 2.0 * PI;
    }
    (cos_theta, phi)
}

/// Boost `p4` from the rest frame of `frame` into the frame where `frame`
/// has four-momentum `frame`.
pub fn boost_to_frame_of(p4: &Vector4<f64>, frame: &Vector4<f64>) -> Vector4<f64> {
    let energy = frame[0];
    let beta = three_momentum(frame) / energy;
    let beta_sq = beta.norm_squared();
    if beta_sq == 0.0 {
        return *p4;
    }
    let gamma = 1.0 / (1.0 - beta_sq).sqrt();
    let q = three_momentum(p4);
    let bp = beta.dot(&q);
    let e_new = gamma * (p4[0] + bp);
    let q_new = q + ((gamma - 1.0) * bp / beta_sq + gamma * p4[0]) * beta;
    Vector4::new(e_new, q_new.x, q_new.y, q_new.z)
}

/// Boost along the +y axis with velocity `beta`.
pub fn boost_along_y(p4: &Vector4<f64>, beta: f64) -> Vector4<f64> {
    let gamma = 1.0 / (1.0 - beta * beta).sqrt();
    Vector4::new(
        gamma * (p4[0] + beta * p4[2]),
        p4[1],
        gamma * (p4[2] + beta * p4[0]),
        p4[3],
    )
}

/// Random-orientation rotation built from a uniform polar cosine and a
/// uniform azimuth, applied to the spatial part.
///
/// Rotating about z by `acos(cos_z)` and then about y by `angle_y` maps the
/// +y axis onto an isotropically distributed direction.
pub fn rotate(p4: &Vector4<f64>, cos_z: f64, angle_y: f64) -> Vector4<f64> {
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), cos_z.clamp(-1.0, 1.0).acos());
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), angle_y);
    let q = ry * (rz * three_momentum(p4));
    Vector4::new(p4[0], q.x, q.y, q.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_four_momentum_mass_shell() {
        let p4 = four_momentum(3.0969, Vector3::new(0.3, -1.2, 2.0));
        assert!((invariant_mass(&p4) - 3.0969).abs() < 1e-12);
    }

    #[test]
    fn test_two_body_momentum_massless() {
        // M -> m + gamma : p = (M^2 - m^2) / 2M
        let p = two_body_momentum(10.58, 3.0969, 0.0);
        let expected = (10.58f64.powi(2) - 3.0969f64.powi(2)) / (2.0 * 10.58);
        assert!((p - expected).abs() < 1e-12);
        assert_eq!(two_body_momentum(1.0, 0.6, 0.6), 0.0);
    }

    #[test]
    fn test_polar_angles_inverts_unit_direction() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let c: f64 = 2.0 * rng.gen::<f64>() - 1.0;
            let phi: f64 = 2.0 * PI * rng.gen::<f64>();
            let (c2, phi2) = polar_angles(&unit_direction(c, phi));
            assert!((c - c2).abs() < 1e-12);
            assert!((phi - phi2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_boost_preserves_mass_and_moves_rest_frame() {
        let frame = four_momentum(5.0, Vector3::new(1.0, 2.0, -3.0));
        let at_rest = Vector4::new(5.0, 0.0, 0.0, 0.0);
        let boosted = boost_to_frame_of(&at_rest, &frame);
        assert!((boosted - frame).norm() < 1e-12);

        let daughter = four_momentum(0.5, Vector3::new(0.2, -0.1, 0.4));
        let moved = boost_to_frame_of(&daughter, &frame);
        assert!((invariant_mass(&moved) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_boost_along_y_matches_general_boost() {
        let p4 = four_momentum(0.14, Vector3::new(0.1, 0.3, -0.2));
        let beta = 0.6;
        let gamma = 1.0 / (1.0f64 - beta * beta).sqrt();
        let frame = Vector4::new(gamma, 0.0, gamma * beta, 0.0);
        let a = boost_along_y(&p4, beta);
        let b = boost_to_frame_of(&p4, &frame);
        assert!((a - b).norm() < 1e-12);
    }

    #[test]
    fn test_rotate_preserves_norm() {
        let p4 = four_momentum(0.0, Vector3::new(0.0, 2.0, 0.0));
        let r = rotate(&p4, 0.3, 1.7);
        assert!((three_momentum(&r).norm() - 2.0).abs() < 1e-12);
        assert_eq!(r[0], p4[0]);
        // the y component after the z rotation equals cos_z and is kept by the y rotation
        assert!((r[2] / 2.0 - 0.3).abs() < 1e-12);
    }
}
