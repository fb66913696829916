//! Deterministic value noise for organic, non-repeating idle motion
//! (floating badges, wandering particles).
//!
//! Lattice values come from an integer hash rather than a random generator so
//! the same `(x, seed)` always yields the same sample on every platform.

use super::vec2::Vec2;

const HASH_PRIME_X: u32 = 2_654_435_761;
const HASH_PRIME_Y: u32 = 2_246_822_519;
const HASH_PRIME_SEED: u32 = 3_266_489_917;

fn hash(ix: i64, iy: i64, seed: u32) -> u32 {
    let mut h = (ix as u32).wrapping_mul(HASH_PRIME_X);
    h ^= (iy as u32).wrapping_mul(HASH_PRIME_Y);
    h ^= seed.wrapping_mul(HASH_PRIME_SEED);
    h ^= h >> 15;
    h = h.wrapping_mul(2_246_822_519);
    h ^= h >> 13;
    h = h.wrapping_mul(3_266_489_917);
    h ^= h >> 16;
    h
}

/// Lattice value in `[-1, 1]`.
fn lattice(ix: i64, iy: i64, seed: u32) -> f64 {
    (hash(ix, iy, seed) as f64 / u32::MAX as f64) * 2.0 - 1.0
}

/// Quintic fade curve, zero first and second derivative at the lattice points.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Smooth 1D noise in `[-1, 1]`.
pub fn noise_1d(x: f64, seed: u32) -> f64 {
    noise_2d(x, 0.0, seed)
}

/// Smooth 2D noise in `[-1, 1]`.
pub fn noise_2d(x: f64, y: f64, seed: u32) -> f64 {
    let x0 = x.floor();
    let y0 = y.floor();
    let (ix, iy) = (x0 as i64, y0 as i64);
    let tx = fade(x - x0);
    let ty = fade(y - y0);

    let v00 = lattice(ix, iy, seed);
    let v10 = lattice(ix + 1, iy, seed);
    let v01 = lattice(ix, iy + 1, seed);
    let v11 = lattice(ix + 1, iy + 1, seed);

    let top = v00 + (v10 - v00) * tx;
    let bottom = v01 + (v11 - v01) * tx;
    top + (bottom - top) * ty
}

/// Sum of `octaves` noise layers, each at double frequency and half amplitude.
/// The result is renormalised to `[-1, 1]`.
pub fn fractal_noise_1d(x: f64, seed: u32, octaves: u32) -> f64 {
    let octaves = octaves.max(1);
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut norm = 0.0;
    for octave in 0..octaves {
        total += noise_1d(x * frequency, seed.wrapping_add(octave)) * amplitude;
        norm += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    total / norm
}

/// Positional offset for noise-driven motion at `time` seconds.
///
/// The x and y channels sample decorrelated seeds so the path does not lie on a diagonal.
pub fn noise_offset(time: f64, seed: u32, frequency: f64, amplitude: f64) -> Vec2 {
    let t = time * frequency;
    Vec2::new(
        noise_1d(t, seed) * amplitude,
        noise_1d(t, seed.wrapping_add(7919)) * amplitude,
    )
}

/// Force that steers a body along a noise field at `position`, scaled by `strength`.
pub fn wander_force(position: Vec2, time: f64, seed: u32, scale: f64, strength: f64) -> Vec2 {
    let angle = noise_2d(position.x * scale + time, position.y * scale, seed) * std::f64::consts::PI;
    Vec2::new(angle.cos(), angle.sin()) * strength
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_is_deterministic() {
        for i in 0..50 {
            let x = i as f64 * 0.37;
            assert_eq!(noise_1d(x, 42).to_bits(), noise_1d(x, 42).to_bits());
            assert_eq!(noise_2d(x, -x, 9).to_bits(), noise_2d(x, -x, 9).to_bits());
        }
    }

    #[test]
    fn test_noise_stays_in_range() {
        for i in -200..200 {
            let x = i as f64 * 0.113;
            let n = noise_2d(x, x * 0.5, 3);
            assert!((-1.0..=1.0).contains(&n), "noise {} out of range at {}", n, x);
            let f = fractal_noise_1d(x, 3, 4);
            assert!((-1.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn test_noise_is_continuous() {
        let step = 1e-4;
        for i in 0..100 {
            let x = i as f64 * 0.05;
            let delta = (noise_1d(x + step, 1) - noise_1d(x, 1)).abs();
            assert!(delta < 0.01, "jump of {} at {}", delta, x);
        }
    }

    #[test]
    fn test_noise_matches_lattice_at_integers() {
        assert_eq!(noise_1d(3.0, 11), lattice(3, 0, 11));
    }

    #[test]
    fn test_seeds_differ() {
        let differs = (0..20).any(|i| {
            let x = i as f64 * 0.5 + 0.25;
            noise_1d(x, 1) != noise_1d(x, 2)
        });
        assert!(differs);
    }

    #[test]
    fn test_noise_offset_bounded_by_amplitude() {
        for i in 0..100 {
            let offset = noise_offset(i as f64 * 0.1, 5, 2.0, 8.0);
            assert!(offset.x.abs() <= 8.0);
            assert!(offset.y.abs() <= 8.0);
        }
        let f = wander_force(Vec2::new(10.0, 20.0), 1.5, 3, 0.01, 4.0);
        assert!((f.magnitude() - 4.0).abs() < 1e-9);
    }
}
