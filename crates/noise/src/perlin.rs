use crate::permutation::PermutationTable;

/// Quintic ease curve `6t^5 - 15t^4 + 10t^3`.
///
/// First and second derivatives vanish at 0 and 1, which keeps the noise
/// C2-continuous across lattice cell boundaries.
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Linear interpolation from `a` (t = 0) to `b` (t = 1).
#[inline]
pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of `(x, y, z)` with one of the 12 cube-edge gradients.
///
/// The low four bits of `hash` pick two of the three axes and their signs;
/// hashes 12..=15 repeat four of the directions.
#[inline]
pub fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}

/// Classic 3-D Perlin noise.
///
/// Output lies in roughly `[-1, 1]` and is exactly periodic with period 256
/// along each axis. Inputs are not validated.
pub fn perlin3(table: &PermutationTable, x: f64, y: f64, z: f64) -> f64 {
    let (fx, fy, fz) = (x.floor(), y.floor(), z.floor());

    let xi = (fx as i64 & 255) as usize;
    let yi = (fy as i64 & 255) as usize;
    let zi = (fz as i64 & 255) as usize;

    let x = x - fx;
    let y = y - fy;
    let z = z - fz;

    let u = fade(x);
    let v = fade(y);
    let w = fade(z);

    let a = table.get(xi) + yi;
    let aa = table.get(a) + zi;
    let ab = table.get(a + 1) + zi;
    let b = table.get(xi + 1) + yi;
    let ba = table.get(b) + zi;
    let bb = table.get(b + 1) + zi;

    lerp(
        w,
        lerp(
            v,
            lerp(
                u,
                grad(table.get(aa), x, y, z),
                grad(table.get(ba), x - 1.0, y, z),
            ),
            lerp(
                u,
                grad(table.get(ab), x, y - 1.0, z),
                grad(table.get(bb), x - 1.0, y - 1.0, z),
            ),
        ),
        lerp(
            v,
            lerp(
                u,
                grad(table.get(aa + 1), x, y, z - 1.0),
                grad(table.get(ba + 1), x - 1.0, y, z - 1.0),
            ),
            lerp(
                u,
                grad(table.get(ab + 1), x, y - 1.0, z - 1.0),
                grad(table.get(bb + 1), x - 1.0, y - 1.0, z - 1.0),
            ),
        ),
    )
}

impl PermutationTable {
    /// Sample noise at `(x, y, z)`.
    #[inline]
    pub fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        perlin3(self, x, y, z)
    }

    /// Sample noise at `(x, y, 0)`.
    #[inline]
    pub fn noise2(&self, x: f64, y: f64) -> f64 {
        perlin3(self, x, y, 0.0)
    }

    /// Sample noise at `(x, 0, 0)`.
    #[inline]
    pub fn noise1(&self, x: f64) -> f64 {
        perlin3(self, x, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splitmix64 stream mapped to `[-range, range)`.
    struct Samples {
        state: u64,
        range: f64,
    }

    impl Iterator for Samples {
        type Item = f64;

        fn next(&mut self) -> Option<f64> {
            self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
            let mut z = self.state;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
            z ^= z >> 31;
            let unit = (z >> 11) as f64 / (1u64 << 53) as f64;
            Some((unit * 2.0 - 1.0) * self.range)
        }
    }

    fn samples(seed: u64, range: f64) -> Samples {
        Samples { state: seed, range }
    }

    #[test]
    fn origin_matches_reference() {
        let table = PermutationTable::new();
        assert_eq!(table.noise3(0.0, 0.0, 0.0).to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn interior_point_matches_reference() {
        let table = PermutationTable::new();
        let n = table.noise3(0.5, 0.25, 0.75);
        assert_eq!(n.to_bits(), 0xbfda_3b74_0000_0000);
        assert!((table.noise3(3.7, 1.2, -4.9) - (-0.199_461_577_932_595)).abs() < 1e-12);
        assert_eq!(table.noise1(1.5), 0.5);
    }

    #[test]
    fn deterministic() {
        let table = PermutationTable::new();
        let other = PermutationTable::new();
        let mut xs = samples(1, 300.0);
        for _ in 0..1_000 {
            let (x, y, z) = (xs.next().unwrap(), xs.next().unwrap(), xs.next().unwrap());
            let a = table.noise3(x, y, z);
            let b = table.noise3(x, y, z);
            let c = other.noise3(x, y, z);
            assert_eq!(a.to_bits(), b.to_bits());
            assert_eq!(a.to_bits(), c.to_bits());
        }
    }

    #[test]
    fn periodic_along_each_axis() {
        let table = PermutationTable::new();
        let mut xs = samples(7, 50.0);
        for _ in 0..1_000 {
            let (x, y, z) = (xs.next().unwrap(), xs.next().unwrap(), xs.next().unwrap());
            let base = table.noise3(x, y, z);
            assert!((base - table.noise3(x + 256.0, y, z)).abs() < 1e-9);
            assert!((base - table.noise3(x, y + 256.0, z)).abs() < 1e-9);
            assert!((base - table.noise3(x, y, z + 256.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn output_stays_in_unit_range() {
        let table = PermutationTable::new();
        let mut xs = samples(0xdead_beef, 1_000.0);
        for _ in 0..20_000 {
            let (x, y, z) = (xs.next().unwrap(), xs.next().unwrap(), xs.next().unwrap());
            let n = table.noise3(x, y, z);
            assert!((-1.0..=1.0).contains(&n), "noise({x}, {y}, {z}) = {n}");
        }
    }

    #[test]
    fn continuous_across_cell_boundaries() {
        let table = PermutationTable::new();
        let eps = 1e-9;
        let mut xs = samples(42, 20.0);
        for n in -10..10 {
            let boundary = n as f64;
            let (y, z) = (xs.next().unwrap(), xs.next().unwrap());
            let at = table.noise3(boundary, y, z);
            let below = table.noise3(boundary - eps, y, z);
            let above = table.noise3(boundary + eps, y, z);
            assert!((at - below).abs() < 1e-6, "x={boundary}: {at} vs {below}");
            assert!((at - above).abs() < 1e-6, "x={boundary}: {at} vs {above}");

            let y_at = table.noise3(z, boundary, y);
            let y_below = table.noise3(z, boundary - eps, y);
            assert!((y_at - y_below).abs() < 1e-6);

            let z_at = table.noise3(y, z, boundary);
            let z_below = table.noise3(y, z, boundary - eps);
            assert!((z_at - z_below).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_on_integer_lattice() {
        let table = PermutationTable::new();
        for x in -5..5 {
            for y in -5..5 {
                let n = table.noise3(x as f64, y as f64, 3.0);
                assert_eq!(n, 0.0);
            }
        }
    }

    #[test]
    fn fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert_eq!(fade(0.5), 0.5);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(0.0, 2.0, 5.0), 2.0);
        assert_eq!(lerp(1.0, 2.0, 5.0), 5.0);
        assert_eq!(lerp(0.5, 2.0, 4.0), 3.0);
    }

    #[test]
    fn grad_selects_twelve_directions() {
        // Well-separated components give a distinct dot product per edge gradient.
        let (x, y, z) = (1.0, 10.0, 100.0);
        let mut values: Vec<i64> = (0..16).map(|h| grad(h, x, y, z) as i64).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 12);
        assert_eq!(grad(0, x, y, z), 11.0);
        assert_eq!(grad(3, x, y, z), -11.0);
        assert_eq!(grad(12, x, y, z), 11.0);
        assert_eq!(grad(15, x, y, z), -110.0);
    }
}
