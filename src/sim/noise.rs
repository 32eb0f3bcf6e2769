//! Seedable gradient noise
//!
//! Used for organic turbulence (wind gusts, ambient force fields). The
//! permutation table is rebuilt from the seed so two generators with the
//! same seed always produce the same field.

/// Size of the base permutation table
const PERM_SIZE: usize = 256;

/// LCG multiplier used to re-derive the shuffle index
const LCG_MUL: u64 = 1_103_515_245;
/// LCG increment
const LCG_INC: u64 = 12_345;
/// LCG modulus (2^31)
const LCG_MOD: u64 = 1 << 31;

/// 2D gradient directions; the longest is sqrt(2), which keeps every
/// single-octave sample inside [-1, 1].
const GRADIENTS_2D: [(f64, f64); 8] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

/// Seeded gradient noise generator
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    /// Permutation duplicated to 512 entries so `perm[i + 1]` never overflows
    perm: [u8; PERM_SIZE * 2],
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        let mut generator = Self {
            perm: [0; PERM_SIZE * 2],
        };
        generator.set_seed(seed);
        generator
    }

    /// Rebuild the permutation table from `seed`
    pub fn set_seed(&mut self, seed: u64) {
        let mut p = [0u8; PERM_SIZE];
        for (i, slot) in p.iter_mut().enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates, stepping the LCG after every swap
        let mut state = seed % LCG_MOD;
        for i in (1..PERM_SIZE).rev() {
            let j = (state % (i as u64 + 1)) as usize;
            p.swap(i, j);
            state = (state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC)) % LCG_MOD;
        }

        self.perm[..PERM_SIZE].copy_from_slice(&p);
        self.perm[PERM_SIZE..].copy_from_slice(&p);
    }

    #[inline]
    fn hash(&self, i: usize) -> usize {
        self.perm[i] as usize
    }

    /// 1D noise in [-1, 1]
    pub fn noise_1d(&self, x: f64) -> f64 {
        let xi = lattice(x);
        let xf = x - x.floor();
        let u = fade(xf);

        let a = self.hash(self.hash(xi));
        let b = self.hash(self.hash(xi + 1));

        lerp(grad_1d(a, xf), grad_1d(b, xf - 1.0), u).clamp(-1.0, 1.0)
    }

    /// 2D noise in [-1, 1]
    pub fn noise_2d(&self, x: f64, y: f64) -> f64 {
        let xi = lattice(x);
        let yi = lattice(y);
        let xf = x - x.floor();
        let yf = y - y.floor();

        let u = fade(xf);
        let v = fade(yf);

        let a = self.hash(xi) + yi;
        let b = self.hash(xi + 1) + yi;

        let aa = self.hash(a);
        let ab = self.hash(a + 1);
        let ba = self.hash(b);
        let bb = self.hash(b + 1);

        let bottom = lerp(grad_2d(aa, xf, yf), grad_2d(ba, xf - 1.0, yf), u);
        let top = lerp(grad_2d(ab, xf, yf - 1.0), grad_2d(bb, xf - 1.0, yf - 1.0), u);

        lerp(bottom, top, v).clamp(-1.0, 1.0)
    }

    /// Sum of `octaves` layers of 2D noise at doubling frequency, normalized
    /// by the total amplitude so the result stays in [-1, 1]
    pub fn octave_noise_2d(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves.max(1) {
            total += self.noise_2d(x * frequency, y * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        if max_value > 0.0 {
            (total / max_value).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Integer lattice cell, wrapped to the table size (handles negatives)
#[inline]
fn lattice(x: f64) -> usize {
    ((x.floor() as i64) & (PERM_SIZE as i64 - 1)) as usize
}

/// Smootherstep 6t^5 - 15t^4 + 10t^3
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Gradient magnitude 1..=8 scaled into (0, 1], sign from bit 3
#[inline]
fn grad_1d(hash: usize, x: f64) -> f64 {
    let h = hash & 15;
    let g = (1 + (h & 7)) as f64 / 8.0;
    if h & 8 != 0 { -g * x } else { g * x }
}

#[inline]
fn grad_2d(hash: usize, x: f64, y: f64) -> f64 {
    let (gx, gy) = GRADIENTS_2D[hash & 7];
    // Halve so the corner contributions of a sqrt(2) gradient stay bounded
    (gx * x + gy * y) * 0.5
}
