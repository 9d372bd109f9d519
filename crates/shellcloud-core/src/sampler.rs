//! Triangle sampling inside a shell.
//!
//! Every triangle starts from one random center point in spherical
//! coordinates and one random size. Its three vertices are the center
//! jittered independently per axis by up to `±size / 2`, which keeps the
//! triangle small and local instead of three unrelated points.
//!
//! # Polar bias
//!
//! The polar angle is drawn uniformly from `[0, π]` rather than drawing
//! its cosine uniformly, so centers crowd toward the poles (the ±Y axis).
//! The cloud's look depends on it; do not "fix" it to a uniform sphere.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use crate::error::{Error, Result};
use crate::params::{GenerationParameters, SizeRange};
use crate::quota::shell_quotas;
use crate::shell::ShellBand;

/// Coordinates per vertex (x, y, z).
pub const FLOATS_PER_VERTEX: usize = 3;

/// Coordinates per triangle (3 vertices).
pub const FLOATS_PER_TRIANGLE: usize = 3 * FLOATS_PER_VERTEX;

/// Flat vertex coordinates for one shell.
///
/// Layout is triangle by triangle, vertex by vertex, axis by axis:
/// `[t0v0x, t0v0y, t0v0z, t0v1x, ..., t0v2z, t1v0x, ...]`. This is the
/// layout a `Float32x3` triangle-list vertex buffer expects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryBuffer {
    shell_index: u32,
    positions: Vec<f32>,
}

impl GeometryBuffer {
    /// Wrap raw coordinates, which must form whole triangles.
    pub fn new(shell_index: u32, positions: Vec<f32>) -> Result<Self> {
        if positions.len() % FLOATS_PER_TRIANGLE != 0 {
            return Err(Error::invalid(
                "positions",
                format!(
                    "{} coordinates do not form whole triangles of {}",
                    positions.len(),
                    FLOATS_PER_TRIANGLE
                ),
            ));
        }
        Ok(Self {
            shell_index,
            positions,
        })
    }

    pub fn empty(shell_index: u32) -> Self {
        Self {
            shell_index,
            positions: Vec::new(),
        }
    }

    pub fn shell_index(&self) -> u32 {
        self.shell_index
    }

    /// Number of coordinates (not vertices).
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / FLOATS_PER_TRIANGLE
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / FLOATS_PER_VERTEX
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<f32> {
        self.positions
    }

    /// Iterate vertices as points.
    pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions
            .chunks_exact(FLOATS_PER_VERTEX)
            .map(Vec3::from_slice)
    }

    /// Iterate triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.positions.chunks_exact(FLOATS_PER_TRIANGLE).map(|t| {
            [
                Vec3::from_slice(&t[0..3]),
                Vec3::from_slice(&t[3..6]),
                Vec3::from_slice(&t[6..9]),
            ]
        })
    }
}

/// One triangle together with the center and size it was jittered from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledTriangle {
    pub center: Vec3,
    pub size: f32,
    pub vertices: [Vec3; 3],
}

/// Uniform float in `[low, high)`; returns `low` for an empty range.
#[inline]
pub fn rand_float<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high <= low {
        return low;
    }
    let value = low + rng.gen::<f32>() * (high - low);
    // f32 rounding can land exactly on `high`
    if value < high {
        value
    } else {
        next_below(high).max(low)
    }
}

/// Largest f32 strictly less than `x` (finite `x`).
fn next_below(x: f32) -> f32 {
    if x > 0.0 {
        f32::from_bits(x.to_bits() - 1)
    } else if x == 0.0 {
        -f32::from_bits(1)
    } else {
        f32::from_bits(x.to_bits() + 1)
    }
}

/// Spherical to Cartesian with Y as the polar axis.
///
/// `phi` is the polar angle from +Y, `theta` the azimuth around Y
/// measured from +Z toward +X.
#[inline]
pub fn spherical_to_cartesian(radius: f32, phi: f32, theta: f32) -> Vec3 {
    let sin_phi_radius = phi.sin() * radius;
    Vec3::new(
        sin_phi_radius * theta.sin(),
        phi.cos() * radius,
        sin_phi_radius * theta.cos(),
    )
}

/// Sample a single triangle in `band`.
pub fn sample_triangle<R: Rng + ?Sized>(
    rng: &mut R,
    band: &ShellBand,
    sizes: SizeRange,
) -> SampledTriangle {
    let radius = rand_float(rng, band.inner_radius, band.outer_radius);
    let phi = rng.gen::<f32>() * PI;
    let theta = rng.gen::<f32>() * TAU;
    let center = spherical_to_cartesian(radius, phi, theta);

    let size = rand_float(rng, sizes.min, sizes.max);
    let mut jitter = || (rng.gen::<f32>() - 0.5) * size;
    let vertices = [
        center + Vec3::new(jitter(), jitter(), jitter()),
        center + Vec3::new(jitter(), jitter(), jitter()),
        center + Vec3::new(jitter(), jitter(), jitter()),
    ];

    SampledTriangle {
        center,
        size,
        vertices,
    }
}

/// Generate `quota` triangles inside `band`.
///
/// Returns exactly `quota * 9` coordinates; `quota == 0` yields an empty
/// buffer.
pub fn generate_shell<R: Rng + ?Sized>(
    rng: &mut R,
    band: &ShellBand,
    quota: u32,
    sizes: SizeRange,
) -> Result<GeometryBuffer> {
    band.validate()?;
    sizes.validate()?;

    if quota == 0 {
        return Ok(GeometryBuffer::empty(band.shell_index));
    }

    let mut positions = Vec::with_capacity(quota as usize * FLOATS_PER_TRIANGLE);
    for _ in 0..quota {
        let triangle = sample_triangle(rng, band, sizes);
        for vertex in triangle.vertices {
            positions.extend_from_slice(&vertex.to_array());
        }
    }

    Ok(GeometryBuffer {
        shell_index: band.shell_index,
        positions,
    })
}

/// Per-shell sampling plan for one validated parameter snapshot.
#[derive(Debug, Clone)]
pub struct ShellSampler {
    params: GenerationParameters,
    quotas: Vec<u32>,
}

impl ShellSampler {
    /// Validate `params` and compute every shell's quota.
    pub fn new(params: GenerationParameters) -> Result<Self> {
        params.validate()?;
        let quotas = shell_quotas(params.total_triangle_count, params.shell_count);
        Ok(Self { params, quotas })
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    pub fn quotas(&self) -> &[u32] {
        &self.quotas
    }

    /// Triangles actually generated, which may differ slightly from the
    /// requested total because of per-shell rounding.
    pub fn planned_triangles(&self) -> u64 {
        self.quotas.iter().map(|&q| q as u64).sum()
    }

    pub fn band(&self, shell_index: u32) -> ShellBand {
        ShellBand::of(shell_index, self.params.shell_count, self.params.outer_radius)
    }

    /// Geometry for a single shell.
    pub fn generate_shell<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        shell_index: u32,
    ) -> Result<GeometryBuffer> {
        let quota = self.quotas.get(shell_index as usize).copied().unwrap_or(0);
        generate_shell(rng, &self.band(shell_index), quota, self.params.sizes())
    }

    /// Geometry for every shell, innermost first.
    pub fn generate_all<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<GeometryBuffer>> {
        (0..self.params.shell_count)
            .map(|i| {
                let buffer = self.generate_shell(rng, i)?;
                tracing::debug!(
                    shell = i,
                    triangles = buffer.triangle_count(),
                    "sampled shell"
                );
                Ok(buffer)
            })
            .collect()
    }
}

/// Sample every shell of `params` without touching any scene.
pub fn sample_cloud<R: Rng + ?Sized>(
    rng: &mut R,
    params: &GenerationParameters,
) -> Result<Vec<GeometryBuffer>> {
    ShellSampler::new(*params)?.generate_all(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn zero_quota_is_empty() {
        let band = ShellBand::of(0, 7, 50.0);
        let buffer = generate_shell(&mut rng(), &band, 0, SizeRange::new(0.5, 3.0)).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.shell_index(), 0);
    }

    #[test]
    fn buffer_has_nine_floats_per_triangle() {
        let band = ShellBand::of(3, 7, 50.0);
        let buffer = generate_shell(&mut rng(), &band, 123, SizeRange::new(0.5, 3.0)).unwrap();
        assert_eq!(buffer.len(), 123 * 9);
        assert_eq!(buffer.triangle_count(), 123);
        assert_eq!(buffer.vertex_count(), 369);
        assert_eq!(buffer.triangles().count(), 123);
    }

    #[test]
    fn unit_size_vertices_stay_near_center() {
        let band = ShellBand::of(2, 7, 50.0);
        let sizes = SizeRange::new(1.0, 1.0);
        let mut rng = rng();
        let limit = 3.0_f32.sqrt() / 2.0 + 1e-4;

        for _ in 0..1000 {
            let triangle = sample_triangle(&mut rng, &band, sizes);
            assert_eq!(triangle.size, 1.0);
            for v in triangle.vertices {
                assert!(v.distance(triangle.center) <= limit);
            }
        }
    }

    #[test]
    fn centers_fall_inside_band() {
        let band = ShellBand::of(4, 7, 70.0);
        let mut rng = rng();
        for _ in 0..1000 {
            let triangle = sample_triangle(&mut rng, &band, SizeRange::new(0.5, 3.0));
            let r = triangle.center.length();
            assert!(r >= band.inner_radius - 1e-3 && r <= band.outer_radius + 1e-3);
        }
    }

    #[test]
    fn same_seed_same_geometry() {
        let band = ShellBand::of(1, 3, 10.0);
        let sizes = SizeRange::new(0.5, 1.5);
        let a = generate_shell(&mut rng(), &band, 50, sizes).unwrap();
        let b = generate_shell(&mut rng(), &band, 50, sizes).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let band = ShellBand::of(0, 1, 10.0);
        assert!(generate_shell(&mut rng(), &band, 5, SizeRange::new(3.0, 1.0)).is_err());

        let bad_band = ShellBand::of(2, 2, 10.0);
        assert!(generate_shell(&mut rng(), &bad_band, 5, SizeRange::new(1.0, 2.0)).is_err());
    }

    #[test]
    fn spherical_axes() {
        let up = spherical_to_cartesian(2.0, 0.0, 0.0);
        assert!((up - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);

        let forward = spherical_to_cartesian(1.0, PI / 2.0, 0.0);
        assert!((forward - Vec3::Z).length() < 1e-6);

        let right = spherical_to_cartesian(1.0, PI / 2.0, PI / 2.0);
        assert!((right - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn polar_bias_is_preserved() {
        // Uniform phi puts about a third of the centers within 30 degrees of
        // a pole; a uniform sphere would put only ~13.4% there.
        let band = ShellBand::of(0, 1, 1.0);
        let mut rng = rng();
        let samples = 20_000;
        let near_pole = (0..samples)
            .map(|_| sample_triangle(&mut rng, &band, SizeRange::new(0.01, 0.01)).center)
            .filter(|c| c.length() > 1e-3 && (c.y / c.length()).abs() > (PI / 6.0).cos())
            .count();
        let fraction = near_pole as f32 / samples as f32;
        assert!(fraction > 0.28 && fraction < 0.39, "fraction near poles {fraction}");
    }

    #[test]
    fn sampler_matches_quotas() {
        let params = GenerationParameters::default().with_triangle_count(700);
        let sampler = ShellSampler::new(params).unwrap();
        let buffers = sampler.generate_all(&mut rng()).unwrap();

        let counts: Vec<usize> = buffers.iter().map(|b| b.triangle_count()).collect();
        assert_eq!(counts, vec![25, 50, 75, 100, 125, 150, 175]);
        assert_eq!(sampler.planned_triangles(), 700);
    }

    #[test]
    fn sample_cloud_rejects_invalid_params() {
        let params = GenerationParameters::default().with_sizes(3.0, 1.0);
        assert!(sample_cloud(&mut rng(), &params).is_err());
    }

    #[test]
    fn geometry_buffer_rejects_partial_triangles() {
        let err = GeometryBuffer::new(0, vec![0.0; 20]).unwrap_err();
        assert!(err.is_invalid_parameter());

        let buffer = GeometryBuffer::new(4, vec![0.0; 18]).unwrap();
        assert_eq!(buffer.triangle_count(), 2);
        assert_eq!(buffer.shell_index(), 4);
    }

    #[test]
    fn rand_float_never_reaches_upper_bound() {
        // all-ones output makes gen::<f32>() return 1 - 2^-24
        let mut top = StepRng::new(u64::MAX, 0);
        let (inner, outer) = (300.0_f32 / 7.0, 50.0_f32);
        assert_eq!(inner + (1.0 - f32::EPSILON / 2.0) * (outer - inner), outer);

        let value = rand_float(&mut top, inner, outer);
        assert!(value < outer);
        assert!(value >= inner);
    }

    #[test]
    fn rand_float_handles_empty_and_negative_ranges() {
        let mut top = StepRng::new(u64::MAX, 0);
        assert_eq!(rand_float(&mut top, 2.0, 2.0), 2.0);
        assert!(rand_float(&mut top, -1.0, 0.0) < 0.0);
        assert!(rand_float(&mut top, -3.0, -2.0) < -2.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn vertices_stay_within_padded_band(
            seed in any::<u64>(),
            shells in 1u32..12,
            radius in 1.0f32..200.0,
            size_min in 0.01f32..2.0,
            size_extra in 0.0f32..3.0,
        ) {
            let sizes = SizeRange::new(size_min, size_min + size_extra);
            let mut rng = StdRng::seed_from_u64(seed);
            for band in ShellBand::all(shells, radius) {
                for _ in 0..32 {
                    let triangle = sample_triangle(&mut rng, &band, sizes);
                    prop_assert!(triangle.size >= sizes.min && triangle.size <= sizes.max);
                    for v in triangle.vertices {
                        let r = v.length();
                        prop_assert!(r >= band.inner_radius - triangle.size - 1e-3);
                        prop_assert!(r <= band.outer_radius + triangle.size + 1e-3);
                    }
                }
            }
        }

        #[test]
        fn buffer_length_is_quota_times_nine(seed in any::<u64>(), quota in 0u32..500) {
            let band = ShellBand::of(0, 1, 10.0);
            let mut rng = StdRng::seed_from_u64(seed);
            let buffer = generate_shell(&mut rng, &band, quota, SizeRange::new(0.5, 3.0)).unwrap();
            prop_assert_eq!(buffer.len(), quota as usize * 9);
        }
    }
}
