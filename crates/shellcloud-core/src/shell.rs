//! Radial bands partitioning `[0, outer_radius)`.

use crate::error::{Error, Result};

/// One concentric shell: `[inner_radius, outer_radius)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellBand {
    pub shell_index: u32,
    pub shell_count: u32,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl ShellBand {
    /// Band `shell_index` of `shell_count` equal-width bands spanning
    /// `[0, radius)`.
    pub fn of(shell_index: u32, shell_count: u32, radius: f32) -> Self {
        let count = shell_count.max(1) as f32;
        Self {
            shell_index,
            shell_count,
            inner_radius: (shell_index as f32 / count) * radius,
            outer_radius: ((shell_index + 1) as f32 / count) * radius,
        }
    }

    /// All bands for a radius, innermost first.
    pub fn all(shell_count: u32, radius: f32) -> impl Iterator<Item = ShellBand> {
        (0..shell_count).map(move |i| ShellBand::of(i, shell_count, radius))
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.outer_radius - self.inner_radius
    }

    /// Whether `radius` falls inside `[inner, outer)`.
    #[inline]
    pub fn contains(&self, radius: f32) -> bool {
        radius >= self.inner_radius && radius < self.outer_radius
    }

    pub fn validate(&self) -> Result<()> {
        if self.shell_index >= self.shell_count {
            return Err(Error::invalid(
                "shell_index",
                format!(
                    "shell index {} out of range for {} shells",
                    self.shell_index, self.shell_count
                ),
            ));
        }
        if !(self.inner_radius >= 0.0 && self.inner_radius <= self.outer_radius)
            || !self.outer_radius.is_finite()
        {
            return Err(Error::invalid(
                "inner_radius",
                format!(
                    "band [{}, {}) is not a valid radial range",
                    self.inner_radius, self.outer_radius
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_contiguous() {
        let bands: Vec<_> = ShellBand::all(7, 50.0).collect();
        assert_eq!(bands.len(), 7);
        assert_eq!(bands[0].inner_radius, 0.0);
        assert!((bands[6].outer_radius - 50.0).abs() < 1e-4);

        for pair in bands.windows(2) {
            assert!((pair[0].outer_radius - pair[1].inner_radius).abs() < 1e-4);
        }
    }

    #[test]
    fn bands_have_equal_width() {
        for band in ShellBand::all(5, 10.0) {
            assert!((band.width() - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn contains_is_half_open() {
        let band = ShellBand::of(1, 2, 10.0);
        assert!(band.contains(5.0));
        assert!(band.contains(9.99));
        assert!(!band.contains(10.0));
        assert!(!band.contains(4.99));
    }

    #[test]
    fn out_of_range_index_is_invalid() {
        let band = ShellBand::of(3, 3, 10.0);
        assert!(band.validate().is_err());
        assert!(ShellBand::of(2, 3, 10.0).validate().is_ok());
    }

    #[test]
    fn inverted_band_is_invalid() {
        let band = ShellBand {
            shell_index: 0,
            shell_count: 1,
            inner_radius: 5.0,
            outer_radius: 1.0,
        };
        assert!(band.validate().is_err());
    }
}
