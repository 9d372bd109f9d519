//! Generation parameters and the edits that produce new snapshots of them.

use crate::error::{Error, Result};

/// Default number of triangles across all shells.
pub const DEFAULT_TRIANGLE_COUNT: u32 = 100_000;

/// Default outer radius of the outermost shell.
pub const DEFAULT_OUTER_RADIUS: f32 = 50.0;

/// Default lower bound for triangle size.
pub const DEFAULT_SIZE_MIN: f32 = 0.5;

/// Default upper bound for triangle size.
pub const DEFAULT_SIZE_MAX: f32 = 3.0;

/// Default number of concentric shells.
pub const DEFAULT_SHELL_COUNT: u32 = 7;

/// Largest accepted triangle budget (36 bytes of positions each).
pub const MAX_TRIANGLE_COUNT: u32 = 10_000_000;

/// Immutable snapshot of everything a cloud build depends on.
///
/// Snapshots are cheap to copy. Editing never mutates a live snapshot;
/// [`ParameterEdit::apply`] returns a new one which is then handed to
/// [`CloudBuilder::rebuild`](crate::CloudBuilder::rebuild).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GenerationParameters {
    /// Total triangle budget shared by all shells
    pub total_triangle_count: u32,
    /// Radius of the outer edge of the last shell
    pub outer_radius: f32,
    /// Smallest triangle size
    pub size_min: f32,
    /// Largest triangle size
    pub size_max: f32,
    /// Number of concentric shells
    pub shell_count: u32,
    /// Render shells as wireframe
    pub wireframe: bool,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            total_triangle_count: DEFAULT_TRIANGLE_COUNT,
            outer_radius: DEFAULT_OUTER_RADIUS,
            size_min: DEFAULT_SIZE_MIN,
            size_max: DEFAULT_SIZE_MAX,
            shell_count: DEFAULT_SHELL_COUNT,
            wireframe: true,
        }
    }
}

impl GenerationParameters {
    /// Check every field, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.total_triangle_count == 0 {
            return Err(Error::invalid(
                "total_triangle_count",
                "must be greater than zero",
            ));
        }
        if self.total_triangle_count > MAX_TRIANGLE_COUNT {
            return Err(Error::invalid(
                "total_triangle_count",
                format!(
                    "{} exceeds the limit of {}",
                    self.total_triangle_count, MAX_TRIANGLE_COUNT
                ),
            ));
        }
        if self.shell_count == 0 {
            return Err(Error::invalid("shell_count", "must be greater than zero"));
        }
        check_positive("outer_radius", self.outer_radius)?;
        self.sizes().validate()
    }

    /// Size bounds as a [`SizeRange`].
    pub fn sizes(&self) -> SizeRange {
        SizeRange {
            min: self.size_min,
            max: self.size_max,
        }
    }

    pub fn with_triangle_count(self, total_triangle_count: u32) -> Self {
        Self {
            total_triangle_count,
            ..self
        }
    }

    pub fn with_outer_radius(self, outer_radius: f32) -> Self {
        Self {
            outer_radius,
            ..self
        }
    }

    pub fn with_sizes(self, size_min: f32, size_max: f32) -> Self {
        Self {
            size_min,
            size_max,
            ..self
        }
    }

    pub fn with_shell_count(self, shell_count: u32) -> Self {
        Self {
            shell_count,
            ..self
        }
    }

    pub fn with_wireframe(self, wireframe: bool) -> Self {
        Self { wireframe, ..self }
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::invalid(
            name,
            format!("must be a positive finite number, got {value}"),
        ));
    }
    Ok(())
}

/// Inclusive bounds for per-triangle size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl SizeRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<()> {
        check_positive("size_min", self.min)?;
        check_positive("size_max", self.max)?;
        if self.min > self.max {
            return Err(Error::invalid(
                "size_min",
                format!("size_min ({}) exceeds size_max ({})", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// A single control change coming from the parameter-editing surface.
///
/// Every edit, wireframe included, regenerates the whole cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterEdit {
    TriangleCount(u32),
    OuterRadius(f32),
    SizeMin(f32),
    SizeMax(f32),
    ShellCount(u32),
    Wireframe(bool),
}

impl ParameterEdit {
    /// Produce the snapshot that results from applying this edit.
    ///
    /// The result is not validated; `rebuild` rejects it if needed.
    pub fn apply(self, params: GenerationParameters) -> GenerationParameters {
        match self {
            ParameterEdit::TriangleCount(n) => params.with_triangle_count(n),
            ParameterEdit::OuterRadius(r) => params.with_outer_radius(r),
            ParameterEdit::SizeMin(min) => params.with_sizes(min, params.size_max),
            ParameterEdit::SizeMax(max) => params.with_sizes(params.size_min, max),
            ParameterEdit::ShellCount(n) => params.with_shell_count(n),
            ParameterEdit::Wireframe(w) => params.with_wireframe(w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = GenerationParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.shell_count, 7);
        assert_eq!(params.total_triangle_count, 100_000);
    }

    #[test]
    fn inverted_sizes_are_rejected() {
        let params = GenerationParameters::default().with_sizes(3.0, 1.0);
        let err = params.validate().unwrap_err();
        assert!(err.is_invalid_parameter());
        assert!(err.to_string().contains("size_min"));
    }

    #[test]
    fn equal_sizes_are_accepted() {
        let params = GenerationParameters::default().with_sizes(1.0, 1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let base = GenerationParameters::default();
        assert!(base.with_triangle_count(0).validate().is_err());
        assert!(base.with_shell_count(0).validate().is_err());
        assert!(base.with_outer_radius(0.0).validate().is_err());
        assert!(base.with_outer_radius(-5.0).validate().is_err());
        assert!(base.with_outer_radius(f32::NAN).validate().is_err());
        assert!(base.with_sizes(0.0, 1.0).validate().is_err());
    }

    #[test]
    fn oversized_budget_is_rejected() {
        let base = GenerationParameters::default();
        assert!(base.with_triangle_count(MAX_TRIANGLE_COUNT).validate().is_ok());

        let err = base
            .with_triangle_count(MAX_TRIANGLE_COUNT + 1)
            .validate()
            .unwrap_err();
        assert!(err.is_invalid_parameter());
        assert!(err.to_string().contains("total_triangle_count"));
        assert!(base.with_triangle_count(u32::MAX).validate().is_err());
    }

    #[test]
    fn edits_produce_new_snapshots() {
        let base = GenerationParameters::default();
        let edited = ParameterEdit::SizeMax(5.0).apply(base);
        assert_eq!(edited.size_max, 5.0);
        assert_eq!(edited.size_min, base.size_min);
        assert_eq!(base.size_max, DEFAULT_SIZE_MAX);

        let edited = ParameterEdit::Wireframe(false).apply(edited);
        assert!(!edited.wireframe);
    }
}
