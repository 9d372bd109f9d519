//! Per-shell materials.

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as `[0, 1]` floats, still in sRGB space.
    pub fn to_srgb_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Channels converted to linear space, for sRGB render targets.
    pub fn to_linear_f32(self) -> [f32; 3] {
        self.to_srgb_f32().map(srgb_to_linear)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Shell colors, innermost first: red, orange, yellow, green, cyan, blue,
/// purple.
pub const SHELL_PALETTE: [Rgb; 7] = [
    Rgb::new(0xff, 0x00, 0x00),
    Rgb::new(0xff, 0xa5, 0x00),
    Rgb::new(0xff, 0xff, 0x00),
    Rgb::new(0x00, 0x80, 0x00),
    Rgb::new(0x00, 0xff, 0xff),
    Rgb::new(0x00, 0x00, 0xff),
    Rgb::new(0x80, 0x00, 0x80),
];

/// Color for a shell; the palette repeats past its seventh entry.
pub fn shell_color(shell_index: u32) -> Rgb {
    SHELL_PALETTE[shell_index as usize % SHELL_PALETTE.len()]
}

/// Unlit flat material for one shell mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Material {
    pub color: Rgb,
    pub wireframe: bool,
}

impl Material {
    pub fn for_shell(shell_index: u32, wireframe: bool) -> Self {
        Self {
            color: shell_color(shell_index),
            wireframe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_runs_red_to_purple() {
        assert_eq!(shell_color(0), Rgb::new(255, 0, 0));
        assert_eq!(shell_color(6), Rgb::new(128, 0, 128));
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(shell_color(7), shell_color(0));
        assert_eq!(shell_color(15), shell_color(1));
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        let [r, g, b] = Rgb::new(255, 0, 255).to_linear_f32();
        assert!((r - 1.0).abs() < 1e-6);
        assert_eq!(g, 0.0);
        assert!((b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn material_carries_wireframe_flag() {
        let m = Material::for_shell(2, true);
        assert!(m.wireframe);
        assert_eq!(m.color, Rgb::new(255, 255, 0));
    }
}
