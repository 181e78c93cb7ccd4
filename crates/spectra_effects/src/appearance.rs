//! Spawn-time appearance.
//!
//! Color math lives in the drawing layer. The simulation only needs to know,
//! once per spawn, which batch a particle belongs to and the packed color the
//! renderer should use for it.

use spectra_core::{unit_clamp, SimRng};

/// Small discriminator used to batch particles (glyph id, color bucket, ...).
pub type GroupKey = u16;

/// Resolved look of a new particle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Style {
    /// Batch the particle is drawn with.
    pub group_key: GroupKey,
    /// Packed `0xRRGGBBAA`.
    pub color: u32,
}

/// Picks the look of a particle when it is spawned.
pub trait Appearance {
    /// Resolves the style of a particle spawned from `band` at `intensity`.
    fn resolve(&self, band: usize, band_count: usize, intensity: f32, rng: &mut SimRng) -> Style;
}

impl<F> Appearance for F
where
    F: Fn(usize, usize, f32, &mut SimRng) -> Style,
{
    fn resolve(&self, band: usize, band_count: usize, intensity: f32, rng: &mut SimRng) -> Style {
        self(band, band_count, intensity, rng)
    }
}

/// Colors bucketed by intensity. The bucket index is the group key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandedPalette {
    colors: Vec<u32>,
}

impl BandedPalette {
    /// Creates a palette ordered from quietest to loudest.
    #[must_use]
    pub fn new(colors: Vec<u32>) -> Self {
        Self { colors }
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True when the palette has no colors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Bucket index and color for an intensity.
    #[must_use]
    pub fn lookup(&self, intensity: f32) -> Style {
        let Some(&last) = self.colors.last() else {
            return Style {
                group_key: 0,
                color: 0xFFFF_FFFF,
            };
        };
        let n = self.colors.len();
        let bucket = ((unit_clamp(intensity) * n as f32) as usize).min(n - 1);
        Style {
            group_key: bucket as GroupKey,
            color: self.colors.get(bucket).copied().unwrap_or(last),
        }
    }
}

impl Default for BandedPalette {
    fn default() -> Self {
        Self::new(vec![
            0x3A_6E_FF_FF, // cool blue
            0x4C_E0_D2_FF, // teal
            0xF5_D1_3D_FF, // amber
            0xFF_4D_6D_FF, // hot pink
        ])
    }
}

impl Appearance for BandedPalette {
    fn resolve(&self, _band: usize, _band_count: usize, intensity: f32, _rng: &mut SimRng) -> Style {
        self.lookup(intensity)
    }
}

/// Random glyph per particle, colored by intensity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphAppearance {
    glyph_count: u16,
    palette: BandedPalette,
}

impl GlyphAppearance {
    /// Creates an appearance choosing among `glyph_count` glyphs.
    #[must_use]
    pub fn new(glyph_count: u16, palette: BandedPalette) -> Self {
        Self {
            glyph_count: glyph_count.max(1),
            palette,
        }
    }
}

impl Appearance for GlyphAppearance {
    fn resolve(&self, _band: usize, _band_count: usize, intensity: f32, rng: &mut SimRng) -> Style {
        let glyph = rng.index(usize::from(self.glyph_count)) as GroupKey;
        Style {
            group_key: glyph,
            color: self.palette.lookup(intensity).color,
        }
    }
}
