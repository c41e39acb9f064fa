use crate::framebuffer::Surface;
use crate::hub75::CacheFlush;
use crate::palette::Palette;
use crate::rng::RandomSource;

pub const FIRE_WIDTH: usize = Surface::WIDTH;
pub const FIRE_HEIGHT: usize = Surface::HEIGHT;

/// Row index of the ignition row, just below the visible body.
pub const IGNITION_ROW: usize = FIRE_HEIGHT;

pub const HOT: u8 = 255;

const CELLS: usize = FIRE_WIDTH * (FIRE_HEIGHT + 1);
const COLUMNS_PER_WORD: usize = 16;

/// Averaging result after one step of cooling.
#[inline]
pub fn cool(average: u32) -> u8 {
    (average - (average != 0) as u32) as u8
}

/// Heat of an interior cell from its own previous value and the three cells below.
#[inline]
pub fn interior_heat(old: u8, below_left: u8, below: u8, below_right: u8) -> u8 {
    let sum = old as u32 + below_left as u32 + below as u32 + below_right as u32;
    cool(sum >> 2)
}

/// Heat of an edge cell; three sources scaled by 85/256, a little under a third.
#[inline]
pub fn edge_heat(old: u8, below: u8, below_side: u8) -> u8 {
    let sum = old as u32 + below as u32 + below_side as u32;
    cool((sum * 85) >> 8)
}

/// The fire's intensity grid plus the ignition row underneath it.
///
/// Rows are stored top to bottom, so row 0 is the top of the panel and
/// row `FIRE_HEIGHT` is the ignition row.
pub struct HeatField {
    cells: [u8; CELLS],
    // rows 0..cold_rows held no heat after the last frame
    cold_rows: usize,
}

impl HeatField {
    pub fn new() -> Self {
        HeatField {
            cells: [0; CELLS],
            cold_rows: FIRE_HEIGHT,
        }
    }

    pub fn heat(&self, x: usize, y: usize) -> u8 {
        self.cells[y * FIRE_WIDTH + x]
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.cells[y * FIRE_WIDTH..(y + 1) * FIRE_WIDTH]
    }

    pub fn cold_rows(&self) -> usize {
        self.cold_rows
    }

    pub fn is_extinguished(&self) -> bool {
        self.cells[..IGNITION_ROW * FIRE_WIDTH].iter().all(|&h| h == 0)
    }

    /// Relights the ignition row. Each column is lit with probability 3/4,
    /// taking two bits per column from the random source, low bits first.
    pub fn reseed<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let base = IGNITION_ROW * FIRE_WIDTH;
        let mut bits = 0u32;

        for x in 0..FIRE_WIDTH {
            if x % COLUMNS_PER_WORD == 0 {
                bits = rng.next_word();
            }
            self.cells[base + x] = if bits & 3 != 0 { HOT } else { 0 };
            bits >>= 2;
        }
    }

    /// Advances the body one step and writes the mapped colors into `target`.
    ///
    /// Rows are worked bottom to top so each row sees the freshly computed row
    /// below it and its own previous contents. `early_exit` is always set
    /// outside of tests; clearing it forces the full pass for comparison.
    fn propagate(&mut self, palette: &Palette, target: &mut Surface, early_exit: bool) {
        let mut top_hot = FIRE_HEIGHT;

        for y in (0..FIRE_HEIGHT).rev() {
            let here = y * FIRE_WIDTH;
            let below = here + FIRE_WIDTH;
            let last = FIRE_WIDTH - 1;
            let mut row_hot = 0u8;

            let heat = edge_heat(
                self.cells[here + last],
                self.cells[below + last],
                self.cells[below + last - 1],
            );
            row_hot |= heat;
            self.cells[here + last] = heat;
            target.data[here + last] = palette.color(heat);

            for x in (1..last).rev() {
                let heat = interior_heat(
                    self.cells[here + x],
                    self.cells[below + x - 1],
                    self.cells[below + x],
                    self.cells[below + x + 1],
                );
                row_hot |= heat;
                self.cells[here + x] = heat;
                target.data[here + x] = palette.color(heat);
            }

            let heat = edge_heat(self.cells[here], self.cells[below], self.cells[below + 1]);
            row_hot |= heat;
            self.cells[here] = heat;
            target.data[here] = palette.color(heat);

            if row_hot != 0 {
                top_hot = y;
            } else if early_exit && y <= self.cold_rows {
                // Nothing above was warm last frame, so nothing above can be now.
                self.cells[..here].fill(0);
                target.data[..here].fill(0);
                break;
            }
        }

        self.cold_rows = top_hot;
    }

    pub fn render<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        palette: &Palette,
        target: &mut Surface,
    ) {
        self.reseed(rng);
        self.propagate(palette, target, true);
    }
}

impl Default for HeatField {
    fn default() -> Self {
        HeatField::new()
    }
}

/// Owns the heat field and turns it into finished, flushed frames.
pub struct FireRenderer {
    field: HeatField,
    frames: u64,
}

impl FireRenderer {
    pub fn new() -> Self {
        FireRenderer {
            field: HeatField::new(),
            frames: 0,
        }
    }

    pub fn field(&self) -> &HeatField {
        &self.field
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Renders one frame into `target` and flushes the whole surface so the
    /// scan engine sees every write once this returns.
    pub fn render_frame<R, F>(
        &mut self,
        rng: &mut R,
        palette: &Palette,
        target: &mut Surface,
        flush: &mut F,
    ) where
        R: RandomSource + ?Sized,
        F: CacheFlush + ?Sized,
    {
        self.field.render(rng, palette, target);
        self.frames += 1;

        let start = target.addr();
        flush.flush(start..start + Surface::BYTES);
    }
}

impl Default for FireRenderer {
    fn default() -> Self {
        FireRenderer::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hub75::test::{BusEvent, Recorder};
    use crate::rng::{seeded, test::Scripted};

    const ALL_LIT: u32 = 0xFFFF_FFFF;
    const ALL_DARK: u32 = 0;

    fn lit_frame() -> (HeatField, Surface) {
        let palette = Palette::new();
        let mut field = HeatField::new();
        let mut surface = Surface::new();
        field.render(&mut Scripted::constant(ALL_LIT), &palette, &mut surface);
        (field, surface)
    }

    #[test]
    fn test_cold_neighbourhood_stays_cold() {
        assert_eq!(interior_heat(0, 0, 0, 0), 0);
        assert_eq!(edge_heat(0, 0, 0), 0);
    }

    #[test]
    fn test_cooling_subtracts_one() {
        assert_eq!(cool(0), 0);
        assert_eq!(cool(1), 0);
        assert_eq!(cool(200), 199);
        assert_eq!(interior_heat(255, 255, 255, 255), 254);
        assert_eq!(interior_heat(0, 4, 4, 0), 1);
        assert_eq!(interior_heat(0, 0, 3, 0), 0);
        assert_eq!(edge_heat(255, 255, 255), 253);
    }

    #[test]
    fn test_reseed_uses_two_bits_per_column() {
        let mut field = HeatField::new();
        // column 0: 0b00 dark, column 1: 0b01 lit, column 2: 0b10 lit, column 3: 0b11 lit
        let word = 0b11_10_01_00;
        field.reseed(&mut Scripted::new(vec![word, ALL_DARK, ALL_DARK, ALL_DARK]));
        let row = field.row(IGNITION_ROW);
        assert_eq!(&row[..4], &[0, HOT, HOT, HOT]);
        assert!(row[4..].iter().all(|&h| h == 0));
    }

    #[test]
    fn test_reseed_draws_one_word_per_sixteen_columns() {
        let mut field = HeatField::new();
        field.reseed(&mut Scripted::new(vec![ALL_DARK, ALL_LIT, ALL_DARK, ALL_LIT]));
        let row = field.row(IGNITION_ROW);
        for (x, &heat) in row.iter().enumerate() {
            let expected = if (x / 16) % 2 == 1 { HOT } else { 0 };
            assert_eq!(heat, expected, "column {}", x);
        }
    }

    #[test]
    fn test_ignition_rate_is_three_quarters() {
        let mut field = HeatField::new();
        let mut rng = seeded(7);
        let mut lit = 0usize;
        let mut per_column = [0usize; FIRE_WIDTH];
        let rounds = 4000;

        for _ in 0..rounds {
            field.reseed(&mut rng);
            for (x, &heat) in field.row(IGNITION_ROW).iter().enumerate() {
                assert!(heat == 0 || heat == HOT);
                if heat == HOT {
                    lit += 1;
                    per_column[x] += 1;
                }
            }
        }

        let ratio = lit as f64 / (rounds * FIRE_WIDTH) as f64;
        assert!((ratio - 0.75).abs() < 0.01, "lit ratio {}", ratio);
        for (x, &count) in per_column.iter().enumerate() {
            let ratio = count as f64 / rounds as f64;
            assert!((ratio - 0.75).abs() < 0.05, "column {} lit ratio {}", x, ratio);
        }
    }

    #[test]
    fn test_first_lit_frame() {
        let (field, surface) = lit_frame();
        let palette = Palette::new();
        let bottom = field.row(FIRE_HEIGHT - 1);

        assert_eq!(bottom[0], 168);
        assert_eq!(bottom[FIRE_WIDTH - 1], 168);
        assert!(bottom[1..FIRE_WIDTH - 1].iter().all(|&h| h == 190));
        for x in 0..FIRE_WIDTH {
            assert_eq!(
                surface.pixel(x, FIRE_HEIGHT - 1),
                palette.color(bottom[x])
            );
        }

        // heat climbs through several rows within the same frame
        assert_eq!(field.heat(5, FIRE_HEIGHT - 2), 141);
        assert_eq!(field.heat(5, FIRE_HEIGHT - 3), 104);
        assert_eq!(field.heat(0, 0), 0);
    }

    #[test]
    fn test_early_exit_clears_stale_pixels() {
        let palette = Palette::new();
        let mut field = HeatField::new();
        let mut surface = Surface::new();
        // a green level of 1 never appears in the palette
        const STALE: u16 = 0x0020;
        assert!(!palette.colors().contains(&STALE));
        surface.data.fill(STALE);

        field.render(&mut Scripted::constant(ALL_LIT), &palette, &mut surface);

        // only the bottom rows have caught yet
        assert!(field.cold_rows() > 0);
        for y in 0..field.cold_rows() {
            assert!(surface.row(y).iter().all(|&p| p == 0), "row {}", y);
        }
        assert!(surface.data.iter().all(|&p| p != STALE));
    }

    #[test]
    fn test_early_exit_matches_full_pass() {
        let palette = Palette::new();
        let mut fast = HeatField::new();
        let mut slow = HeatField::new();
        let mut fast_out = Surface::new();
        let mut slow_out = Surface::new();
        let mut rng = seeded(1234);

        for frame in 0..600 {
            let word = if frame < 120 || (200..240).contains(&frame) {
                rng.next_word()
            } else {
                ALL_DARK
            };

            fast.reseed(&mut Scripted::constant(word));
            slow.reseed(&mut Scripted::constant(word));
            fast_out.data.fill(0xAAAA);
            slow_out.data.fill(0x5555);
            fast.propagate(&palette, &mut fast_out, true);
            slow.propagate(&palette, &mut slow_out, false);

            assert_eq!(fast.cells, slow.cells, "heat differs on frame {}", frame);
            assert_eq!(fast_out.data, slow_out.data, "pixels differ on frame {}", frame);
        }

        assert!(fast.is_extinguished());
    }

    #[test]
    fn test_dark_ignition_dies_out() {
        let palette = Palette::new();
        let (mut field, mut surface) = lit_frame();
        let mut dark = Scripted::constant(ALL_DARK);

        for _ in 0..2000 {
            field.render(&mut dark, &palette, &mut surface);
        }

        assert!(field.is_extinguished());
        assert_eq!(field.cold_rows(), FIRE_HEIGHT);
        assert!(surface.data.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_top_row_never_holds_full_heat() {
        let palette = Palette::new();
        let mut field = HeatField::new();
        let mut surface = Surface::new();
        let mut lit = Scripted::constant(ALL_LIT);

        for _ in 0..500 {
            field.render(&mut lit, &palette, &mut surface);
            assert!(field.row(0).iter().all(|&h| h < HOT));
            assert!(field.row(FIRE_HEIGHT - 1).iter().all(|&h| h < HOT));
        }
        assert!(field.row(0).iter().any(|&h| h > 0));
    }

    #[test]
    fn test_same_seed_same_frames() {
        let palette = Palette::new();
        let mut a = FireRenderer::new();
        let mut b = FireRenderer::new();
        let mut rng_a = seeded(99);
        let mut rng_b = seeded(99);
        let mut out_a = Surface::new();
        let mut out_b = Surface::new();
        let mut flush = Recorder::default();

        for _ in 0..64 {
            a.render_frame(&mut rng_a, &palette, &mut out_a, &mut flush);
            b.render_frame(&mut rng_b, &palette, &mut out_b, &mut flush);
            assert_eq!(out_a.data, out_b.data);
        }
        assert_eq!(a.frames(), 64);
    }

    #[test]
    fn test_render_frame_flushes_target() {
        let palette = Palette::new();
        let mut renderer = FireRenderer::new();
        let mut surface = Surface::new();
        let mut flush = Recorder::default();

        renderer.render_frame(
            &mut Scripted::constant(ALL_LIT),
            &palette,
            &mut surface,
            &mut flush,
        );

        let start = surface.addr();
        assert_eq!(
            flush.events,
            vec![BusEvent::Flush(start..start + Surface::BYTES)]
        );
    }
}
