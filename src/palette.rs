pub const PALETTE_SIZE: usize = 256;

/// Packs an 8-bit-per-channel color into the panel's 16-bit format.
///
/// Blue sits in the top five bits, green in the middle six, red in the
/// bottom five. Channels are truncated, never rounded.
pub const fn pack_color(r: u8, g: u8, b: u8) -> u16 {
    (((b >> 3) as u16) << 11) | (((g >> 2) as u16) << 5) | ((r >> 3) as u16)
}

/// Expands a packed color back to 8 bits per channel by bit replication,
/// so a saturated field reads back as 255.
pub fn unpack_color(color: u16) -> (u8, u8, u8) {
    let r = (color & 0x1F) as u8;
    let g = ((color >> 5) & 0x3F) as u8;
    let b = ((color >> 11) & 0x1F) as u8;
    ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
}

/// Heat to color lookup: black, blue, red, yellow, then a long fade to white.
pub struct Palette {
    colors: [u16; PALETTE_SIZE],
}

impl Palette {
    pub fn new() -> Self {
        let mut colors = [0u16; PALETTE_SIZE];

        for i in 0..32usize {
            let step = i as u8;
            // black to blue
            colors[i] = pack_color(0, 0, step << 1);
            // blue to red
            colors[i + 32] = pack_color(step << 3, 0, 64 - (step << 1));
            // red to yellow
            colors[i + 64] = pack_color(0xFF, step << 3, 0);
            // yellow to white
            colors[i + 96] = pack_color(0xFF, 0xFF, step << 2);
            colors[i + 128] = pack_color(0xFF, 0xFF, 64 + (step << 2));
            colors[i + 160] = pack_color(0xFF, 0xFF, 128 + (step << 2));
            colors[i + 192] = pack_color(0xFF, 0xFF, 192 + step);
            colors[i + 224] = pack_color(0xFF, 0xFF, 224 + step);
        }

        Palette { colors }
    }

    #[inline]
    pub fn color(&self, heat: u8) -> u16 {
        self.colors[heat as usize]
    }

    pub fn rgb(&self, heat: u8) -> (u8, u8, u8) {
        unpack_color(self.color(heat))
    }

    pub fn colors(&self) -> &[u16; PALETTE_SIZE] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new()
    }
}
