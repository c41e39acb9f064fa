/// One panel frame of packed colors, laid out row-major.
///
/// The scan engine fetches frames over DMA and wants them on a 128 byte
/// boundary; the size of a frame is a multiple of that, so a contiguous run
/// of surfaces keeps every one of them aligned.
#[derive(Clone)]
#[repr(C, align(128))]
pub struct Surface {
    pub data: [u16; Surface::PIXELS],
}

pub const SURFACE_ALIGN: usize = 128;

const _: () = assert!(std::mem::align_of::<Surface>() == SURFACE_ALIGN);
const _: () = assert!(std::mem::size_of::<Surface>() % SURFACE_ALIGN == 0);

impl Surface {
    pub const WIDTH: usize = 64;
    pub const HEIGHT: usize = 64;
    pub const PIXELS: usize = Surface::WIDTH * Surface::HEIGHT;
    pub const BYTES: usize = Surface::PIXELS * std::mem::size_of::<u16>();

    pub fn new() -> Self {
        Surface {
            data: [0; Surface::PIXELS],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> u16 {
        self.data[y * Surface::WIDTH + x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u16) {
        self.data[y * Surface::WIDTH + x] = color;
    }

    pub fn row(&self, y: usize) -> &[u16] {
        &self.data[y * Surface::WIDTH..(y + 1) * Surface::WIDTH]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u16] {
        &mut self.data[y * Surface::WIDTH..(y + 1) * Surface::WIDTH]
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn addr(&self) -> usize {
        self.data.as_ptr() as usize
    }
}

impl Default for Surface {
    fn default() -> Self {
        Surface::new()
    }
}
