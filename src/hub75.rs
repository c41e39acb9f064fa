use std::ops::Range;
use std::sync::atomic::{Ordering, fence};

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ControlFlags: u32 {
        const SCAN_ENA = 1 << 31;
        const IRQ_ENA = 1 << 30;
    }
}

const FB_SHIFT: u32 = 28;
const FB_MASK: u32 = 0b11;
const BCM_LSB_LEN_SHIFT: u32 = 24;
const BCM_LSB_LEN_MASK: u32 = 0b1111;
const FB_ADDR_MASK: u32 = (1 << 24) - 1;

pub const BCM_LSB_LEN: u8 = 0;

/// Value written to the HUB75 control register.
///
/// Layout, high to low: scan enable, irq enable, two bits of frame select,
/// four bits of bit-plane LSB length, then the pool base address divided by
/// two in the low 24 bits. Zero stops the scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlWord(u32);

impl ControlWord {
    pub const DISABLED: ControlWord = ControlWord(0);

    pub fn scan(frame: usize, bcm_lsb_len: u8, base_addr: usize) -> Self {
        let mut bits = ControlFlags::SCAN_ENA.bits();
        bits |= (frame as u32 & FB_MASK) << FB_SHIFT;
        bits |= (bcm_lsb_len as u32 & BCM_LSB_LEN_MASK) << BCM_LSB_LEN_SHIFT;
        bits |= ((base_addr >> 1) as u32) & FB_ADDR_MASK;
        ControlWord(bits)
    }

    pub fn from_bits(bits: u32) -> Self {
        ControlWord(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn flags(&self) -> ControlFlags {
        ControlFlags::from_bits_truncate(self.0)
    }

    pub fn is_scanning(&self) -> bool {
        self.flags().contains(ControlFlags::SCAN_ENA)
    }

    pub fn frame(&self) -> usize {
        ((self.0 >> FB_SHIFT) & FB_MASK) as usize
    }

    pub fn bcm_lsb_len(&self) -> u8 {
        ((self.0 >> BCM_LSB_LEN_SHIFT) & BCM_LSB_LEN_MASK) as u8
    }

    /// Base address as the hardware sees it, already shifted back up.
    pub fn base_addr(&self) -> usize {
        ((self.0 & FB_ADDR_MASK) as usize) << 1
    }
}

/// Write side of the scan engine's control register.
pub trait DisplayController {
    fn write_control(&mut self, word: ControlWord);

    fn publish(&mut self, frame: usize, base_addr: usize) {
        self.write_control(ControlWord::scan(frame, BCM_LSB_LEN, base_addr));
    }

    fn disable(&mut self) {
        self.write_control(ControlWord::DISABLED);
    }
}

/// Makes writes to a byte range visible to bus masters other than the CPU
/// before returning.
pub trait CacheFlush {
    fn flush(&mut self, range: Range<usize>);
}

/// Flush for hosts where the scan engine shares the CPU's coherent view of
/// memory; a release fence is all that is needed.
#[derive(Default)]
pub struct Fence;

impl CacheFlush for Fence {
    fn flush(&mut self, _range: Range<usize>) {
        fence(Ordering::Release);
    }
}
