/*!
 * Rotate/zoom engine. Maps every destination pixel to a source coordinate
 * in the rotate plane through an affine transform, either one matrix for
 * the whole frame ("simple") or per-scanline coefficients streamed from
 * line RAM ("super"). Start registers are whole pixels, increments are in
 * 1/256 pixel; both are widened to 16.16 fixed point before stepping.
 */

use crate::bitmap::{Bitmap, Rect};
use crate::component::{merge_halfword, merge_word, TileGfx};
use crate::tilemap::TileLayer;
use log::warn;

pub const ROZ_CTRL_WORDS: usize = 0x60 / 4;

/// 8 words of line RAM per scanline, indexed by scanline & 0xff.
pub const LINE_WORDS_PER_SCANLINE: usize = 8;
pub const LINE_RAM_WORDS: usize = 256 * LINE_WORDS_PER_SCANLINE;

/// Two's-complement decode of an `bits`-wide field living in a wider word.
/// A zero field must come back as exactly zero, and a field with its sign
/// bit set as `value - 2^bits`.
fn sign_extend(value: u32, bits: u32) -> i32 {
    let sign = 1u32 << (bits - 1);
    if value & sign != 0 {
        (value | !(sign | (sign - 1))) as i32
    } else {
        value as i32
    }
}

struct LineParams {
    start_x: i32,
    start_y: i32,
    inc_xx: i32,
    inc_xy: i32,
}

pub struct RozEngine {
    ctrl: [u32; ROZ_CTRL_WORDS],
    line_ram: Vec<u16>,
}

impl RozEngine {
    pub fn new() -> Self {
        Self {
            ctrl: [0; ROZ_CTRL_WORDS],
            line_ram: vec![0; LINE_RAM_WORDS],
        }
    }

    pub fn write_ctrl(&mut self, offset: usize, data: u32, mask: u32) {
        match self.ctrl.get_mut(offset) {
            Some(reg) => merge_word(reg, data, mask),
            None => warn!("roz control write out of range: {:#x}", offset),
        }
    }

    pub fn write_line_ram(&mut self, offset: usize, data: u16, mask: u16) {
        match self.line_ram.get_mut(offset) {
            Some(word) => merge_halfword(word, data, mask),
            None => warn!("roz line ram write out of range: {:#x}", offset),
        }
    }

    fn pair18(&self, low: usize) -> i32 {
        sign_extend((self.ctrl[low] & 0xffff) | ((self.ctrl[low + 1] & 3) << 16), 18)
    }

    fn pair17(&self, low: usize) -> i32 {
        sign_extend((self.ctrl[low] & 0xffff) | ((self.ctrl[low + 1] & 1) << 16), 17)
    }

    fn start_x(&self) -> i32 {
        self.pair18(0x00 / 4)
    }

    fn start_y(&self) -> i32 {
        self.pair18(0x08 / 4)
    }

    fn inc_xx(&self) -> i32 {
        self.pair17(0x10 / 4)
    }

    fn inc_xy(&self) -> i32 {
        self.pair17(0x18 / 4)
    }

    fn inc_yy(&self) -> i32 {
        self.pair17(0x20 / 4)
    }

    fn inc_yx(&self) -> i32 {
        self.pair17(0x28 / 4)
    }

    /// Offsets carry an extra +0x400 pixel bias when the matching select
    /// bit is set. Undocumented; a handful of titles depend on it, so it
    /// stays an explicit special case rather than part of the start value.
    fn offs_x(&self) -> i32 {
        self.ctrl[0x30 / 4] as i32 + ((self.ctrl[0x38 / 4] & 1) as i32) * 0x400
    }

    fn offs_y(&self) -> i32 {
        self.ctrl[0x34 / 4] as i32 + ((self.ctrl[0x3c / 4] & 1) as i32) * 0x400
    }

    fn super_mode(&self) -> bool {
        self.ctrl[0x5c / 4] & 1 != 0
    }

    fn line_params(&self, y: i32) -> LineParams {
        let base = LINE_WORDS_PER_SCANLINE * (y & 0xff) as usize;
        let word = |i: usize| u32::from(self.line_ram[base + i]);
        LineParams {
            start_x: sign_extend(word(0) | ((word(1) & 3) << 16), 18),
            start_y: sign_extend(word(2) | ((word(3) & 3) << 16), 18),
            inc_xx: sign_extend(word(4) | ((word(5) & 1) << 16), 17),
            inc_xy: sign_extend(word(6) | ((word(7) & 1) << 16), 17),
        }
    }

    pub fn render(
        &self,
        layer: &TileLayer,
        vram: &[u16],
        gfx: &dyn TileGfx,
        color: &mut Bitmap<u16>,
        prio: &mut Bitmap<u8>,
        clip: &Rect,
        tag: u8,
        wrap: bool,
    ) {
        let clip = clip.intersect(&color.bounds());
        if clip.is_empty() {
            return;
        }

        if self.super_mode() {
            for y in clip.min_y..=clip.max_y {
                let line = self.line_params(y);
                let row = Rect::new(clip.min_x, clip.max_x, y, y);
                self.draw_transformed(
                    layer,
                    vram,
                    gfx,
                    color,
                    prio,
                    &row,
                    tag,
                    wrap,
                    line.start_x + self.start_x() + self.offs_x(),
                    line.start_y + self.start_y() + self.offs_y(),
                    line.inc_xx,
                    line.inc_xy,
                    0,
                    0,
                );
            }
        } else {
            self.draw_transformed(
                layer,
                vram,
                gfx,
                color,
                prio,
                &clip,
                tag,
                wrap,
                self.start_x() + self.offs_x(),
                self.start_y() + self.offs_y(),
                self.inc_xx(),
                self.inc_xy(),
                self.inc_yx(),
                self.inc_yy(),
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_transformed(
        &self,
        layer: &TileLayer,
        vram: &[u16],
        gfx: &dyn TileGfx,
        color: &mut Bitmap<u16>,
        prio: &mut Bitmap<u8>,
        clip: &Rect,
        tag: u8,
        wrap: bool,
        start_x: i32,
        start_y: i32,
        inc_xx: i32,
        inc_xy: i32,
        inc_yx: i32,
        inc_yy: i32,
    ) {
        let pw = layer.pixel_width() as i64;
        let ph = layer.pixel_height() as i64;

        let start_x = i64::from(start_x) << 16;
        let start_y = i64::from(start_y) << 16;
        let inc_xx = i64::from(inc_xx) << 8;
        let inc_xy = i64::from(inc_xy) << 8;
        let inc_yx = i64::from(inc_yx) << 8;
        let inc_yy = i64::from(inc_yy) << 8;

        for y in clip.min_y..=clip.max_y {
            let mut cx = start_x + i64::from(y) * inc_yx + i64::from(clip.min_x) * inc_xx;
            let mut cy = start_y + i64::from(y) * inc_yy + i64::from(clip.min_x) * inc_xy;
            for x in clip.min_x..=clip.max_x {
                let sx = cx >> 16;
                let sy = cy >> 16;
                let (sx, sy) = if wrap {
                    (sx.rem_euclid(pw), sy.rem_euclid(ph))
                } else if sx < 0 || sx >= pw || sy < 0 || sy >= ph {
                    cx += inc_xx;
                    cy += inc_xy;
                    continue;
                } else {
                    (sx, sy)
                };
                if let Some(pix) = layer.pen_at(vram, gfx, sx as usize, sy as usize) {
                    color.put(x as usize, y as usize, pix);
                    let tags = prio.pix(x as usize, y as usize);
                    prio.put(x as usize, y as usize, tags | tag);
                }
                cx += inc_xx;
                cy += inc_xy;
            }
        }
    }
}

impl Default for RozEngine {
    fn default() -> Self {
        Self::new()
    }
}
