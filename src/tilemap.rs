/*!
 * The four scrolling tile planes. Each cell of a plane is two attribute
 * words: the even word holds the tile code, the odd word the color row.
 * Layers draw into a shared indexed-color buffer and tag every opaque pixel
 * in a parallel priority-tag buffer for the mixer.
 */

use crate::bitmap::{Bitmap, Rect};
use crate::component::{TileGfx, TileRegion};

use strum_macros::{AsRefStr, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
pub enum LayerKind {
    Text,
    Bg,
    BgAlt,
    Roz,
}

pub struct TileLayer {
    kind: LayerKind,
    region: TileRegion,
    cols: usize,
    rows: usize,
    tile_w: usize,
    tile_h: usize,
    scroll_x: u32,
    scroll_y: u32,
    flip: bool,
    transparent_pen: u8,
    /// Added to the cell color before palette row selection; zero for the
    /// four standard planes, nonzero only for auxiliary banked layouts.
    color_bank: u16,
    palette_base: u16,
}

impl TileLayer {
    /// 8x8 fixed text plane.
    pub fn text() -> Self {
        Self::new(LayerKind::Text, TileRegion::Text, 64, 64, 8, 8, 0x6000)
    }

    /// 16x16 background plane, square layout.
    pub fn bg() -> Self {
        Self::new(LayerKind::Bg, TileRegion::Bg, 64, 64, 16, 16, 0x1000)
    }

    /// Same backing RAM as `bg`, arranged 256 cells wide by 16 tall.
    pub fn bg_alt() -> Self {
        Self::new(LayerKind::BgAlt, TileRegion::Bg, 256, 16, 16, 16, 0x1000)
    }

    /// 16x16 plane sampled by the rotate/zoom engine.
    pub fn roz() -> Self {
        Self::new(LayerKind::Roz, TileRegion::Roz, 128, 128, 16, 16, 0x2000)
    }

    fn new(
        kind: LayerKind,
        region: TileRegion,
        cols: usize,
        rows: usize,
        tile_w: usize,
        tile_h: usize,
        palette_base: u16,
    ) -> Self {
        Self {
            kind,
            region,
            cols,
            rows,
            tile_w,
            tile_h,
            scroll_x: 0,
            scroll_y: 0,
            flip: false,
            transparent_pen: 0,
            color_bank: 0,
            palette_base,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn set_scroll(&mut self, x: u32, y: u32) {
        self.scroll_x = x;
        self.scroll_y = y;
    }

    pub fn set_flip(&mut self, flip: bool) {
        self.flip = flip;
    }

    pub fn pixel_width(&self) -> usize {
        self.cols * self.tile_w
    }

    pub fn pixel_height(&self) -> usize {
        self.rows * self.tile_h
    }

    /// Number of attribute words backing this layout.
    pub fn vram_words(&self) -> usize {
        self.cols * self.rows * 2
    }

    /// Attribute pair for one cell: (tile code, color row). The two words
    /// decode independently; unrelated bits in either word are ignored.
    pub(crate) fn cell(&self, vram: &[u16], col: usize, row: usize) -> Option<(u16, u16)> {
        let index = (row * self.cols + col) * 2;
        let code = *vram.get(index)?;
        let color = vram.get(index + 1)? & 0x000f;
        Some((code, color))
    }

    /// Palette index at one source pixel of the plane, or `None` where the
    /// plane is transparent or the tile code falls outside the ROM.
    pub(crate) fn pen_at(
        &self,
        vram: &[u16],
        gfx: &dyn TileGfx,
        sx: usize,
        sy: usize,
    ) -> Option<u16> {
        let (code, color) = self.cell(vram, sx / self.tile_w, sy / self.tile_h)?;
        let pens = gfx.tile(self.region, u32::from(code))?;
        let pen = *pens.get((sy % self.tile_h) * self.tile_w + (sx % self.tile_w))?;
        if pen == self.transparent_pen {
            return None;
        }
        Some(self.palette_base + ((color + self.color_bank) << 8) + u16::from(pen))
    }

    /// Plane source coordinate for a destination pixel: scroll, toroidal
    /// wrap, then the whole-plane mirror when the screen is flipped.
    fn source_pixel(&self, x: i32, y: i32) -> (usize, usize) {
        let pw = self.pixel_width() as u32;
        let ph = self.pixel_height() as u32;
        let mut sx = (x as u32).wrapping_add(self.scroll_x) % pw;
        let mut sy = (y as u32).wrapping_add(self.scroll_y) % ph;
        if self.flip {
            sx = pw - 1 - sx;
            sy = ph - 1 - sy;
        }
        (sx as usize, sy as usize)
    }

    pub fn draw(
        &self,
        vram: &[u16],
        gfx: &dyn TileGfx,
        color: &mut Bitmap<u16>,
        prio: &mut Bitmap<u8>,
        clip: &Rect,
        tag: u8,
    ) {
        let clip = clip.intersect(&color.bounds());
        if clip.is_empty() {
            return;
        }
        for y in clip.min_y..=clip.max_y {
            for x in clip.min_x..=clip.max_x {
                let (sx, sy) = self.source_pixel(x, y);
                if let Some(pix) = self.pen_at(vram, gfx, sx, sy) {
                    color.put(x as usize, y as usize, pix);
                    let tags = prio.pix(x as usize, y as usize);
                    prio.put(x as usize, y as usize, tags | tag);
                }
            }
        }
    }
}
