use ms32_video::{Bitmap, Ms32Video, Rect, SpriteBlitter, SpriteParams, TileGfx, TileRegion};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Tile ROM stand-in: every code decodes to a tile filled with its own low
/// byte, so code 0 is fully transparent and any other code is a solid pen.
pub struct SolidGfx {
    text: Vec<Vec<u8>>,
    large: Vec<Vec<u8>>,
}

impl SolidGfx {
    pub fn new(codes: usize) -> Self {
        Self {
            text: (0..codes).map(|c| vec![(c & 0xff) as u8; 8 * 8]).collect(),
            large: (0..codes).map(|c| vec![(c & 0xff) as u8; 16 * 16]).collect(),
        }
    }
}

impl TileGfx for SolidGfx {
    fn tile(&self, region: TileRegion, code: u32) -> Option<&[u8]> {
        let bank = match region {
            TileRegion::Text => &self.text,
            TileRegion::Bg | TileRegion::Roz => &self.large,
        };
        bank.get(code as usize).map(|pens| pens.as_slice())
    }
}

/// Sprite chip stand-in: rasterizes each sprite as an unzoomed solid
/// rectangle of one pen, which is all the mixer tests need.
pub struct RectBlitter {
    pub pen: u8,
}

impl SpriteBlitter for RectBlitter {
    fn draw(&mut self, target: &mut Bitmap<u16>, clip: &Rect, params: &SpriteParams) {
        for dy in 0..i32::from(params.height) {
            for dx in 0..i32::from(params.width) {
                let x = params.sx + dx;
                let y = params.sy + dy;
                if clip.contains(x, y) {
                    target.put(x as usize, y as usize, params.color_base + u16::from(self.pen));
                }
            }
        }
    }
}

pub fn set_color(video: &mut Ms32Video, index: usize, r: u16, g: u16, b: u16) {
    video.write_palette_ram(index * 2, (r << 8) | g, 0xffff);
    video.write_palette_ram(index * 2 + 1, b, 0xffff);
}

/// Program every background cell with one tile code and color row.
pub fn fill_bg(video: &mut Ms32Video, code: u16, color: u16) {
    for cell in 0..64 * 64 {
        video.write_bg_ram(cell * 2, code, 0xffff);
        video.write_bg_ram(cell * 2 + 1, color, 0xffff);
    }
}

/// Program every text cell with one tile code and color row.
pub fn fill_tx(video: &mut Ms32Video, code: u16, color: u16) {
    for cell in 0..64 * 64 {
        video.write_tx_ram(cell * 2, code, 0xffff);
        video.write_tx_ram(cell * 2 + 1, color, 0xffff);
    }
}

/// One enabled 8x8 sprite at (sx, sy) with unit zoom.
pub fn write_sprite(video: &mut Ms32Video, index: usize, code: u16, color: u16, sx: u16, sy: u16) {
    let words: [u16; 8] = [
        0x0004,
        0,
        (color << 12) | code,
        0x0707,
        sy,
        sx,
        0x100,
        0x100,
    ];
    for (i, word) in words.iter().enumerate() {
        video.write_sprite_ram(index * 8 + i, *word, 0xffff);
    }
}
