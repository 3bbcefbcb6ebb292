use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ms32_video::{
    Bitmap, Ms32Video, Rect, SpriteBlitter, SpriteParams, TileGfx, TileRegion, VideoConfig,
};

struct SolidGfx {
    text: Vec<Vec<u8>>,
    large: Vec<Vec<u8>>,
}

impl SolidGfx {
    fn new(codes: usize) -> Self {
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

struct RectBlitter;

impl SpriteBlitter for RectBlitter {
    fn draw(&mut self, target: &mut Bitmap<u16>, clip: &Rect, params: &SpriteParams) {
        for dy in 0..i32::from(params.height) {
            for dx in 0..i32::from(params.width) {
                let x = params.sx + dx;
                let y = params.sy + dy;
                if clip.contains(x, y) {
                    target.put(x as usize, y as usize, params.color_base + 1);
                }
            }
        }
    }
}

fn populated_video() -> Ms32Video {
    let mut video = Ms32Video::new(VideoConfig::default());
    for cell in 0..64 * 64 {
        video.write_bg_ram(cell * 2, (cell & 0xff) as u16, 0xffff);
        video.write_bg_ram(cell * 2 + 1, (cell & 0xf) as u16, 0xffff);
        video.write_tx_ram(cell * 2, (cell & 0x7f) as u16, 0xffff);
    }
    for cell in 0..128 * 128 {
        video.write_roz_ram(cell * 2, (cell & 0xff) as u16, 0xffff);
    }
    video.write_roz_ctrl(0x10 / 4, 0x80, 0xffff_ffff);
    video.write_roz_ctrl(0x18 / 4, 0x20, 0xffff_ffff);
    video.write_roz_ctrl(0x20 / 4, 0x80, 0xffff_ffff);
    for sprite in 0..64usize {
        let base = sprite * 8;
        video.write_sprite_ram(base, 0x0004, 0xffff);
        video.write_sprite_ram(base + 2, 0x1001 + sprite as u16, 0xffff);
        video.write_sprite_ram(base + 3, 0x0f0f, 0xffff);
        video.write_sprite_ram(base + 4, (sprite * 3 % 224) as u16, 0xffff);
        video.write_sprite_ram(base + 5, (sprite * 5 % 320) as u16, 0xffff);
        video.write_sprite_ram(base + 6, 0x100, 0xffff);
        video.write_sprite_ram(base + 7, 0x100, 0xffff);
    }
    video.vblank();
    video
}

fn bench_render_frame(c: &mut Criterion) {
    let mut video = populated_video();
    let gfx = SolidGfx::new(0x100);
    let mut blitter = RectBlitter;
    let clip = video.screen().visible;
    let mut frame: Bitmap<u32> = Bitmap::new(clip.width() as usize, clip.height() as usize);

    c.bench_function("render frame", |b| {
        b.iter(|| {
            video
                .render(&gfx, &mut blitter, black_box(&mut frame), &clip)
                .unwrap();
        });
    });
}

criterion_group!(render_benches, bench_render_frame);
criterion_main!(render_benches);
