/*!
 * The owned register/memory aggregate and the once-per-frame render entry.
 * The bus mutates state through the `write_*` methods at any point between
 * renders; the display driver calls `vblank` at each vertical blank and
 * `render` once per frame. Nothing here is re-entrant and nothing needs to
 * be: the caller serializes writes against renders.
 */

use crate::bitmap::{Bitmap, Rect};
use crate::component::{merge_halfword, merge_word, SpriteBlitter, TileGfx};
use crate::config::VideoConfig;
use crate::crtc::{Crtc, ScreenParams};
use crate::error::{Error, Result};
use crate::mixer::{self, UnhandledMasks, PRI_RAM_WORDS};
use crate::palette::Palette;
use crate::roz::RozEngine;
use crate::sprite::SpriteUnit;
use crate::tilemap::TileLayer;
use log::warn;

/// Priority-tag bits stamped by each tile layer.
const TAG_BG: u8 = 1 << 0;
const TAG_ROZ: u8 = 1 << 1;
const TAG_TEXT: u8 = 1 << 2;

pub const SCROLL_REGS: usize = 8;

pub struct Ms32Video {
    config: VideoConfig,

    palette: Palette,
    crtc: Crtc,
    roz: RozEngine,
    sprites: SpriteUnit,

    tx_layer: TileLayer,
    bg_layer: TileLayer,
    bg_alt_layer: TileLayer,
    roz_layer: TileLayer,

    tx_ram: Vec<u16>,
    bg_ram: Vec<u16>,
    roz_ram: Vec<u16>,
    pri_ram: Vec<u16>,

    tx_scroll: [u32; SCROLL_REGS],
    bg_scroll: [u32; SCROLL_REGS],
    layout_control: u32,

    unhandled: UnhandledMasks,

    // per-frame scratch, kept across frames to avoid reallocation
    tile_color: Bitmap<u16>,
    tile_tags: Bitmap<u8>,
    sprite_color: Bitmap<u16>,
}

impl Ms32Video {
    pub fn new(config: VideoConfig) -> Self {
        let tx_layer = TileLayer::text();
        let bg_layer = TileLayer::bg();
        let bg_alt_layer = TileLayer::bg_alt();
        let roz_layer = TileLayer::roz();
        let tx_words = tx_layer.vram_words();
        let bg_words = bg_layer.vram_words();
        let roz_words = roz_layer.vram_words();
        Self {
            config,
            palette: Palette::new(config.brightness_bank),
            crtc: Crtc::new(),
            roz: RozEngine::new(),
            sprites: SpriteUnit::new(),
            tx_layer,
            bg_layer,
            bg_alt_layer,
            roz_layer,
            tx_ram: vec![0; tx_words],
            bg_ram: vec![0; bg_words],
            roz_ram: vec![0; roz_words],
            pri_ram: vec![0; PRI_RAM_WORDS],
            tx_scroll: [0; SCROLL_REGS],
            bg_scroll: [0; SCROLL_REGS],
            layout_control: 0,
            unhandled: UnhandledMasks::new(),
            tile_color: Bitmap::new(0, 0),
            tile_tags: Bitmap::new(0, 0),
            sprite_color: Bitmap::new(0, 0),
        }
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    pub fn screen(&self) -> &ScreenParams {
        self.crtc.screen()
    }

    /// Total pixels rendered through the unhandled-mask fallback so far.
    pub fn unhandled_mask_count(&self) -> u64 {
        self.unhandled.count()
    }

    fn write_ram_word(ram: &mut [u16], offset: usize, data: u16, mask: u16, what: &str) {
        match ram.get_mut(offset) {
            Some(word) => merge_halfword(word, data, mask),
            None => warn!("{} write out of range: {:#x}", what, offset),
        }
    }

    pub fn write_tx_ram(&mut self, offset: usize, data: u16, mask: u16) {
        Self::write_ram_word(&mut self.tx_ram, offset, data, mask, "tx ram");
    }

    pub fn write_bg_ram(&mut self, offset: usize, data: u16, mask: u16) {
        Self::write_ram_word(&mut self.bg_ram, offset, data, mask, "bg ram");
    }

    pub fn write_roz_ram(&mut self, offset: usize, data: u16, mask: u16) {
        Self::write_ram_word(&mut self.roz_ram, offset, data, mask, "roz ram");
    }

    pub fn write_pri_ram(&mut self, offset: usize, data: u16, mask: u16) {
        Self::write_ram_word(&mut self.pri_ram, offset, data, mask, "priority ram");
    }

    pub fn write_palette_ram(&mut self, offset: usize, data: u16, mask: u16) {
        self.palette.write_ram(offset, data, mask);
    }

    pub fn write_brightness(&mut self, offset: usize, data: u32, mask: u32) {
        self.palette.write_brightness(offset, data, mask);
    }

    pub fn write_sprite_ram(&mut self, offset: usize, data: u16, mask: u16) {
        self.sprites.write_ram(offset, data, mask);
    }

    pub fn write_roz_ctrl(&mut self, offset: usize, data: u32, mask: u32) {
        self.roz.write_ctrl(offset, data, mask);
    }

    pub fn write_line_ram(&mut self, offset: usize, data: u16, mask: u16) {
        self.roz.write_line_ram(offset, data, mask);
    }

    pub fn write_tx_scroll(&mut self, offset: usize, data: u32, mask: u32) {
        match self.tx_scroll.get_mut(offset) {
            Some(reg) => merge_word(reg, data, mask),
            None => warn!("tx scroll write out of range: {:#x}", offset),
        }
    }

    pub fn write_bg_scroll(&mut self, offset: usize, data: u32, mask: u32) {
        match self.bg_scroll.get_mut(offset) {
            Some(reg) => merge_word(reg, data, mask),
            None => warn!("bg scroll write out of range: {:#x}", offset),
        }
    }

    /// Bit 0 swaps the square background layout for the wide one.
    pub fn write_layout_control(&mut self, data: u32, mask: u32) {
        merge_word(&mut self.layout_control, data, mask);
    }

    pub fn write_crtc(&mut self, offset: usize, data: u32, mask: u32) {
        let effect = self.crtc.write(offset, data, mask);
        if let Some(flip) = effect.flip_changed {
            // the rotate plane has its own orientation registers and is
            // not flipped by the CRTC bit
            self.tx_layer.set_flip(flip);
            self.bg_layer.set_flip(flip);
            self.bg_alt_layer.set_flip(flip);
        }
    }

    /// Vertical-blank notification: latch the sprite list for display.
    pub fn vblank(&mut self) {
        self.sprites.latch();
    }

    /// Apply the scroll register files. Each axis is the sum of two
    /// registers; the x sums carry small fixed biases that line the planes
    /// up with the sprite coordinate space.
    fn apply_scroll(&mut self) {
        let x = self.tx_scroll[0x00 / 4]
            .wrapping_add(self.tx_scroll[0x08 / 4])
            .wrapping_add(0x18);
        let y = self.tx_scroll[0x0c / 4].wrapping_add(self.tx_scroll[0x14 / 4]);
        self.tx_layer.set_scroll(x, y);

        let x = self.bg_scroll[0x00 / 4]
            .wrapping_add(self.bg_scroll[0x08 / 4])
            .wrapping_add(0x10);
        let y = self.bg_scroll[0x0c / 4].wrapping_add(self.bg_scroll[0x14 / 4]);
        self.bg_layer.set_scroll(x, y);
        self.bg_alt_layer.set_scroll(x, y);
    }

    /// Compose one frame into `frame` within `clip`. Every pixel of the
    /// clip is written; the caller owns pacing and must not overlap this
    /// with register writes.
    pub fn render(
        &mut self,
        gfx: &dyn TileGfx,
        sprites: &mut dyn SpriteBlitter,
        frame: &mut Bitmap<u32>,
        clip: &Rect,
    ) -> Result<()> {
        if clip.is_empty() {
            return Ok(());
        }
        if clip.intersect(&frame.bounds()) != *clip {
            return Err(Error::from_message(format!(
                "clip ({},{})-({},{}) exceeds the {}x{} frame",
                clip.min_x,
                clip.min_y,
                clip.max_x,
                clip.max_y,
                frame.width(),
                frame.height()
            )));
        }

        // brightness may have moved at any point since the last frame;
        // rebuilding every pen is cheaper than tracking which ones changed
        self.palette.refresh_all();

        self.apply_scroll();

        self.tile_color.resize(frame.width(), frame.height());
        self.tile_tags.resize(frame.width(), frame.height());
        self.sprite_color.resize(frame.width(), frame.height());
        self.tile_color.fill(clip, 0);
        self.tile_tags.fill(clip, 0);
        self.sprite_color.fill(clip, 0);

        self.sprites.render(
            sprites,
            &mut self.sprite_color,
            clip,
            self.config.sprite_order,
        );

        let slots = mixer::resolve_layer_slots(&self.pri_ram);
        for slot in 0..4 {
            if slots.rotate == slot {
                self.roz.render(
                    &self.roz_layer,
                    &self.roz_ram,
                    gfx,
                    &mut self.tile_color,
                    &mut self.tile_tags,
                    clip,
                    TAG_ROZ,
                    self.config.roz_wrap,
                );
            } else if slots.scroll == slot {
                let layer = if self.layout_control & 1 != 0 {
                    &self.bg_alt_layer
                } else {
                    &self.bg_layer
                };
                layer.draw(
                    &self.bg_ram,
                    gfx,
                    &mut self.tile_color,
                    &mut self.tile_tags,
                    clip,
                    TAG_BG,
                );
            } else if slots.text == slot {
                self.tx_layer.draw(
                    &self.tx_ram,
                    gfx,
                    &mut self.tile_color,
                    &mut self.tile_tags,
                    clip,
                    TAG_TEXT,
                );
            }
        }

        mixer::compose(
            &self.pri_ram,
            &self.palette,
            &self.tile_color,
            &self.tile_tags,
            &self.sprite_color,
            frame,
            clip,
            &mut self.unhandled,
        );

        Ok(())
    }
}
