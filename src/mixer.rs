/*!
 * Per-pixel priority mixer. Priority RAM is programmed by the game and never
 * fully documented; the mixer replays the behavior the hardware exhibits for
 * the register patterns games actually use. Three fixed cells order the tile
 * layers, and for every pixel an 8-bit mask derived from the sprite's
 * priority value selects a composition rule. Mask values outside the
 * observed set produce a deterministic placeholder pixel and a diagnostic,
 * never a crash.
 */

use crate::bitmap::{Bitmap, Rect};
use crate::palette::{shade_to_black, Palette};
use log::warn;

/// Priority RAM size in 16-bit words; lookups below use byte addresses and
/// halve them, mirroring the bus layout.
pub const PRI_RAM_WORDS: usize = 0x2000;

/// Substituted wherever the mask has no known rule. Deliberately garish so
/// gaps in the rule set are visible in the output instead of silently wrong.
const UNHANDLED_PEN: u32 = 0x00ff00ff;

/// Tile-layer draw order for one frame: slot 0 draws first (bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSlots {
    pub text: u8,
    pub scroll: u8,
    pub rotate: u8,
}

/// Resolve the three layer slots from the fixed priority-RAM cells. The
/// tie-break counters and their evaluation order reproduce the original
/// priority logic exactly; reordering them changes observed titles.
pub fn resolve_layer_slots(pri_ram: &[u16]) -> LayerSlots {
    let mut text = 0;
    let mut scroll = 0;
    let mut rotate = 0;

    if pri_ram[0x2b00 / 2] & 0x00ff == 0x0034 {
        text += 1;
    } else {
        rotate += 1;
    }

    if pri_ram[0x2e00 / 2] & 0x00ff == 0x0034 {
        text += 1;
    } else {
        scroll += 1;
    }

    // 0x09 forces the text layer above everything (attract-mode flames);
    // bits 4-5 of the same cell order the scroll and rotate planes.
    if pri_ram[0x3a00 / 2] == 0x09 {
        text = 3;
    }
    if pri_ram[0x3a00 / 2] & 0x0030 == 0 {
        scroll += 1;
    } else {
        rotate += 1;
    }

    LayerSlots {
        text,
        scroll,
        rotate,
    }
}

/// Byte-address bases probed per mask bit, bit 0 first. Each probe ORs in
/// the sprite priority value and tests bits 3-5 of the word found there.
const MASK_BASES: [u16; 8] = [
    0x1500, 0x1400, 0x1100, 0x1000, 0x0500, 0x0400, 0x0100, 0x0000,
];

pub fn sprite_mask(pri_ram: &[u16], sprite_pri: u16) -> u8 {
    let mut mask = 0u8;
    for (bit, base) in MASK_BASES.iter().enumerate() {
        if pri_ram[usize::from(sprite_pri | 0x0a00 | base) / 2] & 0x38 != 0 {
            mask |= 1 << bit;
        }
    }
    mask
}

/// What to put on screen for one (mask, tile-tag) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixRule {
    /// Sprite pixel if its pen byte is non-zero, tile pixel otherwise.
    SpriteIfOpaque,
    /// Tile pixel regardless of the sprite.
    TileOnly,
    /// Tile pixel blended toward black; the hardware's shadow effect.
    ShadeTile(u8),
    Unhandled,
}

const S: MixRule = MixRule::SpriteIfOpaque;
const T: MixRule = MixRule::TileOnly;
const SH: MixRule = MixRule::ShadeTile(128);

/// Composition rules for every priority mask observed on hardware, indexed
/// by the tile priority tag (the OR of the layer tags present at the
/// pixel). Anything not listed here has never been seen on a real board and
/// falls through to `Unhandled`; guessing a rule would hide the gap.
const RULES: [(u8, [MixRule; 8]); 6] = [
    (0x00, [S, S, S, S, S, S, S, S]),
    (0xcc, [S, S, T, T, S, S, T, T]),
    (0xf0, [S, S, S, S, T, T, T, T]),
    (0xf8, [T, T, S, T, T, T, T, T]),
    (0xfc, [S, S, T, T, T, T, T, T]),
    (0xfe, [S, SH, SH, SH, T, T, T, T]),
];

pub fn rule_for(mask: u8, tag: u8) -> MixRule {
    RULES
        .iter()
        .find(|(m, _)| *m == mask)
        .map(|(_, rules)| rules[usize::from(tag & 7)])
        .unwrap_or(MixRule::Unhandled)
}

/// Diagnostic record of masks with no composition rule. Each distinct value
/// is logged once; the total keeps counting so a host can surface it.
#[derive(Debug)]
pub struct UnhandledMasks {
    seen: [bool; 256],
    count: u64,
}

impl UnhandledMasks {
    pub fn new() -> Self {
        Self {
            seen: [false; 256],
            count: 0,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    fn record(&mut self, mask: u8) {
        self.count += 1;
        if !self.seen[usize::from(mask)] {
            self.seen[usize::from(mask)] = true;
            warn!("unhandled priority mask {:#04x}", mask);
        }
    }
}

impl Default for UnhandledMasks {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge the composed tile and sprite buffers into the output frame.
/// A pure function of its inputs apart from the unhandled-mask diagnostics.
#[allow(clippy::too_many_arguments)]
pub(crate) fn compose(
    pri_ram: &[u16],
    palette: &Palette,
    tile_color: &Bitmap<u16>,
    tile_tags: &Bitmap<u8>,
    sprite_color: &Bitmap<u16>,
    frame: &mut Bitmap<u32>,
    clip: &Rect,
    unhandled: &mut UnhandledMasks,
) {
    // the mask only depends on the sprite priority nibble
    let mut masks = [0u8; 16];
    for (pri, mask) in masks.iter_mut().enumerate() {
        *mask = sprite_mask(pri_ram, (pri as u16) << 4);
    }

    for y in clip.min_y..=clip.max_y {
        for x in clip.min_x..=clip.max_x {
            let (x, y) = (x as usize, y as usize);
            let src_tile = tile_color.pix(x, y);
            let tag = tile_tags.pix(x, y);
            let packed = sprite_color.pix(x, y);
            let sprite_pen = packed & 0x0fff;
            let mask = masks[usize::from(packed >> 12)];

            let pen = match rule_for(mask, tag) {
                MixRule::SpriteIfOpaque => {
                    if sprite_pen & 0xff != 0 {
                        palette.pen(usize::from(sprite_pen))
                    } else {
                        palette.pen(usize::from(src_tile))
                    }
                }
                MixRule::TileOnly => palette.pen(usize::from(src_tile)),
                MixRule::ShadeTile(level) => {
                    shade_to_black(palette.pen(usize::from(src_tile)), level)
                }
                MixRule::Unhandled => {
                    unhandled.record(mask);
                    UNHANDLED_PEN
                }
            };
            frame.put(x, y, pen);
        }
    }
}
