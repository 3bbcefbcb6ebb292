/*!
 * Blanking/display timing registers. Width registers hold `0x1000 - value`
 * (the hardware counts each interval down from a fixed base), and any change
 * to the dot clock or a width recomputes the visible rectangle and refresh
 * period. The sync porch registers are accepted and logged but do not affect
 * emulated geometry.
 */

use crate::bitmap::Rect;
use log::{debug, warn};

const DOTCLOCK_SLOW_HZ: f64 = 6_000_000.0;
const DOTCLOCK_FAST_HZ: f64 = 8_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenParams {
    pub visible: Rect,
    pub htotal: u32,
    pub vtotal: u32,
    pub refresh_hz: f64,
}

/// Result of one register write; the owner propagates flips to the tile
/// layers, the geometry is readable through `screen()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrtcWriteEffect {
    pub flip_changed: Option<bool>,
}

pub struct Crtc {
    dotclock: u32,
    flip: bool,
    horz_blank: u16,
    horz_display: u16,
    vert_blank: u16,
    vert_display: u16,
    screen: ScreenParams,
}

impl Crtc {
    pub fn new() -> Self {
        let mut crtc = Self {
            dotclock: 0,
            flip: false,
            // Standard raster until the game programs its own timings.
            horz_blank: 64,
            horz_display: 320,
            vert_blank: 39,
            vert_display: 224,
            screen: ScreenParams {
                visible: Rect::new(0, 0, 0, 0),
                htotal: 0,
                vtotal: 0,
                refresh_hz: 0.0,
            },
        };
        crtc.refresh_screen_params();
        crtc
    }

    pub fn flip(&self) -> bool {
        self.flip
    }

    pub fn screen(&self) -> &ScreenParams {
        &self.screen
    }

    fn write_reg(raw: u32) -> u16 {
        0x1000 - (raw & 0xfff) as u16
    }

    fn refresh_screen_params(&mut self) {
        if self.horz_display == 0 || self.vert_display == 0 {
            warn!(
                "degenerate display geometry {}x{}, clamping",
                self.horz_display, self.vert_display
            );
            self.horz_display = self.horz_display.max(1);
            self.vert_display = self.vert_display.max(1);
        }
        let htotal = u32::from(self.horz_blank) + u32::from(self.horz_display);
        let vtotal = u32::from(self.vert_blank) + u32::from(self.vert_display);
        let pixel_clock = if self.dotclock & 1 != 0 {
            DOTCLOCK_FAST_HZ
        } else {
            DOTCLOCK_SLOW_HZ
        };
        self.screen = ScreenParams {
            visible: Rect::new(
                0,
                i32::from(self.horz_display) - 1,
                0,
                i32::from(self.vert_display) - 1,
            ),
            htotal,
            vtotal,
            refresh_hz: pixel_clock / f64::from(htotal * vtotal),
        };
    }

    /// Register write, `offset` in 32-bit words from the block base.
    pub fn write(&mut self, offset: usize, data: u32, mask: u32) -> CrtcWriteEffect {
        let mut effect = CrtcWriteEffect::default();
        match offset {
            // 0x00: control byte
            // ---- x--- toggled by several games, unknown
            // ---- -x-- seen once, unknown
            // ---- --x- flip screen
            // ---- ---x dotclock select (1) fast (0) slow
            0 => {
                if mask & 0xff != 0 {
                    if (data & 1) != self.dotclock {
                        self.dotclock = data & 0x01;
                        self.refresh_screen_params();
                    }
                    let flip = data & 0x02 != 0;
                    if flip != self.flip {
                        self.flip = flip;
                    }
                    effect.flip_changed = Some(flip);
                }
            }
            // 0x04
            1 => {
                self.horz_blank = Self::write_reg(data);
                self.refresh_screen_params();
            }
            // 0x08
            2 => {
                self.horz_display = Self::write_reg(data);
                self.refresh_screen_params();
            }
            // 0x0c / 0x10
            3 => debug!("crtc: hsync back porch {}", 0x1000 - (data & 0xfff)),
            4 => debug!("crtc: hsync front porch {}", 0x1000 - (data & 0xfff)),
            // 0x14
            5 => {
                self.vert_blank = Self::write_reg(data);
                self.refresh_screen_params();
            }
            // 0x18
            6 => {
                self.vert_display = Self::write_reg(data);
                self.refresh_screen_params();
            }
            // 0x1c / 0x20
            7 => debug!("crtc: vsync back porch {}", 0x1000 - (data & 0xfff)),
            8 => debug!("crtc: vsync front porch {}", 0x1000 - (data & 0xfff)),
            _ => warn!(
                "crtc: unknown register write {:#04x} = {:04x}",
                offset * 4,
                data
            ),
        }
        effect
    }
}

impl Default for Crtc {
    fn default() -> Self {
        Self::new()
    }
}
