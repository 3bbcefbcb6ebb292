/*!
 * Register-accurate reconstruction of the Jaleco Mega System 32 video
 * pipeline: four tile planes, a rotate/zoom engine, a double-buffered
 * zoomable sprite list and the priority-RAM mixer that composes them into
 * an RGB frame. Tile pixel decoding and the sprite blit itself belong to
 * the host and plug in through the `TileGfx` and `SpriteBlitter` traits.
 */

mod bitmap;
mod component;
mod config;
mod crtc;
mod error;
mod mixer;
mod palette;
mod roz;
mod sprite;
mod tilemap;
mod video;

pub use bitmap::{Bitmap, Rect};
pub use component::{SpriteBlitter, SpriteParams, TileGfx, TileRegion};
pub use config::{BrightnessBank, SpriteOrder, VideoConfig};
pub use crtc::ScreenParams;
pub use error::{Error, Result};
pub use mixer::MixRule;
pub use sprite::SpriteEntry;
pub use tilemap::LayerKind;
pub use video::Ms32Video;
