use std::collections::BTreeMap;
use std::path::Path;

use evovac::prelude::{CollectibleStore, ExclusionZone, Rarity};
use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a fmt subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init();
}

#[derive(Debug, Clone, Copy)]
pub struct RarityStyle {
    pub color: [u8; 3],
    pub radius: u32,
}

/// Top-down view of the horizontal plane centered on the hub.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    /// Half of the world-space side length mapped onto the image.
    pub half_extent: f32,
    pub background: [u8; 3],
    pub zone_color: [u8; 3],
    pub ring_color: [u8; 3],
    /// Safe radius and max spawn distance, drawn as circles around the hub.
    pub rings: Vec<f32>,
    styles: BTreeMap<Rarity, RarityStyle>,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32), half_extent: f32) -> Self {
        let styles = [
            (Rarity::Common, [200, 200, 200]),
            (Rarity::Uncommon, [80, 200, 90]),
            (Rarity::Rare, [70, 130, 240]),
            (Rarity::Epic, [180, 80, 220]),
            (Rarity::Legendary, [250, 170, 40]),
        ]
        .into_iter()
        .map(|(r, color)| (r, RarityStyle { color, radius: 2 }))
        .collect();
        Self {
            image_size,
            half_extent,
            background: [20, 24, 28],
            zone_color: [90, 30, 30],
            ring_color: [70, 70, 70],
            rings: Vec::new(),
            styles,
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_rings(mut self, rings: impl IntoIterator<Item = f32>) -> Self {
        self.rings = rings.into_iter().collect();
        self
    }

    pub fn set_rarity_style(&mut self, rarity: Rarity, style: RarityStyle) {
        self.styles.insert(rarity, style);
    }

    fn world_to_pixel(&self, hub: Vec3, p: Vec3) -> Option<(i64, i64)> {
        let (w, h) = self.image_size;
        let local = Vec2::new(p.x - hub.x, p.z - hub.z) / (2.0 * self.half_extent);
        let x = ((local.x + 0.5) * w as f32).floor() as i64;
        // +Z points up in the image.
        let y = ((0.5 - local.y) * h as f32).floor() as i64;
        (x >= 0 && y >= 0 && x < w as i64 && y < h as i64).then_some((x, y))
    }

    fn pixel_to_world(&self, hub: Vec3, x: u32, y: u32) -> Vec3 {
        let (w, h) = self.image_size;
        let u = (x as f32 + 0.5) / w as f32 - 0.5;
        let v = 0.5 - (y as f32 + 0.5) / h as f32;
        let side = 2.0 * self.half_extent;
        Vec3::new(hub.x + u * side, hub.y, hub.z + v * side)
    }
}

/// Render zones, rings and every live collectible of `store` to a PNG.
pub fn render_world_to_png(
    store: &CollectibleStore,
    zones: &[impl AsRef<ExclusionZone>],
    hub: Vec3,
    config: &RenderConfig,
    out: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let (w, h) = config.image_size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));

    let pixel_size = 2.0 * config.half_extent / w.max(1) as f32;
    for y in 0..h {
        for x in 0..w {
            let p = config.pixel_to_world(hub, x, y);
            if zones.iter().any(|z| z.as_ref().contains(p)) {
                img.put_pixel(x, y, Rgb(config.zone_color));
                continue;
            }
            let d = Vec2::new(p.x - hub.x, p.z - hub.z).length();
            if config
                .rings
                .iter()
                .any(|r| (d - r).abs() <= pixel_size * 0.75)
            {
                img.put_pixel(x, y, Rgb(config.ring_color));
            }
        }
    }

    for c in store.iter() {
        let Some(style) = config.styles.get(&c.rarity()) else {
            continue;
        };
        if let Some((cx, cy)) = config.world_to_pixel(hub, c.position) {
            draw_disc(&mut img, cx, cy, style.radius as i64, style.color);
        }
    }
    draw_disc(&mut img, w as i64 / 2, h as i64 / 2, 4, [255, 255, 255]);

    let out = out.as_ref();
    img.save(out)?;
    info!("Wrote {}", out.display());
    Ok(())
}

fn draw_disc(img: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: [u8; 3]) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && x < w && y < h {
                img.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }
}
