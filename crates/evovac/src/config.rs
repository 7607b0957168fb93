//! Loading spawn and capture setups from RON documents.
//!
//! ```ron
//! (
//!     config: (hub: Some((0.0, 0.0, 0.0)), safe_radius: 20.0, max_spawn_distance: 200.0),
//!     table: (
//!         tiers: [(rarity: Common, base_spawn_chance: 0.7)],
//!         archetypes: [(id: "bottle", rarity: Common, weight: 0.5)],
//!     ),
//!     zones: [(name: "pond", shape: Circle(radius: 12.0), position: (40.0, 0.0, 10.0))],
//!     default_curves: true,
//! )
//! ```
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capture::config::CaptureConfig;
use crate::capture::resources::PoolLimits;
use crate::capture::vacuum::Vacuum;
use crate::error::{Error, Result};
use crate::spawn::engine::{DistributionEngine, SpawnConfig};
use crate::spawn::terrain::Terrain;
use crate::spawn::zone::ExclusionZone;
use crate::spawn::SpawnTable;

/// Everything needed to build a [`DistributionEngine`] apart from the terrain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSetup {
    pub config: SpawnConfig,
    pub table: SpawnTable,
    pub zones: Vec<ExclusionZone>,
    /// Install the default rarity curves when the table authors none.
    pub default_curves: bool,
}

impl SpawnSetup {
    pub fn into_engine(self, terrain: Option<Arc<dyn Terrain>>) -> Result<DistributionEngine> {
        let table = if self.default_curves {
            self.table
                .with_default_curves(self.config.max_spawn_distance)
        } else {
            self.table
        };
        let engine = DistributionEngine::try_new(self.config, table, terrain)?;
        Ok(engine.with_zones(self.zones.into_iter().map(Arc::new)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VacuumSetup {
    pub capture: CaptureConfig,
    pub limits: PoolLimits,
}

impl VacuumSetup {
    pub fn into_vacuum(self) -> Result<Vacuum> {
        Vacuum::try_new(self.capture, self.limits)
    }
}

fn from_ron<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T> {
    ron::from_str(text).map_err(|e| Error::Parse(e.to_string()))
}

pub fn spawn_setup_from_ron(text: &str) -> Result<SpawnSetup> {
    from_ron(text)
}

pub fn spawn_table_from_ron(text: &str) -> Result<SpawnTable> {
    from_ron(text)
}

pub fn capture_config_from_ron(text: &str) -> Result<CaptureConfig> {
    let config: CaptureConfig = from_ron(text)?;
    config.validate()?;
    Ok(config)
}

pub fn vacuum_setup_from_ron(text: &str) -> Result<VacuumSetup> {
    from_ron(text)
}

/// Read and parse a [`SpawnSetup`] file.
pub fn load_spawn_setup(path: impl AsRef<Path>) -> Result<SpawnSetup> {
    let text = std::fs::read_to_string(path)?;
    spawn_setup_from_ron(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::zone::ZoneShape;
    use crate::spawn::Rarity;

    const SETUP: &str = r#"(
        config: (hub: Some((0.0, 0.0, 0.0)), safe_radius: 10.0, max_spawn_distance: 120.0),
        table: (
            tiers: [
                (rarity: Common, base_spawn_chance: 0.7),
                (rarity: Rare, base_spawn_chance: 0.3),
            ],
            curves: [(rarity: Rare, curve: (keys: [(input: 120.0, value: 1.0), (input: 0.0, value: 0.1)], interpolation: Linear))],
            archetypes: [
                (id: "bottle", name: "Plastic Bottle", rarity: Common, weight: 0.5, sell_value: 1),
                (id: "watch", rarity: Rare, storage_size: 2, sell_value: 40),
            ],
        ),
        zones: [
            (name: "pond", shape: Circle(radius: 12.0), position: (40.0, 0.0, 10.0)),
            (name: "shed", shape: Box(size: (6.0, 4.0)), position: (-30.0, 0.0, 0.0), yaw: 0.5),
        ],
    )"#;

    #[test]
    fn parses_spawn_setup() {
        let setup = spawn_setup_from_ron(SETUP).expect("valid setup");
        assert_eq!(setup.config.safe_radius, 10.0);
        assert_eq!(setup.config.max_attempts, 30);
        assert_eq!(setup.table.tiers.len(), 2);
        assert_eq!(setup.table.archetypes[1].storage_size, 2);
        assert_eq!(setup.table.archetypes[1].weight, 1.0);
        assert!(matches!(setup.zones[0].shape, ZoneShape::Circle { radius } if radius == 12.0));
        assert_eq!(setup.zones[0].yaw, 0.0);

        // Keys are sorted on load.
        let curve = setup.table.curve_for(Rarity::Rare).expect("rare curve");
        assert_eq!(curve.curve.keys()[0].input, 0.0);

        let engine = setup.into_engine(None).expect("engine");
        assert_eq!(engine.sampler().zones().len(), 2);
    }

    #[test]
    fn default_curves_flag_fills_table() {
        let setup = spawn_setup_from_ron("(default_curves: true)").expect("valid setup");
        let engine = setup.into_engine(None).expect("engine");
        assert_eq!(engine.table().curves.len(), 4);
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        assert!(matches!(
            spawn_setup_from_ron("(config: ("),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn capture_config_is_validated() {
        let cfg = capture_config_from_ron("(suction_power: 25.0, cone_half_angle: 0.3)")
            .expect("valid config");
        assert_eq!(cfg.suction_power, 25.0);
        assert_eq!(cfg.detection_range, 15.0);
        assert!(matches!(
            capture_config_from_ron("(suction_power: -1.0)"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_spawn_setup("does/not/exist.ron"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn vacuum_setup_builds_vacuum() {
        let setup = vacuum_setup_from_ron("(limits: (max_capacity: 20))").expect("valid setup");
        let vacuum = setup.into_vacuum().expect("vacuum");
        assert_eq!(vacuum.pool().max_capacity(), 20);
        assert_eq!(vacuum.pool().max_weight(), 50.0);
    }
}
