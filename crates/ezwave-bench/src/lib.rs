//! Benchmark profiles for the ezwave simulator.
//!
//! - [`reference_profile`]: the default 200x200 scattering scenario (40K cells)
//! - [`stress_profile`]: 632x632 (~400K cells) with every region scaled up

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ezwave_engine::{RegionConfig, SimConfig};

/// The default scenario: 200x200 grid, Gaussian source at the centre,
/// a 40x40 dielectric block, 300 steps.
///
/// Snapshots are left unscheduled so a run measures stepping alone.
pub fn reference_profile() -> SimConfig {
    SimConfig {
        snapshot_steps: Vec::new(),
        ..SimConfig::default()
    }
}

/// Same scenario at roughly 10x the cell count, with a populated
/// conductor block so the clamp phase does real work.
pub fn stress_profile() -> SimConfig {
    let mut config = reference_profile();
    config.grid.nx = 632;
    config.grid.ny = 632;
    config.materials.dielectric = RegionConfig::square(126, 252);
    config.materials.conductor = RegionConfig::square(380, 440);
    config
}

/// Number of cells in a profile's grid.
pub fn cell_count(config: &SimConfig) -> usize {
    config.grid.nx * config.grid.ny
}
