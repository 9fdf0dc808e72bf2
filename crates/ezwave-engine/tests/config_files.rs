//! Loading and saving configuration files.

use std::path::PathBuf;

use ezwave_core::Cell;
use ezwave_engine::{ConfigError, ProbeConfig, SimConfig, Simulation};
use ezwave_test_utils::{small_config, CountingSink};

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ezwave-{}-{name}", std::process::id()))
}

#[test]
fn save_then_load_round_trips() {
    let mut config = small_config();
    config.probes.push(ProbeConfig {
        name: "edge".into(),
        x: 30,
        y: 16,
    });
    config.source.x = Some(8);

    let path = scratch_path("round-trip.toml");
    config.save(&path).unwrap();
    let loaded = SimConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.source_cell(), Cell::new(8, 16));
}

#[test]
fn invalid_file_contents_are_rejected_on_load() {
    let path = scratch_path("bad-probe.toml");
    std::fs::write(
        &path,
        r#"
        [grid]
        nx = 16
        ny = 16

        [[probes]]
        name = "outside"
        x = 3
        y = 40
        "#,
    )
    .unwrap();
    let err = SimConfig::load(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(
        err,
        ConfigError::ProbeOutOfBounds {
            name: "outside".into(),
            x: 3,
            y: 40
        }
    );
}

#[test]
fn loaded_config_drives_a_run() {
    let text = r#"
        dt = 0.4
        total_steps = 25
        snapshot_steps = [5, 24, 25]

        [grid]
        nx = 20
        ny = 24

        [source]
        cutoff = 10

        [materials]
        conductor = { x = [14, 18], y = [2, 6] }
        dielectric = { x = [0, 0], y = [0, 0] }

        [[probes]]
        name = "downstream"
        x = 12
        y = 14
    "#;
    let config = SimConfig::from_toml_str(text).unwrap();
    let mut sim = Simulation::new(&config).unwrap();
    let mut sink = CountingSink::new();
    let summary = sim.run(&mut sink).unwrap();

    assert_eq!(summary.snapshots, 2);
    assert_eq!(sim.state().conductor().count(), 16);
    assert_eq!(sim.state().permittivity().dielectric_count(), 0);
    let names: Vec<&str> = summary.probes.names().collect();
    assert_eq!(names, vec!["source", "downstream"]);
    assert_eq!(summary.probes.get("downstream").unwrap().samples().len(), 25);
}
