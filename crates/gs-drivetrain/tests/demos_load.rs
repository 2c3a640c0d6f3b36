use std::path::Path;

use gs_drivetrain::{Drivetrain, NullPresenter, ScriptedInput, SimOptions, config, run_sim};

fn demos_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

#[test]
fn demo_configs_load_and_validate() {
    for name in ["reference.yaml", "five_speed.yaml"] {
        let path = demos_dir().join(name);
        let config =
            config::load(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        Drivetrain::new(config).unwrap_or_else(|e| panic!("Failed to build {}: {}", name, e));
    }
}

#[test]
fn reference_demo_matches_defaults() {
    let config = config::load_yaml(&demos_dir().join("reference.yaml")).unwrap();
    assert_eq!(config, gs_drivetrain::DrivetrainConfig::default());
}

#[test]
fn demo_script_runs() {
    let config = config::load_yaml(&demos_dir().join("reference.yaml")).unwrap();
    let mut script = ScriptedInput::load_yaml(&demos_dir().join("launch_and_shift.yaml")).unwrap();
    script.validate().unwrap();
    let mut dt = Drivetrain::new(config).unwrap();
    let opts = SimOptions {
        ticks: script.total_ticks(),
        ..Default::default()
    };
    let record = run_sim(&mut dt, &mut script, &mut NullPresenter, &opts).unwrap();
    assert_eq!(record.gear_changes, vec![2, 3]);
}
