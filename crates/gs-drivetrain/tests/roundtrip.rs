use gs_drivetrain::config::{load, load_yaml, save_yaml};
use gs_drivetrain::{DrivetrainConfig, GearProfile, GearTable};

#[test]
fn roundtrip_yaml_reference_config() {
    let config = DrivetrainConfig::default();
    config.validate().unwrap();

    let temp_dir = std::env::temp_dir();
    let path = temp_dir.join("gs_drivetrain_roundtrip_reference.yaml");

    save_yaml(&path, &config).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(config, loaded);
}

#[test]
fn roundtrip_yaml_custom_gearbox() {
    let config = DrivetrainConfig {
        max_rpm: 9000.0,
        gears: GearTable::new(vec![
            GearProfile::new(2.9, 7000.0),
            GearProfile::new(1.8, 7500.0),
            GearProfile::new(1.2, 8000.0),
            GearProfile::new(0.95, 8500.0),
        ]),
        debounce_ms: 250,
        damping_factor: 0.2,
        downshift_margin_rpm: 2000.0,
        ..Default::default()
    };

    let path = std::env::temp_dir().join("gs_drivetrain_roundtrip_custom.yaml");
    save_yaml(&path, &config).unwrap();
    let loaded = load(&path).unwrap();

    assert_eq!(config, loaded);
    assert_eq!(loaded.top_gear(), 4);
}

#[test]
fn save_yaml_rejects_invalid_config() {
    let config = DrivetrainConfig {
        min_rpm: 5000.0,
        max_rpm: 4000.0,
        ..Default::default()
    };
    let path = std::env::temp_dir().join("gs_drivetrain_roundtrip_invalid.yaml");
    assert!(save_yaml(&path, &config).is_err());
}
