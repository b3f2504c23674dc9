use antecflux::core::config::SensorConfig;
use antecflux::core::sensors::SensorDescriptor;
use antecflux::error::FluxError;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_load_nonexistent_returns_none() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sensors.conf");

    assert_eq!(SensorConfig::load(&path).unwrap(), None);
}

#[test]
fn test_config_load_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sensors.conf");
    fs::write(
        &path,
        "[cpu]\nsensor=asusec\nname=CPU\n\n[gpu]\nsensor=amdgpu\nname=edge\n",
    )
    .unwrap();

    let config = SensorConfig::load(&path).unwrap().unwrap();

    assert_eq!(config.cpu, SensorDescriptor::new("asusec", "CPU"));
    assert_eq!(config.gpu, SensorDescriptor::new("amdgpu", "edge"));
}

#[test]
fn test_config_malformed_is_error_not_absent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sensors.conf");
    fs::write(&path, "[cpu]\nsensor=asusec\nname=CPU\n").unwrap();

    let err = SensorConfig::load(&path).unwrap_err();
    assert!(matches!(err, FluxError::Config(_)));
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("antec").join("sensors.conf");

    let config = SensorConfig::new(
        SensorDescriptor::new("k10temp", "Tctl"),
        SensorDescriptor::new("nvme", "Composite"),
    );
    config.save(&path).unwrap();

    assert_eq!(SensorConfig::load(&path).unwrap(), Some(config));
}

#[test]
fn test_config_label_with_spaces_survives_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sensors.conf");

    let config = SensorConfig::new(
        SensorDescriptor::new("coretemp", "Package id 0"),
        SensorDescriptor::new("amdgpu", "junction"),
    );
    config.save(&path).unwrap();

    let loaded = SensorConfig::load(&path).unwrap().unwrap();
    assert_eq!(loaded.cpu.label, "Package id 0");
}

#[test]
fn test_config_save_writes_values_unescaped() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sensors.conf");

    let config = SensorConfig::new(
        SensorDescriptor::new("nct6798", r"SYSTIN\0"),
        SensorDescriptor::new("amdgpu", "edge"),
    );
    config.save(&path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains(r"SYSTIN\0"));
    assert_eq!(SensorConfig::load(&path).unwrap(), Some(config));
}

#[test]
fn test_config_load_mixed_case_keys() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sensors.conf");
    fs::write(
        &path,
        "[cpu]\nSensor = asusec\nName = CPU\n\n[gpu]\nSENSOR = amdgpu\nNAME = edge\n",
    )
    .unwrap();

    let config = SensorConfig::load(&path).unwrap().unwrap();
    assert_eq!(config.cpu, SensorDescriptor::new("asusec", "CPU"));
    assert_eq!(config.gpu, SensorDescriptor::new("amdgpu", "edge"));
}
