use std::io::Write;

use indoc::indoc;
use lucov_sourcemap::LineLookup;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use crate::{instrument_file, Driver, DriverConfig};

fn write_fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create fixture file");
    file.write_all(contents.as_bytes()).expect("write fixture");
    file
}

#[test]
fn instruments_a_simple_file_and_registers_the_pair() {
    let fixture = write_fixture("return 42\n");
    let driver = Driver::new(DriverConfig::default()).unwrap();

    let path = fixture.path().to_str().unwrap();
    let result = instrument_file(&driver, path).unwrap();

    let instrumented = std::fs::read_to_string(&result.instrumented_path).unwrap();
    assert!(instrumented.contains("TRACK_NS.track(1)"));
    assert!(instrumented.contains("return 42"));

    assert_eq!(
        driver
            .registry()
            .lookup_by_instrumented(&result.instrumented_path),
        Some(path.to_string())
    );
    assert_eq!(result.source_map.get_original_line(2), LineLookup::Found(1));
}

#[test]
fn empty_path_is_a_validation_error() {
    let driver = Driver::new(DriverConfig::default()).unwrap();
    let err = instrument_file(&driver, "").unwrap_err();
    assert_eq!(err.category(), "Validation");
}

#[test]
fn missing_file_is_an_io_error() {
    let driver = Driver::new(DriverConfig::default()).unwrap();
    let err = instrument_file(&driver, "/no/such/path/does-not-exist.lua").unwrap_err();
    assert_eq!(err.category(), "IO");
}

#[test]
fn unparseable_input_is_a_parse_error() {
    // S6: a dangling open paren can never close.
    let fixture = write_fixture("local x = (\n");
    let driver = Driver::new(DriverConfig::default()).unwrap();
    let err = instrument_file(&driver, fixture.path().to_str().unwrap()).unwrap_err();
    assert_eq!(err.category(), "Parse");
}

#[test]
fn exclude_filter_rejects_a_matching_path() {
    let fixture = write_fixture("return 1\n");
    let path = fixture.path().to_str().unwrap().to_string();
    let config = DriverConfig {
        exclude: vec![regex::escape(&path)],
        ..Default::default()
    };
    let driver = Driver::new(config).unwrap();
    let err = instrument_file(&driver, &path).unwrap_err();
    assert_eq!(err.category(), "Validation");
}

#[test]
fn include_filter_only_admits_matching_paths() {
    let fixture = write_fixture("return 1\n");
    let path = fixture.path().to_str().unwrap().to_string();
    let config = DriverConfig {
        include: vec!["does-not-match-anything".to_string()],
        ..Default::default()
    };
    let driver = Driver::new(config).unwrap();
    let err = instrument_file(&driver, &path).unwrap_err();
    assert_eq!(err.category(), "Validation");
}

#[test]
fn config_loads_from_toml() {
    let toml = indoc! {r#"
        statsfile = "/tmp/coverage.stats"
        include = ["\\.lua$"]
        exclude = ["vendor/"]
        savestepsize = 100
    "#};
    let config = DriverConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.statsfile, Some(std::path::PathBuf::from("/tmp/coverage.stats")));
    assert_eq!(config.include, vec!["\\.lua$".to_string()]);
    assert_eq!(config.exclude, vec!["vendor/".to_string()]);
    assert_eq!(config.savestepsize, Some(100));
}

#[test]
fn config_rejects_malformed_toml() {
    let err = DriverConfig::from_toml_str("not = [valid").unwrap_err();
    assert_eq!(err.category(), "Validation");
}

#[test]
fn shutdown_removes_the_temp_root() {
    let fixture = write_fixture("return 1\n");
    let driver = Driver::new(DriverConfig::default()).unwrap();
    let result = instrument_file(&driver, fixture.path().to_str().unwrap()).unwrap();
    let instrumented_path = result.instrumented_path.clone();
    assert!(instrumented_path.exists());

    driver.shutdown().unwrap();
    assert!(!instrumented_path.exists());
}
