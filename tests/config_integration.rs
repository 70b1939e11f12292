use sdk_harness::cleanup::CleanupAction;
use sdk_harness::config::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn parse_complete_config_file() {
    let config_content = r#"
[paths]
root = "/src/webrtc"
gn_output_path = "out"
build_output_path = "../published"
gn_target_output_path = "[GN_OUT]/[TARGET]_[PLATFORM]_[CPU]_[CONFIGURATION]"
built_libs_destination_path = "[BUILD_OUTPUT]/[TARGET]/[PLATFORM]/[CPU]/[CONFIGURATION]"
idl_flag_output_path = "out/idls"
idl_generated_files_output_path = "sdk/generated"

[prepare]
files_to_copy = [{ source = "templates/BUILD.gn", destination = "BUILD.gn" }]

[[prepare.variants]]
name = "ortc"
folders_to_link = [{ target = "../ortc/src", link = "third_party/ortc" }]
folders_to_generate = ["out/ortc_gen"]

[[prepare.variants]]
name = "webrtc"

[unit_tests]
log_separator = "\n----- END -----\n"
results_separator = "[==========]"
filter_flag = "--gtest_filter="
failures_log = "Failures.txt"

[[unit_tests.suites]]
name = "rtc_unittests"
tests = ["*", "Flaky.Test", "Slow.Test"]

[[unit_tests.suites]]
name = "audio_unittests"
tests = ["Audio.Mixer"]

[selection]
targets = ["webrtc", "ortc"]
platforms = ["winuwp"]
cpus = ["x86", "arm"]
configurations = ["debug", "release"]
clean_actions = ["cleanOutput", "clean-idls"]

[selection.supported_cpus]
winuwp = ["x86", "x64", "arm"]
"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.paths.build_output_path, "../published");
    assert_eq!(config.prepare.files_to_copy.len(), 1);
    assert_eq!(config.prepare.variants[0].folders_to_link.len(), 1);
    assert!(config.prepare.variants[1].folders_to_generate.is_empty());
    assert_eq!(config.unit_tests.failures_log, "Failures.txt");
    assert_eq!(config.unit_tests.suites[0].tests.len(), 3);
    assert_eq!(config.unit_tests.suites[1].name, "audio_unittests");
    assert_eq!(
        config.selection.clean_actions,
        vec![CleanupAction::CleanOutput, CleanupAction::CleanIdls]
    );
    assert!(config.selection.is_cpu_supported("winuwp", "arm"));
}

#[test]
fn parse_partial_config_uses_defaults() {
    let config_content = r#"
[paths]
gn_output_path = "build/out"
"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    // Explicit value
    assert_eq!(config.paths.gn_output_path, "build/out");
    // Default values
    assert_eq!(config.unit_tests.failures_log, "UnitTestFailures.txt");
    assert_eq!(config.prepare.variants.len(), 2);
}

#[test]
fn parse_invalid_toml_returns_error() {
    let config_content = "this is not valid toml [[[";

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();

    let result = Config::load(Some(file.path()));
    assert!(result.is_err());
}

#[test]
fn parse_unknown_action_returns_error() {
    let config_content = r#"
[selection]
clean_actions = ["cleanEverything"]
"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();

    assert!(Config::load(Some(file.path())).is_err());
}

#[test]
fn parse_separator_in_test_name_returns_error() {
    let config_content = r#"
[[unit_tests.suites]]
name = "rtc_unittests"
tests = ["*", "A.B:C.D"]
"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_content.as_bytes()).unwrap();

    let result = Config::load(Some(file.path()));
    assert!(result.is_err());
}
