use puncover_core::collector::{Collector, ToolchainOutput};
use puncover_core::output::{read_report, to_report, validate_path, write_report};
use puncover_core::utils::config::{CollectorConfig, SCHEMA_VERSION};
use puncover_core::utils::error::OutputError;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const SIZES: &str = "00000098 00000004 T pbl_table_addr\t/proj/src/pbl.c:8
000000a4 0000000c T main\t/proj/src/main.c:25
00000200 00000004 D counter\t/proj/src/main.c:10
";

const DISASSEMBLY: &str = "00000098 <pbl_table_addr>:
  98:\ta8a8a8a8 \t.word\t0xa8a8a8a8

000000a4 <main>:
  a4:\tb508      \tpush\t{r3, lr}
  a6:\tf7ff fff7 \tbl\t98
  aa:\tbd08      \tpop\t{r3, pc}
";

fn collector() -> Collector {
    let output = ToolchainOutput {
        sizes: SIZES.to_string(),
        disassembly: DISASSEMBLY.to_string(),
        stack_usage: vec!["main.c:25:5:main\t24\tstatic".to_string()],
    };
    Collector::build(CollectorConfig::new(), &output)
}

fn temp_input(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_report_snapshot() {
    let report = to_report(&collector());

    assert_eq!(report.version, SCHEMA_VERSION);
    assert_eq!(report.symbols.len(), 3);
    assert_eq!(report.function_count(), 2);
    assert_eq!(report.total_size(), 20);
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.collapsed_root_folders, vec!["/proj/src"]);
    assert_eq!(report.stats.call_edges, 1);
}

#[test]
fn test_write_and_read_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("puncover.json");
    let report = to_report(&collector());

    write_report(&report, &path).unwrap();
    let loaded = read_report(&path).unwrap();

    assert_eq!(loaded.version, report.version);
    assert_eq!(loaded.symbols, report.symbols);
    assert_eq!(loaded.folders, report.folders);
    assert_eq!(loaded.collapsed_root_folders, report.collapsed_root_folders);
}

#[test]
fn test_report_json_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    write_report(&to_report(&collector()), &path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let main = &value["symbols"][1];

    assert_eq!(main["address"], "000000a4");
    assert_eq!(main["type"], "function");
    assert_eq!(main["stack_size"], 24);
    assert_eq!(main["callees"][0], "00000098");
    assert!(value["symbols"][2].get("callers").is_none());
}

#[test]
fn test_write_report_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/deeper/report.json");

    write_report(&to_report(&collector()), &path).unwrap();

    assert!(path.is_file());
}

#[test]
fn test_validate_path_rejects_directory_and_empty() {
    let dir = TempDir::new().unwrap();

    assert!(matches!(
        validate_path(dir.path()),
        Err(OutputError::InvalidPath(_))
    ));
    assert!(matches!(
        validate_path(std::path::Path::new("")),
        Err(OutputError::InvalidPath(_))
    ));
    assert!(validate_path(&dir.path().join("new.json")).is_ok());
}

#[test]
fn test_read_report_invalid_json() {
    let file = temp_input("{ not json");
    assert!(matches!(
        read_report(file.path()),
        Err(OutputError::SerializationFailed(_))
    ));
}
