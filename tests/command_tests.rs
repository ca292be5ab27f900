use puncover_core::commands::{execute_build, load_toolchain_output, validate_args, BuildArgs};
use puncover_core::output::read_report;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const SIZES: &str = "00000098 00000004 T pbl_table_addr\t/proj/src/pbl.c:8
000000a4 0000000c T main\t/proj/src/main.c:25
";

const DISASSEMBLY: &str = "00000098 <pbl_table_addr>:
  98:\ta8a8a8a8 \t.word\t0xa8a8a8a8

000000a4 <main>:
  a4:\tb508      \tpush\t{r3, lr}
  a6:\tf7ff fff7 \tbl\t98
  aa:\tbd08      \tpop\t{r3, pc}
";

fn temp_input(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_validate_args_requires_some_input() {
    assert!(validate_args(&BuildArgs::default()).is_err());

    let sizes = temp_input(SIZES);
    let args = BuildArgs {
        sizes: Some(sizes.path().to_path_buf()),
        ..Default::default()
    };
    assert!(validate_args(&args).is_ok());
}

#[test]
fn test_validate_args_rejects_zero_top() {
    let sizes = temp_input(SIZES);
    let args = BuildArgs {
        sizes: Some(sizes.path().to_path_buf()),
        top: 0,
        ..Default::default()
    };
    assert!(validate_args(&args).is_err());
}

#[test]
fn test_load_toolchain_output_reads_every_report() {
    let first = temp_input("main.c:25:5:main\t24\tstatic\n");
    let second = temp_input("pbl.c:8:1:pbl_table_addr\t0\tstatic\n");
    let args = BuildArgs {
        stack_usage: vec![first.path().to_path_buf(), second.path().to_path_buf()],
        ..Default::default()
    };

    let output = load_toolchain_output(&args).unwrap();

    assert!(output.sizes.is_empty());
    assert_eq!(output.stack_usage.len(), 2);
    assert!(output.stack_usage[1].starts_with("pbl.c:8"));
}

#[test]
fn test_execute_build_writes_report() {
    let sizes = temp_input(SIZES);
    let disassembly = temp_input(DISASSEMBLY);
    let stack_usage = temp_input("main.c:25:5:main\t24\tstatic\n");
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.json");

    let args = BuildArgs {
        sizes: Some(sizes.path().to_path_buf()),
        disassembly: Some(disassembly.path().to_path_buf()),
        stack_usage: vec![stack_usage.path().to_path_buf()],
        source_root: Some("/proj".to_string()),
        output_json: Some(output.clone()),
        ..Default::default()
    };
    validate_args(&args).unwrap();

    let collector = execute_build(args).unwrap();
    assert_eq!(collector.stats().stack_usage_parsed, 1);

    let report = read_report(&output).unwrap();
    assert_eq!(report.collapsed_root_folders, vec!["src"]);
    assert_eq!(report.symbols[1].path.as_deref(), Some("src/main.c"));
}

#[test]
fn test_execute_build_missing_input() {
    let args = BuildArgs {
        sizes: Some("/nonexistent/sizes.txt".into()),
        ..Default::default()
    };

    assert!(validate_args(&args).is_err());
    let err = execute_build(args).unwrap_err();
    assert!(err.to_string().contains("size table"));
}

#[test]
fn test_validate_args_rejects_empty_source_root() {
    let sizes = temp_input(SIZES);
    let args = BuildArgs {
        sizes: Some(sizes.path().to_path_buf()),
        source_root: Some(String::new()),
        ..Default::default()
    };

    assert!(validate_args(&args).is_err());
}
