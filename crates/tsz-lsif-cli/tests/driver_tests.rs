use super::*;
use clap::Parser;
use serde_json::Value;

const SNAPSHOT: &str = r#"{
  "documents": [
    {
      "uri": "/@test/a.ts",
      "exports": [{ "name": "foo", "symbol": 0, "kind": "declaration" }]
    }
  ],
  "symbols": [
    {
      "name": "foo",
      "flags": 16,
      "type": 1,
      "hover": "function foo(): void",
      "declarations": [
        {
          "document": 0,
          "range": { "start": { "line": 0, "character": 16 }, "end": { "line": 0, "character": 19 } },
          "fullRange": { "start": { "line": 0, "character": 7 }, "end": { "line": 0, "character": 31 } },
          "text": "foo",
          "kind": 12
        }
      ]
    }
  ],
  "types": [
    { "kind": "primitive", "name": "void" },
    { "kind": "object", "callSignatures": [{ "parameters": [], "returnType": 0 }] }
  ]
}"#;

const CONFIG: &str = r#"{
  // module aliases are relative to the test root
  "projectRoot": "/@test",
  "emitHover": "true",
}"#;

fn parse(args: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("tsz-lsif").chain(args.iter().copied())).unwrap()
}

fn lines(text: &str) -> Vec<Value> {
    text.lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn labels(elements: &[Value]) -> Vec<&str> {
    elements
        .iter()
        .map(|element| element["label"].as_str().unwrap())
        .collect()
}

#[test]
fn writes_dump_to_out_file() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("program.json");
    let config = dir.path().join("lsif.json");
    let out = dir.path().join("dist").join("dump.lsif");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();
    std::fs::write(&config, CONFIG).unwrap();

    let args = parse(&[
        "--snapshot",
        snapshot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);
    let mut stdout = Vec::new();
    let summary = run(&args, &mut stdout).unwrap();

    assert!(stdout.is_empty());
    let elements = lines(&std::fs::read_to_string(&out).unwrap());
    assert_eq!(elements.len(), summary.elements);
    assert_eq!(summary.documents, 1);
    assert_eq!(summary.last_id, elements.len() as u64);
    assert_eq!(elements[0]["projectRoot"], "/@test");

    let monikers: Vec<&Value> = elements
        .iter()
        .filter(|element| element["label"] == "moniker" && element["type"] == "vertex")
        .collect();
    assert_eq!(monikers.len(), 2);
    assert_eq!(monikers[0]["identifier"], "a:");
    assert_eq!(monikers[1]["identifier"], "a:foo");
    assert!(labels(&elements).contains(&"hoverResult"));
}

#[test]
fn writes_dump_to_stdout_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("program.json");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();

    let args = parse(&["-s", snapshot.to_str().unwrap(), "--project-root", "/@test"]);
    let mut stdout = Vec::new();
    let summary = run(&args, &mut stdout).unwrap();

    let elements = lines(&String::from_utf8(stdout).unwrap());
    assert_eq!(elements.len(), summary.elements);
    assert_eq!(elements[0]["label"], "metaData");
    assert_eq!(elements[1]["label"], "project");
}

#[test]
fn flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("program.json");
    let config = dir.path().join("lsif.json");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();
    std::fs::write(&config, CONFIG).unwrap();

    let args = parse(&[
        "--snapshot",
        snapshot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--no-hover",
        "--no-definitions",
        "--no-references",
    ]);
    let resolved = resolve_config(&args).unwrap();
    assert_eq!(resolved.project_root, "/@test");
    assert!(!resolved.emit_hover);
    assert!(!resolved.emit_definitions);
    assert!(!resolved.emit_references);
    assert!(resolved.emit_contains);

    let mut stdout = Vec::new();
    run(&args, &mut stdout).unwrap();
    let elements = lines(&String::from_utf8(stdout).unwrap());
    let labels = labels(&elements);
    assert!(!labels.contains(&"hoverResult"));
    assert!(!labels.contains(&"definitionResult"));
    assert!(!labels.contains(&"referenceResult"));
    assert!(labels.contains(&"contains"));
}

#[test]
fn missing_snapshot_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let args = parse(&["--snapshot", missing.to_str().unwrap()]);
    let err = run(&args, Vec::new()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read snapshot"));
    assert!(format!("{err:#}").contains("nope.json"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("program.json");
    let config = dir.path().join("lsif.json");
    std::fs::write(&snapshot, SNAPSHOT).unwrap();
    std::fs::write(&config, r#"{ "emitHover": "sometimes" }"#).unwrap();

    let args = parse(&[
        "--snapshot",
        snapshot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    let err = resolve_config(&args).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read config"));
}

#[test]
fn snapshot_flag_is_required() {
    assert!(CliArgs::try_parse_from(["tsz-lsif"]).is_err());
}
