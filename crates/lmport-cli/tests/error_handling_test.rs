use assert_cmd::Command;
use lmport_testing::TestWorld;
use predicates::prelude::*;

#[test]
fn test_missing_input_fails() -> anyhow::Result<()> {
    let world = TestWorld::new();

    let result = world.run(&["does-not-exist.json"])?;
    assert!(!result.success());
    assert!(result.stderr().contains("Error: input file not found"));
    assert!(!world.outdir().exists());
    Ok(())
}

#[test]
fn test_invalid_json_fails_without_output() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let input = world.write_raw_input("broken.json", "[{\"title\": ")?;

    let result = world.run(&[input.to_str().unwrap()])?;
    assert!(!result.success());
    assert!(result.stderr().contains("Error: Failed to load"));
    assert!(!world.outdir().exists());
    Ok(())
}

#[test]
fn test_scalar_document_is_rejected() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let input = world.write_raw_input("scalar.json", "\"just a string\"")?;

    let result = world.run(&[input.to_str().unwrap()])?;
    assert!(!result.success());
    assert!(result.stderr().contains("JSON array or a single conversation object"));
    Ok(())
}

#[test]
fn test_malformed_conversation_still_exported() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let input = world.write_raw_input(
        "odd.json",
        r#"[{"title": "No body", "create_time": 1700000000}]"#,
    )?;

    let result = world.run(&[input.to_str().unwrap()])?;
    assert!(result.success());
    assert!(result.stderr().contains("neither mapping nor messages"));

    let out = world.read_output("Uncategorized/1700000000000.conversation.json")?;
    assert_eq!(out["messages"], serde_json::json!([]));
    Ok(())
}

#[test]
fn test_unparsable_config_fails() -> anyhow::Result<()> {
    let world = TestWorld::new().with_config("[export\n");
    let input = world.write_raw_input("empty.json", "[]")?;

    let result = world.run(&[input.to_str().unwrap()])?;
    assert!(!result.success());
    assert!(result.stderr().contains("Invalid config"));
    Ok(())
}

#[test]
#[allow(deprecated)]
fn test_help_lists_flags() {
    Command::cargo_bin("lmport")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--keywords"))
        .stdout(predicate::str::contains("--outdir"))
        .stdout(predicate::str::contains("--clean"));
}

#[test]
#[allow(deprecated)]
fn test_outdir_from_config() -> anyhow::Result<()> {
    let world = TestWorld::new().with_config("[export]\noutdir = \"from-config\"\n");
    let input = world.write_raw_input("empty.json", "[]")?;

    Command::cargo_bin("lmport")?
        .current_dir(world.temp_dir())
        .env("LMPORT_CONFIG", world.config_path())
        .env_remove("RUST_LOG")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("from-config"));

    assert!(world.temp_dir().join("from-config").is_dir());
    Ok(())
}
