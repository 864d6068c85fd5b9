use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn cmd() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("wikitidy").unwrap()
}

fn json_output(args: &[&str]) -> serde_json::Value {
    let output = cmd().args(args).output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    serde_json::from_str(&stdout).unwrap()
}

fn rules_of(parsed: &serde_json::Value) -> Vec<u64> {
    parsed["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["rule"].as_u64().unwrap())
        .collect()
}

/// Copy a fixture directory into a fresh temporary directory.
fn copy_fixture(name: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for entry in fs::read_dir(Path::new("tests/fixtures").join(name)).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, dir.path().join(path.file_name().unwrap())).unwrap();
    }
    dir
}

#[test]
fn clean_exits_0() {
    cmd()
        .args(["check", "tests/fixtures/clean"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no errors found"));
}

#[test]
fn errors_exits_1() {
    cmd()
        .args(["check", "tests/fixtures/errors"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn json_output_is_valid() {
    let parsed = json_output(&["check", "tests/fixtures/errors", "--format", "json"]);

    assert_eq!(parsed["summary"]["errors"].as_u64().unwrap(), 3);
    assert_eq!(parsed["summary"]["warnings"].as_u64().unwrap(), 0);

    let diagnostics = parsed["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 3);

    let book: Vec<_> = diagnostics
        .iter()
        .filter(|d| d["file"].as_str() == Some("Book.wiki"))
        .collect();
    assert_eq!(book.len(), 2);
    assert_eq!(book[0]["rule"].as_u64().unwrap(), 526);
    assert_eq!(book[0]["line"].as_u64().unwrap(), 1);
    assert_eq!(book[1]["rule"].as_u64().unwrap(), 69);
    assert_eq!(book[1]["line"].as_u64().unwrap(), 3);
    assert_eq!(book[1]["title"].as_str().unwrap(), "Book");

    let infobox: Vec<_> = diagnostics
        .iter()
        .filter(|d| d["file"].as_str() == Some("Infobox.wiki"))
        .collect();
    assert_eq!(infobox.len(), 1);
    assert_eq!(infobox[0]["rule_name"].as_str().unwrap(), "Duplicate template argument");
    assert_eq!(infobox[0]["replacements"][0]["automatic"], true);
}

#[test]
fn github_output_format() {
    let output = cmd()
        .args(["check", "tests/fixtures/errors", "--format", "github"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 3);
    for line in stdout.lines() {
        assert!(
            line.starts_with("::error file="),
            "Each line should be a GitHub error annotation, got: {line}"
        );
        assert!(line.contains(",line="), "Annotation should include line number, got: {line}");
        assert!(line.contains(",col="), "Annotation should include column, got: {line}");
    }
    assert!(stdout.contains("title=524 Duplicate template argument::"));
}

#[test]
fn fail_on_error_exits_0_for_warnings_only() {
    cmd()
        .args(["check", "tests/fixtures/warnings", "--fail-on", "error"])
        .assert()
        .success();
}

#[test]
fn fail_on_warning_exits_1_for_warnings() {
    cmd()
        .args(["check", "tests/fixtures/warnings", "--fail-on", "warning"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn only_automatic_reports_fixable_errors() {
    let parsed = json_output(&[
        "check",
        "tests/fixtures/errors",
        "--format",
        "json",
        "--only-automatic",
    ]);
    assert_eq!(rules_of(&parsed), vec![524]);
}

#[test]
fn rule_selection() {
    let parsed = json_output(&["check", "tests/fixtures/errors", "--format", "json", "-r", "69"]);
    assert_eq!(rules_of(&parsed), vec![69]);
}

#[test]
fn unknown_rule_is_an_error() {
    cmd()
        .args(["check", "tests/fixtures/errors", "--rule", "4242"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown rule"));
}

#[test]
fn single_file_check() {
    let parsed = json_output(&["check", "tests/fixtures/errors/Book.wiki", "--format", "json"]);
    assert_eq!(rules_of(&parsed), vec![526, 69]);
    assert_eq!(parsed["diagnostics"][0]["file"].as_str().unwrap(), "Book.wiki");
}

#[test]
fn config_disables_rule() {
    let dir = copy_fixture("errors");
    fs::write(dir.path().join(".wikitidy.toml"), "[rules.526]\nenabled = false\n").unwrap();
    let parsed = json_output(&["check", &dir.path().display().to_string(), "--format", "json"]);
    let rules = rules_of(&parsed);
    assert!(!rules.contains(&526));
    assert_eq!(rules.len(), 2);
}

#[test]
fn empty_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["check", &dir.path().display().to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No wikitext files"));
}

#[test]
fn init_creates_config() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["init"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created .wikitidy.toml"));

    assert!(dir.path().join(".wikitidy.toml").exists());
}

#[test]
fn init_fails_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".wikitidy.toml"), "").unwrap();
    cmd()
        .args(["init"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .code(1);
}

#[test]
fn init_config_is_loadable() {
    let dir = copy_fixture("errors");
    cmd().args(["init"]).current_dir(dir.path()).assert().success();
    cmd()
        .args(["check", "."])
        .current_dir(dir.path())
        .assert()
        .failure()
        .code(1);
}

#[test]
fn explain_rule() {
    cmd()
        .args(["explain", "524"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Duplicate template argument"));
}

#[test]
fn explain_alias() {
    cmd()
        .args(["explain", "512"])
        .assert()
        .success()
        .stdout(predicate::str::contains("interwiki-external-link"));
}

#[test]
fn explain_suggests_close_names() {
    cmd()
        .args(["explain", "incorect-date-link"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean `incorrect-date-link`?"));
}

#[test]
fn explain_lists_rules() {
    cmd()
        .args(["explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("isbn-wrong-syntax"))
        .stdout(predicate::str::contains("duplicate-template-argument"));
}

#[test]
fn fix_writes_automatic_fixes() {
    let dir = copy_fixture("errors");
    cmd()
        .args(["fix", &dir.path().display().to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Infobox"))
        .stdout(predicate::str::contains("1 fixed"));

    let infobox = fs::read_to_string(dir.path().join("Infobox.wiki")).unwrap();
    assert_eq!(
        infobox,
        "{{Infobox person\n| born = 1815\n| name = Ada\n}}\nAda was a mathematician.\n"
    );
    let book = fs::read_to_string(dir.path().join("Book.wiki")).unwrap();
    assert_eq!(
        book,
        fs::read_to_string("tests/fixtures/errors/Book.wiki").unwrap()
    );
}

#[test]
fn fix_dry_run_leaves_files() {
    let dir = copy_fixture("errors");
    cmd()
        .args(["fix", &dir.path().display().to_string(), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would fix"));

    assert_eq!(
        fs::read_to_string(dir.path().join("Infobox.wiki")).unwrap(),
        fs::read_to_string("tests/fixtures/errors/Infobox.wiki").unwrap()
    );
}

#[test]
fn fix_bot_mode_uses_ask_help() {
    let dir = copy_fixture("errors");
    fs::write(
        dir.path().join(".wikitidy.toml"),
        "[rules.526]\nask_help = [\"Ask|{{Which year}}\"]\n",
    )
    .unwrap();
    cmd()
        .args(["fix", &dir.path().display().to_string(), "--bot", "--rule", "526"])
        .assert()
        .success();

    let book = fs::read_to_string(dir.path().join("Book.wiki")).unwrap();
    assert!(book.starts_with("'''Book''' was published in [[1995|1994]]{{Which year}}."));
}

#[test]
fn elements_dump() {
    let parsed = json_output(&[
        "elements",
        "tests/fixtures/errors/Book.wiki",
        "--kind",
        "internal-link",
    ]);
    assert_eq!(parsed["page"]["title"].as_str().unwrap(), "Book");
    let links = parsed["elements"]["internal-link"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["kind"].as_str().unwrap(), "internal-link");
    assert_eq!(links[0]["link"].as_str().unwrap(), "1995");
    assert_eq!(links[0]["text"].as_str().unwrap(), "1994");
}

#[test]
fn elements_dump_all_kinds() {
    let parsed = json_output(&["elements", "tests/fixtures/clean/Paris.wiki"]);
    let elements = parsed["elements"].as_object().unwrap();
    assert_eq!(elements.len(), 7);
    assert_eq!(elements["title"][0]["text"].as_str().unwrap(), "History");
    assert_eq!(elements["category"][0]["name"].as_str().unwrap(), "Capitals in Europe");
    assert_eq!(elements["isbn"].as_array().unwrap().len(), 1);
}

#[test]
fn list_category_members() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".wikitidy.toml"),
        "[rules.524]\ncategory = \"Pages with duplicate arguments\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("Alpha.wiki"),
        "{{T|a=1|a=2}}\n[[Category:Pages with duplicate arguments]]",
    )
    .unwrap();
    fs::write(dir.path().join("Beta.wiki"), "Nothing").unwrap();

    cmd()
        .args(["list", &dir.path().display().to_string(), "524"])
        .assert()
        .success()
        .stdout("Alpha\n");
}

#[test]
fn list_without_special_list_fails() {
    cmd()
        .args(["list", "tests/fixtures/errors", "69"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no page list"));
}
