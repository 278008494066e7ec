use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const CORPUS: &str = "We go to the moon not because it is easy but because it is hard. \
                      We choose to go to the moon in this decade and do the other things.";

fn temp_workspace() -> TempDir {
    tempfile::tempdir().expect("create tempdir")
}

fn run_command(cmd: &mut Command) {
    cmd.assert().success();
}

#[test]
fn train_encode_decode_round_trip() {
    let workspace = temp_workspace();
    let input_path = workspace.path().join("input.txt");
    let vocab_path = workspace.path().join("vocab.json");
    let decoded_path = workspace.path().join("decoded.txt");
    fs::write(&input_path, CORPUS).expect("write input");

    let mut train = Command::cargo_bin("bytepair").expect("binary exists");
    train.current_dir(workspace.path()).args([
        "--quiet",
        "train",
        "input.txt",
        "--vocab-size",
        "300",
        "--no-progress",
        "-o",
        "vocab.json",
    ]);
    run_command(&mut train);
    assert!(vocab_path.exists(), "vocab.json was created");

    let mut encode = Command::cargo_bin("bytepair").expect("binary exists");
    let encode_output = encode
        .current_dir(workspace.path())
        .args(["--quiet", "encode", "-m", "vocab.json", "input.txt", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let encoded: Value =
        serde_json::from_slice(&encode_output).expect("encoded output is valid JSON");
    let tokens = encoded["tokens"]
        .as_array()
        .expect("tokens array")
        .iter()
        .map(|v| v.as_u64().expect("u64 token"))
        .collect::<Vec<_>>();
    assert!(!tokens.is_empty(), "some tokens produced");
    assert!(tokens.len() < CORPUS.len(), "merges compress the corpus");

    let mut decode = Command::cargo_bin("bytepair").expect("binary exists");
    let mut args = vec![
        "--quiet".to_string(),
        "decode".to_string(),
        "-m".to_string(),
        "vocab.json".to_string(),
        "--output".to_string(),
        "decoded.txt".to_string(),
    ];
    args.extend(tokens.iter().map(|tok| tok.to_string()));
    decode.current_dir(workspace.path()).args(args);
    run_command(&mut decode);

    let decoded = fs::read_to_string(&decoded_path).expect("read decoded output");
    assert_eq!(decoded, CORPUS);

    let mut info = Command::cargo_bin("bytepair").expect("binary exists");
    let info_output = info
        .current_dir(workspace.path())
        .args(["--quiet", "info", "-m", "vocab.json", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let summary: Value = serde_json::from_slice(&info_output).expect("info output is JSON");
    assert_eq!(summary["vocab_size"], 300);
    assert_eq!(summary["merges"], 44);
}

#[test]
fn encode_text_with_word_boundaries() {
    let workspace = temp_workspace();
    fs::write(workspace.path().join("input.txt"), "abab abab abab").expect("write input");

    let mut train = Command::cargo_bin("bytepair").expect("binary exists");
    train.current_dir(workspace.path()).args([
        "--quiet",
        "train",
        "input.txt",
        "--vocab-size",
        "260",
        "--no-progress",
    ]);
    run_command(&mut train);

    let mut encode = Command::cargo_bin("bytepair").expect("binary exists");
    let output = encode
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "encode",
            "-m",
            "vocab.json",
            "--text",
            "abab",
            "--preserve-word-boundaries",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let encoded: Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(encoded["path"], "text");
    assert_eq!(encoded["tokens"].as_array().map(Vec::len), Some(1));
}

#[test]
fn skip_existing_leaves_artifact_untouched() {
    let workspace = temp_workspace();
    fs::write(workspace.path().join("input.txt"), "abab").expect("write input");
    fs::write(workspace.path().join("vocab.json"), "placeholder").expect("write vocab");

    let mut train = Command::cargo_bin("bytepair").expect("binary exists");
    train.current_dir(workspace.path()).args([
        "--quiet",
        "train",
        "input.txt",
        "--skip-existing",
        "--no-progress",
    ]);
    run_command(&mut train);

    let contents = fs::read_to_string(workspace.path().join("vocab.json")).expect("read vocab");
    assert_eq!(contents, "placeholder");
}

#[test]
fn decode_rejects_unknown_token() {
    let workspace = temp_workspace();
    fs::write(workspace.path().join("input.txt"), "abab").expect("write input");

    let mut train = Command::cargo_bin("bytepair").expect("binary exists");
    train.current_dir(workspace.path()).args([
        "--quiet",
        "train",
        "input.txt",
        "--vocab-size",
        "258",
        "--no-progress",
    ]);
    run_command(&mut train);

    let mut decode = Command::cargo_bin("bytepair").expect("binary exists");
    decode
        .current_dir(workspace.path())
        .args(["--quiet", "decode", "-m", "vocab.json", "97", "5000"])
        .assert()
        .failure();
}
