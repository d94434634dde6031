use fpbatch_core::input::collect_audio_paths;
use fpbatch_core::{
    CollatorConfig, Collator, DecodeError, Extractor, FingerprintPayload, FingerprintProvider,
};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const ID1: &str = "0b6e0f4c-5a3e-4f61-9d2b-7c1a2e3f4a5b";
const ID2: &str = "9f8e7d6c-5b4a-4392-8170-6f5e4d3c2b1a";
const ID3: &str = "44444444-3333-4222-9111-000000000000";

/// Derives a fake fingerprint from the file contents; "garbage" fails to decode
struct ContentProvider;

impl FingerprintProvider for ContentProvider {
    fn fingerprint(&self, audio_path: &Path) -> Result<FingerprintPayload, DecodeError> {
        if !audio_path.is_file() {
            return Err(DecodeError::FileNotFound(audio_path.display().to_string()));
        }
        let bytes = fs::read(audio_path)?;
        if bytes.starts_with(b"garbage") {
            return Err(DecodeError::ToolFailed {
                status: "exit status: 3".to_string(),
                stderr: "ERROR: Empty fingerprint".to_string(),
            });
        }
        Ok(FingerprintPayload::with_fingerprint(
            bytes.len().to_string(),
            String::from_utf8_lossy(&bytes).to_uppercase(),
        ))
    }
}

fn read_lines(path: &Path) -> Vec<Map<String, Value>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap().as_object().cloned().unwrap())
        .collect()
}

fn read_document(path: &Path) -> Map<String, Value> {
    serde_json::from_str::<Value>(&fs::read_to_string(path).unwrap())
        .unwrap()
        .as_object()
        .cloned()
        .unwrap()
}

#[test]
fn test_list_to_jsonl() {
    let temp = tempdir().unwrap();
    let audio_dir = temp.path().join("audio");
    let fp_dir = temp.path().join("fp");
    fs::create_dir_all(&audio_dir).unwrap();

    let a = audio_dir.join(format!("a-{}.flac", ID1));
    let b = audio_dir.join(format!("b-{}.mp3", ID2));
    fs::write(&a, b"flac-bytes").unwrap();
    fs::write(&b, b"mp3-bytes").unwrap();

    let list = temp.path().join("list.txt");
    fs::write(&list, format!("{}\n{}\n\n", a.display(), b.display())).unwrap();

    // 1. Extract
    let paths = collect_audio_paths(&list, &[]).unwrap();
    assert_eq!(paths, vec![a.clone(), b.clone()]);
    let report = Extractor::new(ContentProvider, &fp_dir).run(&paths).unwrap();
    assert!(report.is_success());
    assert_eq!(report.written, 2);

    let doc1 = fp_dir.join(format!("{}.json", ID1));
    let doc2 = fp_dir.join(format!("{}.json", ID2));
    assert!(doc1.is_file());
    assert!(doc2.is_file());

    // 2. Collate
    let output = temp.path().join("fingerprints.jsonl");
    let collation = Collator::new(CollatorConfig::default()).run(&fp_dir, &output).unwrap();
    assert!(collation.is_success());
    assert_eq!(collation.records, 2);

    // Filename-sorted order, one record per line, equal to the documents
    let content = fs::read_to_string(&output).unwrap();
    assert!(content.ends_with('\n'));
    let lines = read_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], read_document(&doc1));
    assert_eq!(lines[1], read_document(&doc2));
    assert_eq!(lines[0]["uuid"], ID1);
    assert_eq!(lines[1]["FINGERPRINT"], "MP3-BYTES");
}

#[test]
fn test_partial_failure_isolation() {
    let temp = tempdir().unwrap();
    let fp_dir = temp.path().join("fp");

    let good = temp.path().join(format!("good-{}.wav", ID1));
    let bad = temp.path().join(format!("bad-{}.wav", ID2));
    let missing = temp.path().join(format!("missing-{}.wav", ID3));
    fs::write(&good, b"pcm").unwrap();
    fs::write(&bad, b"garbage").unwrap();

    let report = Extractor::new(ContentProvider, &fp_dir)
        .run(&[bad.clone(), missing.clone(), good.clone()])
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.written, 1);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.failures[0].path, bad.display().to_string());
    assert_eq!(report.failures[1].path, missing.display().to_string());
    assert!(report.failures[1].error.contains("not found"));

    let docs: Vec<_> = fs::read_dir(&fp_dir).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert_eq!(docs, vec![std::ffi::OsString::from(format!("{}.json", ID1))]);
}

#[test]
fn test_collation_is_byte_identical_across_runs() {
    let temp = tempdir().unwrap();
    let fp_dir = temp.path().join("fp");
    fs::create_dir_all(&fp_dir).unwrap();
    for (name, body) in [
        ("c.json", r#"{"uuid": "c", "z": [1, 2], "a": {"nested": true}}"#),
        ("a.json", r#"{"uuid": "a", "DURATION": "12"}"#),
        ("b.json", "{\n    \"uuid\": \"b\",\n    \"note\": \"x\"\n}\n"),
    ] {
        fs::write(fp_dir.join(name), body).unwrap();
    }

    let first = temp.path().join("first.jsonl");
    let second = temp.path().join("second.jsonl");
    let collator = Collator::new(CollatorConfig::default());
    collator.run(&fp_dir, &first).unwrap();
    collator.run(&fp_dir, &second).unwrap();

    let first_bytes = fs::read(&first).unwrap();
    assert_eq!(first_bytes, fs::read(&second).unwrap());

    let uuids: Vec<Value> = read_lines(&first).into_iter().map(|l| l["uuid"].clone()).collect();
    assert_eq!(uuids, vec!["a", "b", "c"]);
}

#[test]
fn test_valid_and_invalid_documents() {
    let temp = tempdir().unwrap();
    let fp_dir = temp.path().join("fp");
    fs::create_dir_all(&fp_dir).unwrap();

    // M = 3 valid, K = 2 invalid, plus files that are not documents at all
    fs::write(fp_dir.join("1.json"), r#"{"uuid": "1"}"#).unwrap();
    fs::write(fp_dir.join("2.json"), r#"{"uuid": "2"}"#).unwrap();
    fs::write(fp_dir.join("3.json"), r#"{"uuid": "3"}"#).unwrap();
    fs::write(fp_dir.join("bad.json"), "not json").unwrap();
    fs::write(fp_dir.join("list.json"), "[]").unwrap();
    fs::write(fp_dir.join("readme.txt"), "ignored").unwrap();
    fs::write(fp_dir.join("4.json.tmp"), "{").unwrap();

    let output = temp.path().join("out.jsonl");
    let report = Collator::new(CollatorConfig::default()).run(&fp_dir, &output).unwrap();

    assert_eq!(report.found, 5);
    assert_eq!(report.records, 3);
    assert_eq!(report.failed(), 2);
    assert!(report.failures.iter().all(|f| f.kind == "ParseFailure"));
    assert_eq!(read_lines(&output).len(), 3);
}

#[test]
fn test_empty_directory_gives_empty_output() {
    let temp = tempdir().unwrap();
    let fp_dir = temp.path().join("fp");
    fs::create_dir_all(&fp_dir).unwrap();

    let output = temp.path().join("out.jsonl");
    let report = Collator::new(CollatorConfig::default()).run(&fp_dir, &output).unwrap();

    assert!(report.is_success());
    assert_eq!(report.records, 0);
    assert!(output.is_file());
    assert!(fs::read(&output).unwrap().is_empty());
}

#[test]
fn test_directory_input_and_rerun() {
    let temp = tempdir().unwrap();
    let audio_dir = temp.path().join("audio");
    let fp_dir = temp.path().join("fp");
    fs::create_dir_all(audio_dir.join("album")).unwrap();
    fs::write(audio_dir.join(format!("{}.m4a", ID1)), b"one").unwrap();
    fs::write(audio_dir.join("album").join(format!("t-{}.FLAC", ID2)), b"two").unwrap();
    fs::write(audio_dir.join("cover.jpg"), b"img").unwrap();

    let extensions: Vec<String> = ["flac", "m4a"].iter().map(|e| e.to_string()).collect();
    let paths: Vec<PathBuf> = collect_audio_paths(&audio_dir, &extensions).unwrap();
    assert_eq!(paths.len(), 2);

    let first = Extractor::new(ContentProvider, &fp_dir).run(&paths).unwrap();
    assert_eq!(first.written, 2);

    // A second run over a populated output directory skips everything
    let second = Extractor::new(ContentProvider, &fp_dir).run(&paths).unwrap();
    assert_eq!(second.skipped, 2);
    assert!(second.is_success());
}
