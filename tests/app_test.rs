mod common;

use std::sync::Arc;

use common::{is_structuring, ok, ScriptedClient};
use qa_dataset_builder::error::ErrorKind;
use qa_dataset_builder::{App, Config, ExportOptions, Stage};
use serde_json::Value;

fn test_config(dir: &std::path::Path) -> Config {
    Config {
        chunk_size: 300,
        chunk_overlap: 50,
        diagnostics_file: dir.join("diagnostics.txt").to_string_lossy().into_owned(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_run_exports_dataset_and_sft() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.md");
    let table = dir.path().join("terms.csv");
    let slides = dir.path().join("slides.pptx");
    std::fs::write(&notes, "# 所有權\n\nRust 以所有權管理記憶體。").unwrap();
    std::fs::write(&table, "term,meaning\n借用,暫時使用值而不取得所有權\n").unwrap();
    std::fs::write(&slides, "binary").unwrap();

    let client = Arc::new(ScriptedClient::new(|request| {
        if is_structuring(request) {
            ok(r#"[{"question":"什麼是所有權？","answer":"一種管理記憶體的規則。"}]"#)
        } else {
            ok("Q: 什麼是所有權？\n\nA: 一種管理記憶體的規則。")
        }
    }));
    let config = test_config(dir.path());
    let app = App::with_client(config.clone(), client).unwrap();

    let export = ExportOptions {
        dataset_path: Some(dir.path().join("qa_pairs.json")),
        sft_path: Some(dir.path().join("sft_qa_pairs.json")),
        sft_system_prompt: config.sft_system_prompt.clone(),
    };
    let report = app
        .run(&[notes, table, slides.clone()], &export)
        .await
        .unwrap();

    assert_eq!(report.records().len(), 2);
    assert_eq!(report.stats.total_records, 2);
    assert_eq!(report.stats.unique_sources, 2);
    assert_eq!(report.written.len(), 2);

    // 不支持的文件只产生一条加载诊断
    assert_eq!(report.diagnostics().len(), 1);
    let diagnostic = &report.diagnostics()[0];
    assert_eq!(diagnostic.stage, Stage::Loading);
    assert_eq!(diagnostic.kind(), ErrorKind::Load);
    assert_eq!(diagnostic.source, slides.display().to_string());

    let dataset: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("qa_pairs.json")).unwrap())
            .unwrap();
    assert_eq!(dataset["total_count"], 2);
    assert_eq!(dataset["generated_timestamp"], report.generated_timestamp.as_str());
    assert_eq!(dataset["qa_pairs"][0]["question"], "什麼是所有權？");

    let sft: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("sft_qa_pairs.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(sft.as_array().map(Vec::len), Some(2));
    assert_eq!(sft[0]["messages"][0]["content"], "你是一個有用的AI助手。");
    assert_eq!(sft[0]["messages"][2]["role"], "assistant");

    let diagnostics = std::fs::read_to_string(dir.path().join("diagnostics.txt")).unwrap();
    assert!(diagnostics.contains("[加载 #2]"));
    assert!(diagnostics.contains("LoadError"));
}

#[tokio::test]
async fn test_run_without_records_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "一段文字。").unwrap();

    let client = Arc::new(ScriptedClient::queue(vec![
        ok("Q: a?\n\nA: b"),
        ok("no json here"),
    ]));
    let config = test_config(dir.path());
    let app = App::with_client(config.clone(), client).unwrap();

    let output = dir.path().join("qa_pairs.json");
    let report = app
        .run(&[notes], &ExportOptions::dataset(&output, &config))
        .await
        .unwrap();

    assert!(report.records().is_empty());
    assert!(report.written.is_empty());
    assert!(!output.exists());
    assert_eq!(report.diagnostics().len(), 1);
    assert_eq!(report.diagnostics()[0].kind(), ErrorKind::StructuredOutput);
}

#[tokio::test]
async fn test_run_with_no_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient::queue(Vec::new()));
    let config = test_config(dir.path());
    let app = App::with_client(config.clone(), client.clone()).unwrap();

    let report = app.run(&[], &ExportOptions::none(&config)).await.unwrap();

    assert!(report.records().is_empty());
    assert!(report.diagnostics().is_empty());
    assert!(client.requests().is_empty());
    assert!(!dir.path().join("diagnostics.txt").exists());
}

/// 真实 API 端到端测试
///
/// 运行方式：
/// ```bash
/// OPENAI_API_KEY=... cargo test test_live_generation -- --ignored --nocapture
/// ```
#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_live_generation() {
    qa_dataset_builder::utils::logging::init(true);

    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(
        &notes,
        "Rust 是一門注重安全與效能的系統程式語言，由 Mozilla 研究院於 2010 年首次公開。",
    )
    .unwrap();

    let config = Config::from_env();
    let app = App::initialize(config.clone()).expect("需要设置 OPENAI_API_KEY");
    let report = app
        .run(&[notes], &ExportOptions::none(&config))
        .await
        .expect("运行失败");

    for record in report.records() {
        println!("Q: {}\nA: {}\n", record.question(), record.answer());
    }
    assert!(!report.records().is_empty());
}
