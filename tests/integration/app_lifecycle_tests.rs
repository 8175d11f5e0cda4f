/*!
 * Tests for the application controller: inputs, outputs and the brief store
 */

use std::sync::Arc;

use briefgen::app_controller::{Controller, GenerateRequest};
use briefgen::brief::BriefResult;
use briefgen::database::Repository;
use briefgen::language_utils::Language;
use briefgen::providers::mock::MockProvider;

use crate::common;

fn read_brief(path: &std::path::Path) -> BriefResult {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_generateWith_shouldWriteBriefBesideInput() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "lecture.txt", &common::english_pages(3).join("\x0C")).unwrap();
    let controller = Controller::with_config(common::offline_config(temp_dir.path())).unwrap();
    let provider = MockProvider::working();

    let report = controller
        .generate_with(Arc::new(provider.clone()), None, GenerateRequest::new(&input))
        .await
        .unwrap()
        .expect("brief generated");

    assert_eq!(report.output_path, temp_dir.path().join("lecture.brief.en.json"));
    assert_eq!(report.language, Language::English);
    assert!(!report.reused);
    assert!(report.brief_id.is_none());
    assert_eq!(read_brief(&report.output_path), report.brief);
    assert_eq!(report.brief.page_summaries.len(), 3);
}

#[tokio::test]
async fn test_generateWith_shouldCheckConnectionBeforeRun() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "pages.json", r#"["Cells", "Tissues"]"#).unwrap();
    let controller = Controller::with_config(common::offline_config(temp_dir.path())).unwrap();
    let provider = MockProvider::failing();

    let report = controller
        .generate_with(Arc::new(provider.clone()), None, GenerateRequest::new(&input))
        .await
        .unwrap()
        .expect("degraded brief still written");

    assert_eq!(provider.connection_check_count(), 1);
    assert!(provider.request_count() > 0);
    assert_eq!(report.brief.page_summaries.len(), 2);
    assert!(report.brief.error.is_some());
}

#[tokio::test]
async fn test_generateWith_whenOutputExists_shouldSkip() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "pages.json", r#"["Cells", "Tissues"]"#).unwrap();
    common::create_test_file(temp_dir.path(), "pages.brief.en.json", "{}").unwrap();
    let controller = Controller::with_config(common::offline_config(temp_dir.path())).unwrap();
    let provider = MockProvider::working();

    let report = controller
        .generate_with(Arc::new(provider.clone()), None, GenerateRequest::new(&input))
        .await
        .unwrap();

    assert!(report.is_none());
    assert_eq!(provider.request_count(), 0);
    assert_eq!(provider.connection_check_count(), 0);
}

#[tokio::test]
async fn test_generateWith_withForce_shouldOverwriteOutput() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "pages.json", r#"["Cells", "Tissues"]"#).unwrap();
    let output = common::create_test_file(temp_dir.path(), "pages.brief.en.json", "{}").unwrap();
    let controller = Controller::with_config(common::offline_config(temp_dir.path())).unwrap();

    let mut request = GenerateRequest::new(&input);
    request.force = true;
    let report = controller
        .generate_with(Arc::new(MockProvider::working()), None, request)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.output_path, output);
    assert_eq!(read_brief(&output).page_summaries.len(), 2);
}

#[tokio::test]
async fn test_generateWith_withStore_shouldReuseStoredBrief() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "pages.json", r#"["Cells", "", "Tissues"]"#).unwrap();
    let controller = Controller::with_config(common::offline_config(temp_dir.path())).unwrap();
    let repository = Repository::new_in_memory().unwrap();
    let provider = MockProvider::working();

    let first = controller
        .generate_with(Arc::new(provider.clone()), Some(&repository), GenerateRequest::new(&input))
        .await
        .unwrap()
        .unwrap();
    let brief_id = first.brief_id.clone().expect("brief stored");
    assert_eq!(provider.request_count(), 1);

    let mut again = GenerateRequest::new(&input);
    again.output = Some(temp_dir.path().join("copy.json"));
    let second = controller
        .generate_with(Arc::new(provider.clone()), Some(&repository), again)
        .await
        .unwrap()
        .unwrap();

    assert!(second.reused);
    assert_eq!(second.brief_id.as_deref(), Some(brief_id.as_str()));
    assert_eq!(second.brief, first.brief);
    assert_eq!(provider.request_count(), 1);
    assert_eq!(read_brief(&temp_dir.path().join("copy.json")), first.brief);
}

#[tokio::test]
async fn test_generateWith_withForceAndStore_shouldRegenerate() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "pages.json", r#"["Cells"]"#).unwrap();
    let controller = Controller::with_config(common::offline_config(temp_dir.path())).unwrap();
    let repository = Repository::new_in_memory().unwrap();
    let provider = MockProvider::working();

    controller
        .generate_with(Arc::new(provider.clone()), Some(&repository), GenerateRequest::new(&input))
        .await
        .unwrap();

    let mut forced = GenerateRequest::new(&input);
    forced.force = true;
    let report = controller
        .generate_with(Arc::new(provider.clone()), Some(&repository), forced)
        .await
        .unwrap()
        .unwrap();

    assert!(!report.reused);
    assert_eq!(provider.request_count(), 2);
    assert_eq!(repository.list_briefs(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_generateWith_degradedBrief_shouldNotBeReused() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "pages.json", r#"["Cells", "Tissues"]"#).unwrap();
    let controller = Controller::with_config(common::offline_config(temp_dir.path())).unwrap();
    let repository = Repository::new_in_memory().unwrap();

    let degraded = controller
        .generate_with(Arc::new(MockProvider::failing()), Some(&repository), GenerateRequest::new(&input))
        .await
        .unwrap()
        .unwrap();
    assert!(degraded.brief.error.is_some());

    let provider = MockProvider::working();
    let mut retry = GenerateRequest::new(&input);
    retry.output = Some(temp_dir.path().join("retry.json"));
    let report = controller
        .generate_with(Arc::new(provider.clone()), Some(&repository), retry)
        .await
        .unwrap()
        .unwrap();

    assert!(!report.reused);
    assert!(report.brief.error.is_none());
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_generateWith_withAutoLanguage_shouldFollowDocument() {
    let temp_dir = common::create_temp_dir().unwrap();
    let pages_json = serde_json::to_string(&common::georgian_pages(2)).unwrap();
    let input = common::create_test_file(temp_dir.path(), "ლექცია.json", &pages_json).unwrap();
    let controller = Controller::with_config(common::offline_config(temp_dir.path())).unwrap();

    let report = controller
        .generate_with(
            Arc::new(MockProvider::working_in(Language::Georgian)),
            None,
            GenerateRequest::new(&input),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.language, Language::Georgian);
    assert_eq!(report.output_path, temp_dir.path().join("ლექცია.brief.ka.json"));
}

#[tokio::test]
async fn test_generateWith_withExplicitLanguage_shouldOverrideConfig() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "pages.json", r#"["Cells", "Tissues"]"#).unwrap();
    let mut config = common::offline_config(temp_dir.path());
    config.output_language = "en".to_string();
    let controller = Controller::with_config(config).unwrap();
    let provider = MockProvider::working_in(Language::Georgian);

    let mut request = GenerateRequest::new(&input);
    request.language = Some(Language::Georgian);
    let report = controller
        .generate_with(Arc::new(provider.clone()), None, request)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.language, Language::Georgian);
    assert!(provider.requests()[0].prompt.contains("exclusively in Georgian"));
}

#[tokio::test]
async fn test_generateWith_withMissingInput_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let controller = Controller::with_config(common::offline_config(temp_dir.path())).unwrap();

    let result = controller
        .generate_with(
            Arc::new(MockProvider::working()),
            None,
            GenerateRequest::new(temp_dir.path().join("missing.txt")),
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_listAndShow_shouldReadConfiguredStore() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "pages.json", r#"["Cells", "Tissues"]"#).unwrap();
    let controller = Controller::with_config(common::offline_config(temp_dir.path())).unwrap();
    let repository = controller.open_repository().unwrap();

    let report = controller
        .generate_with(Arc::new(MockProvider::working()), Some(&repository), GenerateRequest::new(&input))
        .await
        .unwrap()
        .unwrap();
    let brief_id = report.brief_id.unwrap();

    let records = controller.list(Some(10)).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, brief_id);
    assert_eq!(records[0].source_name, "pages.json");
    assert_eq!(records[0].provider, "mock");
    assert_eq!(records[0].page_count, 2);

    assert_eq!(controller.show(&brief_id).await.unwrap(), report.brief);
    assert!(controller.show("no-such-id").await.is_err());
}

#[test]
fn test_withConfig_withMissingApiKey_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut config = common::offline_config(temp_dir.path());
    config.llm.provider = briefgen::app_config::LlmProvider::Anthropic;
    for provider in &mut config.llm.available_providers {
        provider.api_key.clear();
    }

    // The key may still come from the environment
    if std::env::var("ANTHROPIC_API_KEY").is_err() {
        assert!(Controller::with_config(config).is_err());
    }
}
