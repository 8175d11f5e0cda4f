/*!
 * End-to-end tests of the brief pipeline over the mock provider
 */

use std::sync::Arc;
use std::time::Duration;

use briefgen::brief::orchestrator::NO_READABLE_PAGES;
use briefgen::brief::placeholders::placeholder_page;
use briefgen::brief::{BriefService, LanguageGuard};
use briefgen::language_utils::Language;
use briefgen::providers::mock::{MockProvider, MockReply};

use crate::common;

/// Every page must be written in the expected language
fn assert_monolingual(outcome: &briefgen::BriefOutcome, language: Language) {
    let guard = LanguageGuard::default();
    for entry in &outcome.brief.page_summaries {
        assert!(guard.is_conforming(&entry.title, language), "title of page {}", entry.page_number);
        assert!(guard.is_conforming(&entry.summary, language), "summary of page {}", entry.page_number);
    }
}

#[tokio::test]
async fn test_generate_withSmallEnglishDocument_shouldSummarizeEveryPage() {
    let provider = MockProvider::working();
    let pages = common::english_pages(3);

    let outcome = common::service_with(&provider).generate(&pages, Some(Language::English)).await;

    let numbers: Vec<usize> = outcome.brief.page_summaries.iter().map(|s| s.page_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(outcome.brief.error.is_none());
    assert_eq!(outcome.batches.len(), 1);
    assert_eq!(outcome.fallback_batches(), 0);
    assert_eq!(provider.request_count(), 1);
    assert_eq!(outcome.usage.requests, 1);
    assert_monolingual(&outcome, Language::English);
}

#[tokio::test]
async fn test_generate_withTwentyPages_shouldSplitIntoTwoOrderedBatches() {
    let provider = MockProvider::working().with_delay(Duration::from_millis(20));
    let pages = common::english_pages(20);

    let outcome = common::service_with(&provider).generate(&pages, Some(Language::English)).await;

    let sizes: Vec<usize> = outcome.batches.iter().map(|b| b.page_count).collect();
    assert_eq!(sizes, vec![12, 8]);
    assert_eq!(outcome.brief.page_summaries.len(), 20);
    assert!(outcome.brief.is_contiguous());
    assert!(provider.max_concurrency() <= 3);

    // The second batch is told its real page numbers
    let second_prompt = provider
        .requests()
        .into_iter()
        .find(|r| MockProvider::page_numbers_in(&r.prompt).contains(&13))
        .expect("request for the second batch");
    assert_eq!(MockProvider::page_numbers_in(&second_prompt.prompt), (13..=20).collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_generate_withManyBatches_shouldBoundParallelism() {
    let provider = MockProvider::working().with_delay(Duration::from_millis(30));
    let pages = common::english_pages(40);

    let outcome = common::service_with(&provider).generate(&pages, Some(Language::English)).await;

    assert_eq!(outcome.batches.len(), 4);
    assert_eq!(provider.max_concurrency(), 3);
    assert_eq!(outcome.brief.page_summaries.len(), 40);
    assert!(outcome.brief.is_contiguous());
}

#[tokio::test]
async fn test_generate_withMalformedFirstReply_shouldRecoverOnRetry() {
    let trailing_comma =
        r#"{"pageSummaries": [{"pageNumber": 1, "title": "Cells", "summary": "Cells are small."},]}"#.to_string();
    let provider = MockProvider::scripted(vec![MockReply::Text(trailing_comma), MockReply::Valid(Language::English)]);

    let outcome = common::service_with(&provider)
        .generate(&common::english_pages(1), Some(Language::English))
        .await;

    assert_eq!(provider.request_count(), 2);
    assert_eq!(outcome.batches[0].attempts, 2);
    assert!(!outcome.batches[0].used_fallback);
    assert!(outcome.brief.error.is_none());
    assert_eq!(outcome.brief.page_summaries[0].title, "Lecture Notes 1");
}

#[tokio::test]
async fn test_generate_withOneWrongLanguagePage_shouldReplaceOnlyThatPage() {
    let provider = MockProvider::working().with_responder(|request, _| {
        let english: serde_json::Value =
            serde_json::from_str(&MockProvider::generate_brief_response(&request.prompt, Language::English))
                .map_err(|e| briefgen::ProviderError::ParseError(e.to_string()))?;
        let georgian: serde_json::Value =
            serde_json::from_str(&MockProvider::generate_brief_response(&request.prompt, Language::Georgian))
                .map_err(|e| briefgen::ProviderError::ParseError(e.to_string()))?;

        let mut mixed = english.clone();
        mixed["pageSummaries"][1] = georgian["pageSummaries"][1].clone();
        Ok(mixed.to_string())
    });

    let outcome = common::service_with(&provider)
        .generate(&common::english_pages(3), Some(Language::English))
        .await;

    let options = common::fast_options();
    let expected_placeholder = placeholder_page(Language::English, 2, options.min_words, options.target_words);

    assert_eq!(provider.request_count(), 1);
    assert_eq!(outcome.batches[0].replaced_pages, vec![2]);
    assert_eq!(outcome.brief.page_summaries[0].title, "Lecture Notes 1");
    assert_eq!(outcome.brief.page_summaries[1], expected_placeholder);
    assert_eq!(outcome.brief.page_summaries[2].title, "Lecture Notes 3");
    assert!(outcome.brief.error.is_none());
    assert_monolingual(&outcome, Language::English);
}

#[tokio::test]
async fn test_generate_withFailingProvider_shouldFallBackToPlaceholders() {
    let provider = MockProvider::failing();

    let outcome = common::service_with(&provider)
        .generate(&common::georgian_pages(4), Some(Language::Georgian))
        .await;

    assert_eq!(outcome.brief.page_summaries.len(), 4);
    assert!(outcome.brief.is_contiguous());
    assert_eq!(outcome.batches[0].attempts, 2);
    assert!(outcome.batches[0].used_fallback);
    assert_eq!(outcome.usage.failed_requests, 2);

    let error = outcome.brief.error.as_deref().expect("degraded brief carries an error");
    assert!(error.starts_with("1 of 1 batches used placeholder content"));
    assert_monolingual(&outcome, Language::Georgian);
}

#[tokio::test]
async fn test_generate_withFailingProvider_shouldBeDeterministic() {
    let pages = common::english_pages(5);

    let first = common::service_with(&MockProvider::failing())
        .generate(&pages, Some(Language::English))
        .await;
    let second = common::service_with(&MockProvider::failing())
        .generate(&pages, Some(Language::English))
        .await;

    assert_eq!(first.brief, second.brief);
}

#[tokio::test]
async fn test_generate_withOneFailingBatch_shouldKeepTheOthers() {
    // Only requests that include page 13 fail
    let provider = MockProvider::working().with_responder(|request, _| {
        if MockProvider::page_numbers_in(&request.prompt).contains(&13) {
            Err(briefgen::ProviderError::RateLimitExceeded("quota".to_string()))
        } else {
            Ok(MockProvider::generate_brief_response(&request.prompt, Language::English))
        }
    });

    let outcome = common::service_with(&provider)
        .generate(&common::english_pages(20), Some(Language::English))
        .await;

    assert_eq!(outcome.fallback_batches(), 1);
    assert_eq!(outcome.total_attempts(), 3);
    assert_eq!(outcome.brief.page_summaries.len(), 20);
    assert_eq!(outcome.brief.page_summaries[0].title, "Lecture Notes 1");
    assert_eq!(outcome.brief.page_summaries[12].title, "Study Material Overview");

    let error = outcome.brief.error.as_deref().unwrap();
    assert!(error.contains("1 of 2 batches"));
    assert!(error.contains("batch 2: Provider error: Rate limit exceeded: quota"));
}

#[tokio::test]
async fn test_generate_shouldSkipBlankPagesAndRenumber() {
    let provider = MockProvider::working();
    let pages = vec!["Intro to genetics", "   ", "", "DNA replication", "\n\t"];

    let outcome = common::service_with(&provider).generate(&pages, Some(Language::English)).await;

    assert_eq!(outcome.brief.page_summaries.len(), 2);
    assert!(outcome.brief.is_contiguous());
    let prompt = &provider.requests()[0].prompt;
    assert_eq!(MockProvider::page_numbers_in(prompt), vec![1, 2]);
    assert!(prompt.contains("DNA replication"));
}

#[tokio::test]
async fn test_generate_withOnlyBlankPages_shouldNotCallProvider() {
    let provider = MockProvider::working();

    let outcome = common::service_with(&provider)
        .generate(&["", " "], Some(Language::Georgian))
        .await;

    assert_eq!(provider.request_count(), 0);
    assert!(outcome.brief.page_summaries.is_empty());
    assert_eq!(outcome.brief.error.as_deref(), Some(NO_READABLE_PAGES));
}

#[tokio::test]
async fn test_generate_withCharBudget_shouldSplitLongPages() {
    let provider = MockProvider::working();
    let mut options = common::fast_options();
    options.planner.max_chars_per_batch = 200;
    let pages: Vec<String> = (1..=16).map(|i| format!("Page {} {}", i, "text ".repeat(30))).collect();

    let outcome = BriefService::new(Arc::new(provider.clone()), options)
        .generate(&pages, Some(Language::English))
        .await;

    assert_eq!(outcome.batches.len(), 16);
    assert!(outcome.batches.iter().all(|b| b.page_count == 1));
    assert!(outcome.brief.is_contiguous());
}

#[tokio::test]
async fn test_generate_withGeorgianDocument_shouldDetectLanguage() {
    let provider = MockProvider::working_in(Language::Georgian);

    let outcome = common::service_with(&provider)
        .generate(&common::georgian_pages(2), None)
        .await;

    assert_eq!(outcome.language, Language::Georgian);
    assert!(provider.requests()[0].prompt.contains("exclusively in Georgian"));
    assert_monolingual(&outcome, Language::Georgian);
}
