/*!
 * Tests for page loading and file system helpers
 */

use briefgen::errors::AppError;
use briefgen::file_utils::{FileManager, InputKind};
use std::path::Path;

use crate::common;

#[test]
fn test_loadPages_fromDirectory_shouldUseNaturalOrder() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "page10.txt", "tenth").unwrap();
    common::create_test_file(temp_dir.path(), "page2.txt", "second").unwrap();
    common::create_test_file(temp_dir.path(), "page1.txt", "first").unwrap();
    common::create_test_file(temp_dir.path(), "notes.md", "ignored").unwrap();

    let pages = FileManager::load_pages(temp_dir.path()).unwrap();
    assert_eq!(pages, vec!["first", "second", "tenth"]);
}

#[test]
fn test_loadPages_fromEmptyDirectory_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let result = FileManager::load_pages(temp_dir.path());
    assert!(matches!(result, Err(AppError::File(_))));
}

#[test]
fn test_loadPages_fromJsonArray_shouldKeepBlankPages() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "pages.json", r#"["Intro", "", "Cells"]"#).unwrap();

    assert_eq!(FileManager::detect_input_kind(&path).unwrap(), InputKind::JsonPages);
    assert_eq!(FileManager::load_pages(&path).unwrap(), vec!["Intro", "", "Cells"]);
}

#[test]
fn test_loadPages_fromMalformedJson_shouldReturnFileError() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "pages.json", r#"{"pages": 3}"#).unwrap();

    assert!(matches!(FileManager::load_pages(&path), Err(AppError::File(_))));
}

#[test]
fn test_loadPages_fromFormFeedText_shouldSplitPages() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "lecture.txt", "One\x0CTwo\x0C\x0CFour\x0C").unwrap();

    assert_eq!(FileManager::detect_input_kind(&path).unwrap(), InputKind::Text);
    assert_eq!(FileManager::load_pages(&path).unwrap(), vec!["One", "Two", "", "Four"]);
}

#[test]
fn test_loadPages_withMissingInput_shouldReturnFileError() {
    let result = FileManager::load_pages("/definitely/not/here.txt");
    assert!(matches!(result, Err(AppError::File(_))));
}

#[test]
fn test_generateOutputPath_shouldSitBesideInput() {
    let path = FileManager::generate_output_path(Path::new("/lectures/week3.txt"), "ka");
    assert_eq!(path, Path::new("/lectures/week3.brief.ka.json"));

    let bare = FileManager::generate_output_path(Path::new("slides.json"), "en");
    assert_eq!(bare, Path::new("slides.brief.en.json"));
}

#[test]
fn test_writeJson_shouldCreateParentDirectories() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("nested").join("out.json");

    FileManager::write_json(&path, &serde_json::json!({ "pageSummaries": [] })).unwrap();

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["pageSummaries"], serde_json::json!([]));
}

#[test]
fn test_findFiles_shouldFilterByExtension() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "a.txt", "a").unwrap();
    common::create_test_file(temp_dir.path(), "b.TXT", "b").unwrap();
    common::create_test_file(temp_dir.path(), "c.json", "[]").unwrap();

    let files = FileManager::find_files(temp_dir.path(), "txt").unwrap();
    assert!(files.iter().all(|f| f.extension().unwrap().to_string_lossy().eq_ignore_ascii_case("txt")));
    assert!(!files.is_empty());
}
