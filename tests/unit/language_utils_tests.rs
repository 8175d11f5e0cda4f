/*!
 * Tests for language utility functions
 */

use briefgen::language_utils::{detect_document_language, detect_language, is_georgian_char, Language};

#[test]
fn test_parseLanguage_withCodesAndNames_shouldResolve() {
    assert_eq!("ka".parse::<Language>().unwrap(), Language::Georgian);
    assert_eq!("kat".parse::<Language>().unwrap(), Language::Georgian);
    assert_eq!("geo".parse::<Language>().unwrap(), Language::Georgian);
    assert_eq!(" Georgian ".parse::<Language>().unwrap(), Language::Georgian);
    assert_eq!("ქართული".parse::<Language>().unwrap(), Language::Georgian);
    assert_eq!("EN".parse::<Language>().unwrap(), Language::English);
    assert_eq!("eng".parse::<Language>().unwrap(), Language::English);
    assert_eq!("english".parse::<Language>().unwrap(), Language::English);
}

#[test]
fn test_parseLanguage_withUnsupportedOrInvalid_shouldFail() {
    assert!("fr".parse::<Language>().is_err());
    assert!("xx".parse::<Language>().is_err());
    assert!("".parse::<Language>().is_err());
}

#[test]
fn test_detectLanguage_withNoLetters_shouldReturnEnglishWithZeroConfidence() {
    let analysis = detect_language("123 + 456 = 579");
    assert_eq!(analysis.language, Language::English);
    assert_eq!(analysis.confidence, 0.0);
    assert_eq!(analysis.minority_ratio(), 0.0);
}

#[test]
fn test_detectLanguage_withMixedText_shouldReportWinningRatio() {
    // 6 Georgian letters, 4 Latin letters
    let analysis = detect_language("ააააააbbbb");
    assert_eq!(analysis.language, Language::Georgian);
    assert!((analysis.confidence - 0.6).abs() < 1e-9);
    assert!((analysis.minority_ratio() - 0.4).abs() < 1e-9);
    assert_eq!(analysis.details.georgian, 6);
    assert_eq!(analysis.details.latin, 4);
}

#[test]
fn test_detectLanguage_atExactHalf_shouldReturnEnglish() {
    let analysis = detect_language("აბab");
    assert_eq!(analysis.language, Language::English);
    assert!((analysis.confidence - 0.5).abs() < 1e-9);
}

#[test]
fn test_detectLanguage_shouldBeIdempotent() {
    let text = "მიტოზი (mitosis) არის უჯრედის გაყოფა";
    assert_eq!(detect_language(text), detect_language(text));
}

#[test]
fn test_isGeorgianChar_shouldCoverWholeBlock() {
    assert!(is_georgian_char('\u{10A0}'));
    assert!(is_georgian_char('ა'));
    assert!(is_georgian_char('\u{10FF}'));
    assert!(!is_georgian_char('a'));
    assert!(!is_georgian_char('Ж'));
}

#[test]
fn test_detectDocumentLanguage_shouldWeighAllPages() {
    let pages = vec!["Short English", "ძალიან გრძელი ქართული ტექსტი ლექციიდან", ""];
    assert_eq!(detect_document_language(&pages), Language::Georgian);
    assert_eq!(detect_document_language::<&str>(&[]), Language::English);
}
