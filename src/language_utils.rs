use anyhow::{Result, anyhow};
use isolang::Language as IsoLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language utilities for brief output languages
///
/// This module resolves user supplied language codes to one of the two
/// supported brief languages and classifies text by the script it is written in.
/// Output language of a brief
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Georgian (Mkhedruli script)
    Georgian,
    /// English (Latin script)
    English,
}

impl Language {
    /// Human readable name, as used in prompts and logs
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Georgian => "Georgian",
            Self::English => "English",
        }
    }

    /// ISO 639-1 code
    pub fn iso_code(&self) -> &'static str {
        match self {
            Self::Georgian => "ka",
            Self::English => "en",
        }
    }

    fn from_iso(lang: IsoLanguage) -> Option<Self> {
        match lang {
            IsoLanguage::Kat => Some(Self::Georgian),
            IsoLanguage::Eng => Some(Self::English),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();

        let iso = match normalized.len() {
            2 => IsoLanguage::from_639_1(&normalized),
            3 => match normalized.as_str() {
                // ISO 639-2/B code, differs from the 639-2/T "kat"
                "geo" => Some(IsoLanguage::Kat),
                code => IsoLanguage::from_639_3(code),
            },
            _ => match normalized.as_str() {
                "georgian" | "ქართული" => Some(IsoLanguage::Kat),
                "english" => Some(IsoLanguage::Eng),
                _ => None,
            },
        };

        match iso {
            Some(lang) => Self::from_iso(lang)
                .ok_or_else(|| anyhow!("Unsupported brief language: {} ({})", s, lang.to_name())),
            None => Err(anyhow!("Invalid language code: {}", s)),
        }
    }
}

/// Letter counts per script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScriptCounts {
    /// Characters in U+10A0..=U+10FF
    pub georgian: usize,
    /// ASCII letters
    pub latin: usize,
}

impl ScriptCounts {
    /// Count the letters of both scripts in a text
    pub fn count(text: &str) -> Self {
        text.chars().fold(Self::default(), |mut counts, c| {
            if is_georgian_char(c) {
                counts.georgian += 1;
            } else if c.is_ascii_alphabetic() {
                counts.latin += 1;
            }
            counts
        })
    }

    /// Sum of both scripts
    pub fn total(&self) -> usize {
        self.georgian + self.latin
    }
}

/// Result of classifying a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LanguageAnalysis {
    /// Dominant language
    pub language: Language,
    /// Share of the dominant script among all counted letters (0..=1)
    pub confidence: f64,
    /// Raw counts
    pub details: ScriptCounts,
}

impl LanguageAnalysis {
    /// Share of letters that belong to the non-dominant script
    pub fn minority_ratio(&self) -> f64 {
        if self.details.total() == 0 {
            0.0
        } else {
            1.0 - self.confidence
        }
    }
}

/// Check if a character is in the Georgian Unicode block
pub fn is_georgian_char(c: char) -> bool {
    ('\u{10A0}'..='\u{10FF}').contains(&c)
}

/// Classify text as Georgian or English from its script ratio
///
/// Text without any letters of either script is reported as English with
/// a confidence of zero.
pub fn detect_language(text: &str) -> LanguageAnalysis {
    let details = ScriptCounts::count(text);
    let total = details.total();

    if total == 0 {
        return LanguageAnalysis {
            language: Language::English,
            confidence: 0.0,
            details,
        };
    }

    let georgian_ratio = details.georgian as f64 / total as f64;
    if georgian_ratio > 0.5 {
        LanguageAnalysis {
            language: Language::Georgian,
            confidence: georgian_ratio,
            details,
        }
    } else {
        LanguageAnalysis {
            language: Language::English,
            confidence: details.latin as f64 / total as f64,
            details,
        }
    }
}

/// Dominant language of a whole document
pub fn detect_document_language<S: AsRef<str>>(pages: &[S]) -> Language {
    let details = pages
        .iter()
        .map(|p| ScriptCounts::count(p.as_ref()))
        .fold(ScriptCounts::default(), |acc, c| ScriptCounts {
            georgian: acc.georgian + c.georgian,
            latin: acc.latin + c.latin,
        });

    if details.total() > 0 && details.georgian * 2 > details.total() {
        Language::Georgian
    } else {
        Language::English
    }
}
