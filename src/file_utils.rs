use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::AppError;

// @module: File and directory utilities

// @const: Page separator written by pdftotext
pub const PAGE_SEPARATOR: char = '\x0C';

static NUMBER_CHUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+|\D+").expect("chunk pattern is valid"));

/// How the pages of an input are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Directory with one `.txt` file per page
    PageDirectory,
    /// JSON file holding an array of page strings
    JsonPages,
    /// Text file with pages separated by form feeds
    Text,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Output path for a brief, next to the input
    // @params: input, language code
    pub fn generate_output_path<P: AsRef<Path>>(input: P, language: &str) -> PathBuf {
        let input = input.as_ref();
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        let file_name = format!("{}.brief.{}.json", stem, language);

        match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
            _ => PathBuf::from(file_name),
        }
    }

    /// Find files with a specific extension in a directory, in natural name order
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let extension = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).max_depth(1) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            let matches = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
            if path.is_file() && matches {
                result.push(path.to_path_buf());
            }
        }

        result.sort_by(|a, b| {
            let a = a.file_name().unwrap_or_default().to_string_lossy();
            let b = b.file_name().unwrap_or_default().to_string_lossy();
            natural_cmp(&a, &b)
        });
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Write a value as pretty JSON
    pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?;
        Self::write_to_file(path, &json)
    }

    /// Decide how an input path stores its pages
    pub fn detect_input_kind<P: AsRef<Path>>(path: P) -> Result<InputKind, AppError> {
        let path = path.as_ref();

        if Self::dir_exists(path) {
            return Ok(InputKind::PageDirectory);
        }
        if !Self::file_exists(path) {
            return Err(AppError::File(format!("Input does not exist: {:?}", path)));
        }

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"));
        Ok(if is_json { InputKind::JsonPages } else { InputKind::Text })
    }

    /// Load raw page texts, blank pages included
    pub fn load_pages<P: AsRef<Path>>(path: P) -> Result<Vec<String>, AppError> {
        let path = path.as_ref();

        match Self::detect_input_kind(path)? {
            InputKind::PageDirectory => {
                let files = Self::find_files(path, "txt")?;
                if files.is_empty() {
                    return Err(AppError::File(format!("No .txt pages found in {:?}", path)));
                }
                files.iter().map(|f| Self::read_to_string(f).map_err(AppError::from)).collect()
            }
            InputKind::JsonPages => {
                let content = Self::read_to_string(path)?;
                serde_json::from_str::<Vec<String>>(&content).map_err(|e| {
                    AppError::File(format!("{:?} is not a JSON array of page strings: {}", path, e))
                })
            }
            InputKind::Text => Ok(split_pages(&Self::read_to_string(path)?)),
        }
    }
}

/// Split text into pages on form feeds
///
/// A trailing form feed does not start another page.
pub fn split_pages(text: &str) -> Vec<String> {
    let text = text.strip_suffix(PAGE_SEPARATOR).unwrap_or(text);
    text.split(PAGE_SEPARATOR).map(str::to_string).collect()
}

/// Compare names so that "page2" sorts before "page10"
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = NUMBER_CHUNK.find_iter(a).map(|m| m.as_str());
    let mut right = NUMBER_CHUNK.find_iter(b).map(|m| m.as_str());

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let order = match (x.parse::<u128>(), y.parse::<u128>()) {
                    (Ok(nx), Ok(ny)) => nx.cmp(&ny).then_with(|| x.len().cmp(&y.len())),
                    _ => x.cmp(y),
                };
                if order != Ordering::Equal {
                    return order;
                }
            }
        }
    }
}
