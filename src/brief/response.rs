/*!
 * Parsing and repair of model output.
 *
 * Model output is expected to be one JSON object of the form
 * `{"pageSummaries": [{"pageNumber", "title", "summary"}]}`. When strict
 * parsing fails, an ordered chain of text repairs is applied, each stage
 * working on the output of the previous one, and parsing is retried after
 * every stage.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::ResponseError;
use super::document::{Batch, PageSummary};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\r?\n?(.*)```").expect("code fence pattern is valid")
});

/// A named text repair
#[derive(Debug, Clone, Copy)]
pub struct RepairStage {
    /// Stage name, for logs
    pub name: &'static str,
    /// The repair
    pub apply: fn(&str) -> String,
}

/// Repairs in the order they are tried
pub const REPAIR_CHAIN: &[RepairStage] = &[
    RepairStage { name: "strip_code_fences", apply: strip_code_fences },
    RepairStage { name: "extract_balanced_object", apply: extract_balanced_object },
    RepairStage { name: "strip_control_characters", apply: strip_control_characters },
    RepairStage { name: "escape_stray_quotes", apply: escape_stray_quotes },
];

/// A summary as the model returned it, before renumbering
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryDraft {
    /// Page number claimed by the model, if any
    pub claimed_page: Option<i64>,
    /// Title text
    pub title: String,
    /// Summary text
    pub summary: String,
}

/// Remove a markdown code fence around the payload
///
/// The fence runs from the first marker to the last one, so code blocks
/// inside summaries stay intact. A fence that starts after the first `{`
/// belongs to the payload and is left alone.
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    let Some(open) = text.find("```") else {
        return text.to_string();
    };
    if text[..open].contains('{') {
        return text.to_string();
    }

    match CODE_FENCE.captures(&text[open..]) {
        Some(captures) => captures[1].trim().to_string(),
        None => text.to_string(),
    }
}

/// Cut out the first balanced `{...}` object, ignoring braces inside strings
pub fn extract_balanced_object(text: &str) -> String {
    let Some(start) = text.find('{') else {
        return text.to_string();
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return text[start..start + offset + 1].to_string();
                }
            }
            _ => {}
        }
    }

    // Unbalanced: keep everything from the first brace
    text[start..].to_string()
}

/// Escape line breaks and tabs inside strings, drop other control characters
pub fn strip_control_characters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => {}
                '\t' => out.push_str("\\t"),
                c if c.is_control() => {}
                c => out.push(c),
            }
        } else {
            match c {
                '"' => {
                    in_string = true;
                    out.push(c);
                }
                '\n' | '\r' | '\t' | ' ' => out.push(c),
                '\u{FEFF}' => {}
                c if c.is_control() => {}
                c => out.push(c),
            }
        }
    }

    out
}

/// Escape quotes that sit inside a string value instead of closing it
///
/// A quote closes a string only when the next non-space character is one
/// of `, } ] :` or the end of input.
pub fn escape_stray_quotes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if matches!(next, None | Some(',') | Some('}') | Some(']') | Some(':')) {
                    in_string = false;
                    out.push(c);
                } else {
                    out.push_str("\\\"");
                }
            }
            c => out.push(c),
        }
    }

    out
}

/// Parse model output as JSON, running the repair chain when needed
///
/// Returns the value and the number of repair stages that were applied.
pub fn parse_with_repair(raw: &str) -> Result<(Value, usize), ResponseError> {
    let mut last_error = match serde_json::from_str::<Value>(raw) {
        Ok(value) => return Ok((value, 0)),
        Err(e) => e.to_string(),
    };

    let mut text = raw.to_string();
    for (i, stage) in REPAIR_CHAIN.iter().enumerate() {
        text = (stage.apply)(&text);
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                debug!("Response parsed after repair stage {} ({})", i + 1, stage.name);
                return Ok((value, i + 1));
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(ResponseError::Unparseable {
        stages: REPAIR_CHAIN.len(),
        message: last_error,
    })
}

fn non_empty_string(entry: &Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Check the structure of a parsed response
pub fn validate_shape(value: &Value) -> Result<Vec<SummaryDraft>, ResponseError> {
    let entries = match value {
        Value::Object(map) => map
            .get("pageSummaries")
            .and_then(Value::as_array)
            .ok_or_else(|| ResponseError::InvalidShape("missing pageSummaries array".to_string()))?,
        // Some models drop the wrapper object
        Value::Array(entries) => entries,
        _ => return Err(ResponseError::InvalidShape("expected a JSON object".to_string())),
    };

    if entries.is_empty() {
        return Err(ResponseError::InvalidShape("pageSummaries is empty".to_string()));
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let title = non_empty_string(entry, "title")
                .ok_or_else(|| ResponseError::InvalidShape(format!("entry {} has no title", i + 1)))?;
            let summary = non_empty_string(entry, "summary")
                .ok_or_else(|| ResponseError::InvalidShape(format!("entry {} has no summary", i + 1)))?;
            let claimed_page = entry.get("pageNumber").and_then(|p| {
                p.as_i64().or_else(|| p.as_str().and_then(|s| s.trim().parse().ok()))
            });
            Ok(SummaryDraft { claimed_page, title, summary })
        })
        .collect()
}

/// Parse, repair and validate model output for a batch
///
/// Summaries are matched to pages by position; page numbers in the output
/// are replaced with the batch's own numbering. Extra entries are dropped.
pub fn parse_and_validate(raw: &str, batch: &Batch) -> Result<Vec<PageSummary>, ResponseError> {
    let (value, _) = parse_with_repair(raw)?;
    let drafts = validate_shape(&value)?;

    if drafts.len() < batch.len() {
        return Err(ResponseError::IncompletePages {
            expected: batch.len(),
            returned: drafts.len(),
        });
    }

    Ok(drafts
        .into_iter()
        .take(batch.len())
        .enumerate()
        .map(|(local, draft)| {
            let page_number = batch.page_number(local);
            if draft.claimed_page.is_some_and(|p| p != page_number as i64) {
                debug!("Model numbered page {} as {:?}", page_number, draft.claimed_page);
            }
            PageSummary {
                page_number,
                title: draft.title,
                summary: draft.summary,
            }
        })
        .collect())
}
