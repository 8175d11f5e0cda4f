/*!
 * Prompt templates for brief generation.
 *
 * A prompt carries the page texts of one batch under `=== PAGE N ===`
 * markers, wrapped in instructions that fix the output language, the
 * JSON shape and the length of each summary.
 */

use crate::language_utils::Language;
use super::document::Batch;

/// Instruction template for page summaries.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default instructions for lecture briefs.
    pub const LECTURE_BRIEF: &'static str = r###"You are an experienced university tutor preparing study briefs from lecture material.

## Language Rules (mandatory)
- Write every title and every summary exclusively in {language}.
{script_rules}
- Do not translate the page headers or add bilingual glosses.

## Output Format
Return ONLY one valid JSON object, with no text before or after it, in exactly this shape:
{"pageSummaries": [{"pageNumber": <number>, "title": "<short title>", "summary": "<summary>"}]}
- Produce exactly one entry per page, in page order, using the page numbers from the headers.
- Escape double quotes and line breaks inside strings.

## Summary Requirements
- Each summary should be about {target_words} words and never fewer than {min_words} words.
- Structure summaries with markdown: "##" headers, bullet lists, and **bold** key terms.
- Explain the concepts, definitions, formulas and examples found on the page.
- Titles are short (at most 8 words) and describe the page topic.

## Forbidden
- No meta-commentary about the task, the document or yourself.
- No HTML tags.
- Do not summarize administrative content (course logistics, grading, contact details, attendance); describe such pages in one or two sentences.

## Pages
{pages}"###;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default lecture brief template.
    pub fn lecture_brief() -> Self {
        Self::new(Self::LECTURE_BRIEF)
    }

    /// Render the template with the given variables.
    pub fn render(&self, language: Language, min_words: usize, target_words: usize, pages: &str) -> String {
        self.template
            .replace("{language}", language.display_name())
            .replace("{script_rules}", script_rules(language))
            .replace("{min_words}", &min_words.to_string())
            .replace("{target_words}", &target_words.to_string())
            .replace("{pages}", pages)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::lecture_brief()
    }
}

fn script_rules(language: Language) -> &'static str {
    match language {
        Language::Georgian => "- Use the Georgian (Mkhedruli) alphabet only. Latin and Cyrillic letters are forbidden, except for formulas, units and proper names that have no Georgian form.\n- Even if the pages are in English, write the brief in Georgian.",
        Language::English => "- Use the Latin alphabet only. Georgian script is forbidden; translate any Georgian terms into English.\n- Even if the pages are in Georgian, write the brief in English.",
    }
}

/// Builder for batch prompts.
#[derive(Debug, Clone)]
pub struct BriefPromptBuilder {
    language: Language,
    min_words: usize,
    target_words: usize,
    template: PromptTemplate,
}

impl BriefPromptBuilder {
    /// Create a new prompt builder.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            min_words: 300,
            target_words: 500,
            template: PromptTemplate::default(),
        }
    }

    /// Set the word count band per summary.
    pub fn with_word_band(mut self, min_words: usize, target_words: usize) -> Self {
        self.min_words = min_words;
        self.target_words = target_words;
        self
    }

    /// Use a custom instruction template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Page section of the prompt.
    pub fn format_pages(batch: &Batch) -> String {
        batch
            .pages
            .iter()
            .enumerate()
            .map(|(local, page)| format!("=== PAGE {} ===\n{}", batch.page_number(local), page.content.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the prompt for a batch.
    pub fn build(&self, batch: &Batch) -> String {
        self.template.render(
            self.language,
            self.min_words,
            self.target_words,
            &Self::format_pages(batch),
        )
    }
}
