/*!
 * Placeholder content for pages without usable model output.
 *
 * Titles and summary templates are fixed tables per language, selected by
 * `(page_number - 1) % N`, so the same page always gets the same text.
 */

use crate::language_utils::Language;
use super::document::PageSummary;

const GEORGIAN_TITLES: &[&str] = &[
    "ძირითადი ცნებები",
    "მნიშვნელოვანი თემები",
    "სასწავლო მასალის მიმოხილვა",
    "ლექციის შეჯამება",
    "ძირითადი იდეები",
];

const ENGLISH_TITLES: &[&str] = &[
    "Key Concepts",
    "Important Topics",
    "Study Material Overview",
    "Lecture Summary",
    "Main Ideas",
];

// {page}, {min_words} and {target_words} are filled in at render time
const GEORGIAN_SUMMARIES: &[&str] = &[
    "## გვერდი {page}\n\nამ გვერდის ავტომატური შეჯამება ვერ მომზადდა. გაეცანით ორიგინალურ მასალას და თავად ჩამოაყალიბეთ მისი ძირითადი იდეები.\n\n- გამოყავით მთავარი ცნებები და განმარტებები\n- ჩაიწერეთ მაგალითები და ფორმულები\n- დაწერეთ {min_words}-{target_words} სიტყვიანი შეჯამება",
    "## გვერდი {page}\n\nამ გვერდისთვის შეჯამება დროებით მიუწვდომელია. წაიკითხეთ გვერდი ყურადღებით და მონიშნეთ მნიშვნელოვანი თემები.\n\n- რა არის გვერდის მთავარი საკითხი?\n- როგორ უკავშირდება ის წინა მასალას?\n- შეადგინეთ {min_words}-{target_words} სიტყვიანი კონსპექტი",
    "## გვერდი {page}\n\nამ გვერდის შინაარსი ხელით უნდა დამუშავდეს. გადახედეთ სასწავლო მასალას და შეაჯამეთ ის საკუთარი სიტყვებით.\n\n- ჩამოწერეთ ძირითადი ტერმინები\n- ახსენით თითოეული ტერმინის მნიშვნელობა\n- მოამზადეთ {min_words}-{target_words} სიტყვიანი მიმოხილვა",
];

const ENGLISH_SUMMARIES: &[&str] = &[
    "## Page {page}\n\nAn automatic summary could not be prepared for this page. Review the original material and write down its main ideas yourself.\n\n- Identify the key concepts and definitions\n- Note the examples and formulas\n- Aim for a summary of {min_words}-{target_words} words",
    "## Page {page}\n\nThe summary for this page is temporarily unavailable. Read the page carefully and highlight the important topics.\n\n- What is the central question of the page?\n- How does it connect to earlier material?\n- Write study notes of {min_words}-{target_words} words",
    "## Page {page}\n\nThis page needs to be reviewed by hand. Go through the study material and summarize it in your own words.\n\n- List the main terms\n- Explain what each term means\n- Prepare an overview of {min_words}-{target_words} words",
];

fn titles(language: Language) -> &'static [&'static str] {
    match language {
        Language::Georgian => GEORGIAN_TITLES,
        Language::English => ENGLISH_TITLES,
    }
}

fn summaries(language: Language) -> &'static [&'static str] {
    match language {
        Language::Georgian => GEORGIAN_SUMMARIES,
        Language::English => ENGLISH_SUMMARIES,
    }
}

fn rotation(page_number: usize, len: usize) -> usize {
    page_number.saturating_sub(1) % len
}

/// Placeholder title for a page
pub fn placeholder_title(language: Language, page_number: usize) -> &'static str {
    let table = titles(language);
    table[rotation(page_number, table.len())]
}

/// Placeholder summary for a page, mentioning the expected word band
pub fn placeholder_summary(language: Language, page_number: usize, min_words: usize, target_words: usize) -> String {
    let table = summaries(language);
    table[rotation(page_number, table.len())]
        .replace("{page}", &page_number.to_string())
        .replace("{min_words}", &min_words.to_string())
        .replace("{target_words}", &target_words.to_string())
}

/// Complete placeholder entry for a page
pub fn placeholder_page(language: Language, page_number: usize, min_words: usize, target_words: usize) -> PageSummary {
    PageSummary {
        page_number,
        title: placeholder_title(language, page_number).to_string(),
        summary: placeholder_summary(language, page_number, min_words, target_words),
    }
}
