// src/main.rs
//
// affilifmt — plain-text affiliate article drafts → publish-ready HTML
//
// - Splits the draft on newlines into paragraphs, dropping blank/whitespace lines.
// - Classifies each paragraph with fixed-priority pattern rules (first match wins):
//     • starts with "list of top"                     → <h2> article heading
//     • matches ^[0-9]+\. (numbered product heading)  → <h3>; an amazon.com link on
//       the next line yields a centered buy-button shortcode and is dropped from
//       the output
//     • starts with "conclusion" / "frequently asked questions" / "buying guides to"
//                                                     → title-cased <h2> behind an <hr />
//     • starts with "what we like" / "what we don't like" (either apostrophe
//       variant)                                      → title-cased bold lead-in ending in ':'
// - Wraps the paragraphs between consecutive lead-in/product markers in <ul>/<li>.
// - Inserts one Amazon table shortcode after the article heading when any ASIN
//   was collected.
// - Never fails on malformed input: enrichment is skipped per paragraph instead.
//
// CLI:
//   affilifmt INPUT [OUTPUT]     (default: overwrite INPUT)

use clap::Parser;
use regex::Regex;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::LazyLock;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Input draft file
    input: PathBuf,

    /// Output file (default: overwrite input)
    output: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let src = fs::read_to_string(&cli.input)?;
    let out = format_article(&src);

    let out_path = cli.output.as_ref().unwrap_or(&cli.input);
    fs::write(out_path, out)?;
    Ok(())
}

/* =========================== Recognized patterns ========================= */

const AMAZON_SITE_PREFIX: &str = "https://www.amazon.com";

static PRODUCT_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.").expect("PRODUCT_HEADING_RE should compile"));

static PRODUCT_HEADING_HTML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<h3>[0-9]+\.").expect("PRODUCT_HEADING_HTML_RE should compile"));

const ARTICLE_HEADING_PREFIX: &str = "list of top";

const SECTION_HEADING_PREFIXES: [&str; 3] = [
    "conclusion",
    "frequently asked questions",
    "buying guides to",
];

const WHAT_WE_LIKE: &str = "what we like";
const WHAT_WE_DONT_LIKE: &str = "what we don't like";
// The curly apostrophe as seen through a UTF-8/Windows-1252 mismatch. Legacy
// drafts carry it verbatim, so it is matched literally rather than normalized
// at the input side.
const WHAT_WE_DONT_LIKE_MOJIBAKE: &str = "what we don\u{e2}\u{20ac}\u{2122}t like";

// (needle, canonical phrase) — the mojibake needle renders as the plain phrase.
const BOLD_LEAD_INS: [(&str, &str); 3] = [
    (WHAT_WE_LIKE, WHAT_WE_LIKE),
    (WHAT_WE_DONT_LIKE, WHAT_WE_DONT_LIKE),
    (WHAT_WE_DONT_LIKE_MOJIBAKE, WHAT_WE_DONT_LIKE),
];

/* =========================== Paragraph classifier ======================== */

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Role {
    ArticleHeading,
    ProductHeading,
    SectionHeading,
    BoldLeadIn,
}

/// Ordered rule table; first match wins, unmatched paragraphs pass through.
const CLASSIFIER_RULES: [(fn(&str) -> bool, Role); 4] = [
    (is_article_heading, Role::ArticleHeading),
    (is_product_heading, Role::ProductHeading),
    (is_section_heading, Role::SectionHeading),
    (is_bold_lead_in, Role::BoldLeadIn),
];

fn classify(paragraph: &str) -> Option<Role> {
    CLASSIFIER_RULES
        .iter()
        .find(|(matches, _)| matches(paragraph))
        .map(|&(_, role)| role)
}

fn is_article_heading(paragraph: &str) -> bool {
    paragraph.to_lowercase().starts_with(ARTICLE_HEADING_PREFIX)
}

fn is_product_heading(paragraph: &str) -> bool {
    PRODUCT_HEADING_RE.is_match(paragraph)
}

fn is_section_heading(paragraph: &str) -> bool {
    starts_with_any(&SECTION_HEADING_PREFIXES, paragraph)
}

fn is_bold_lead_in(paragraph: &str) -> bool {
    let lower = paragraph.to_lowercase();
    BOLD_LEAD_INS
        .iter()
        .any(|&(needle, _)| lower.starts_with(needle))
}

fn starts_with_any(prefixes: &[&str], text: &str) -> bool {
    let lower = text.to_lowercase();
    prefixes.iter().any(|prefix| lower.starts_with(prefix))
}

/* =========================== Markup constructors ========================= */

fn heading2(content: &str) -> String {
    format!("<h2>{content}</h2>")
}

fn heading3(content: &str) -> String {
    format!("<h3>{content}</h3>")
}

fn paragraph_bold(content: &str) -> String {
    format!("<p><strong>{content}</strong></p>")
}

fn paragraph_centered(content: &str) -> String {
    format!("<p style=\"text-align: center;\">{content}</p>")
}

fn list_item(content: &str) -> String {
    format!("<li><span>{content}</span></li>")
}

fn buy_button(asin: &str) -> String {
    format!("[Azonasinid asinid=\"{asin}\"]")
}

fn amazon_table(asins: &[String]) -> String {
    format!("[Azontables asinids=\"{}\"]", asins.join(","))
}

/// `element` lands on its own line after `content`.
fn append_element(content: &str, element: &str) -> String {
    format!("{content}\n{element}\n")
}

/// `element` lands on its own line before `content`.
fn prepend_element(content: &str, element: &str) -> String {
    format!("\n{element}\n{content}")
}

/// Uppercase the first letter of each space-separated word; the rest of the
/// word is kept as-is. Runs of spaces survive as empty words.
fn start_case(content: &str) -> String {
    content
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/* =============================== ASIN lookup ============================= */

/// The ASIN is the path segment right after "dp". No "dp" segment, a trailing
/// "dp", or an empty segment after it all mean there is no usable ASIN.
fn asin_from_link(link: &str) -> Option<String> {
    let segments: Vec<&str> = link.split('/').collect();
    let dp = segments.iter().position(|segment| *segment == "dp")?;
    segments
        .get(dp + 1)
        .filter(|asin| !asin.is_empty())
        .map(|asin| (*asin).to_string())
}

/* ================================ Pipeline =============================== */

/// A numbered product heading that was immediately followed by an amazon.com
/// link line. The link line is dropped from the output; the ASIN feeds the buy
/// button and the product table when extraction succeeded.
struct ProductReference {
    asin: Option<String>,
    link: String,
}

/// Format a plain-text article draft into publish-ready HTML. Total over its
/// input: any string in, a string out; malformed cues pass through unchanged
/// rather than being reported.
pub fn format_article(raw: &str) -> String {
    let paragraphs: Vec<String> = raw
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    let (mut formatted, products) = classify_paragraphs(&paragraphs);
    wrap_bullet_lists(&mut formatted);

    let asins: Vec<String> = products.iter().filter_map(|p| p.asin.clone()).collect();
    insert_product_table(&mut formatted, &asins);

    let links: Vec<String> = products.into_iter().map(|p| p.link).collect();
    finalize(formatted, &links)
}

fn classify_paragraphs(paragraphs: &[String]) -> (Vec<String>, Vec<ProductReference>) {
    let mut products: Vec<ProductReference> = Vec::new();

    let formatted = paragraphs
        .iter()
        .enumerate()
        .map(|(index, paragraph)| match classify(paragraph) {
            Some(Role::ArticleHeading) => heading2(paragraph),
            Some(Role::ProductHeading) => {
                let mut heading = heading3(paragraph);

                // The line after a product heading is its shop link when it
                // starts with the Amazon prefix. A heading on the last line
                // simply has no link.
                let link = paragraphs
                    .get(index + 1)
                    .filter(|line| line.starts_with(AMAZON_SITE_PREFIX));
                if let Some(link) = link {
                    let asin = asin_from_link(link);
                    if let Some(asin) = &asin {
                        heading =
                            append_element(&heading, &paragraph_centered(&buy_button(asin)));
                    }
                    products.push(ProductReference {
                        asin,
                        link: link.clone(),
                    });
                }
                heading
            }
            Some(Role::SectionHeading) => {
                prepend_element(&heading2(&start_case(paragraph)), "<hr />")
            }
            Some(Role::BoldLeadIn) => {
                let lower = paragraph.to_lowercase();
                match BOLD_LEAD_INS
                    .iter()
                    .find(|&&(needle, _)| lower.contains(needle))
                {
                    Some((_, canonical)) => paragraph_bold(&start_case(&format!("{canonical}:"))),
                    None => paragraph.clone(),
                }
            }
            None => paragraph.clone(),
        })
        .collect();

    (formatted, products)
}

/* ======================= Bullet-list range wrapping ====================== */

/// Marker paragraphs open or close a pros/cons list: any lead-in phrase, or —
/// once a list has started — the next product heading.
fn collect_markers(paragraphs: &[String]) -> Vec<usize> {
    let mut markers: Vec<usize> = Vec::new();
    for (index, paragraph) in paragraphs.iter().enumerate() {
        let lower = paragraph.to_lowercase();
        let is_lead_in = BOLD_LEAD_INS
            .iter()
            .any(|&(needle, _)| lower.contains(needle));
        let closes_open_list = PRODUCT_HEADING_HTML_RE.is_match(paragraph) && !markers.is_empty();
        if is_lead_in || closes_open_list {
            markers.push(index);
        }
    }
    markers
}

/// Consecutive markers pair into half-open ranges; the trailing marker has no
/// successor and is dropped.
fn pair_consecutive(markers: &[usize]) -> Vec<(usize, usize)> {
    markers.windows(2).map(|pair| (pair[0], pair[1])).collect()
}

fn wrap_bullet_lists(formatted: &mut [String]) {
    let markers = collect_markers(formatted);
    if markers.len() < 2 {
        return;
    }

    for (start, end) in pair_consecutive(&markers) {
        let lower = formatted[start].to_lowercase();
        let starts_list = BOLD_LEAD_INS
            .iter()
            .any(|&(needle, _)| lower.contains(needle));
        if !starts_list {
            continue;
        }

        let first = start + 1;
        for index in first..end {
            let mut item = list_item(&formatted[index]);
            if index == first {
                item = prepend_element(&item, "<ul>");
            }
            if index == end - 1 {
                item = append_element(&item, "</ul>");
            }
            formatted[index] = item;
        }
    }
}

/* ============================= Table insertion =========================== */

fn insert_product_table(formatted: &mut Vec<String>, asins: &[String]) {
    if asins.is_empty() {
        return;
    }
    let article_heading = formatted
        .iter()
        .position(|paragraph| paragraph.to_lowercase().starts_with("<h2>list of top"));
    if let Some(index) = article_heading {
        formatted.insert(index + 1, amazon_table(asins));
    }
}

/* ================================ Finalizer ============================== */

fn finalize(formatted: Vec<String>, links_to_remove: &[String]) -> String {
    formatted
        .into_iter()
        .filter(|paragraph| !links_to_remove.iter().any(|link| link == paragraph))
        .collect::<Vec<String>>()
        .join("\n\n")
}

/* ================================== Tests ================================ */
