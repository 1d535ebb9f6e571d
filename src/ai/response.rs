use log::{debug, warn};
use pulldown_cmark::{html, Options, Parser};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("the model response contained no Markdown table")]
    EmptyTable,
}

/// A literal fix for a known-bad model output, applied by exact substring
/// match after table extraction. Absence of a match is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub pattern: String,
    pub replacement: String,
}

/// Outcome of normalizing one raw model response.
///
/// `Raw` is the fallback for table text that pulldown-cmark could not turn
/// into a `<table>` element; callers display it preformatted instead of
/// dropping it.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Html { html: String, markdown: String },
    Raw { markdown: String },
}

pub struct ResponseNormalizer {
    corrections: Vec<Correction>,
}

impl ResponseNormalizer {
    pub fn new(corrections: Vec<Correction>) -> Self {
        Self { corrections }
    }

    /// Extracts the Markdown table from a noisy model response.
    ///
    /// The model wraps tables in prose and code fences more or less at
    /// random. The table is every pipe-prefixed line from the first one
    /// onward, kept in order; fence markers and surrounding commentary
    /// (fenced or not) are dropped. A pipe row counts even inside a fence.
    pub fn extract_table(&self, raw: &str) -> Result<String, NormalizeError> {
        let mut rows: Vec<&str> = Vec::new();

        for line in raw.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("```") {
                // fence markers are never table content
                continue;
            }
            if trimmed.starts_with('|') {
                rows.push(trimmed);
            }
        }

        if rows.is_empty() {
            return Err(NormalizeError::EmptyTable);
        }

        debug!("Extracted {} table rows", rows.len());
        Ok(rows.join("\n"))
    }

    /// Applies the configured literal substitutions for known provider
    /// misstatements (e.g. the wrong screen size on a Lexmark MX942 row).
    fn apply_corrections(&self, mut table: String) -> String {
        for correction in &self.corrections {
            if table.contains(&correction.pattern) {
                debug!("Applying correction for {:?}", correction.pattern);
                table = table.replace(&correction.pattern, &correction.replacement);
            }
        }
        table
    }

    /// Full pipeline: extract, correct, convert to HTML.
    pub fn normalize(&self, raw: &str) -> Result<Rendered, NormalizeError> {
        let table = self.extract_table(raw)?;
        let table = self.apply_corrections(table);

        match render_html(&table) {
            Some(html) => Ok(Rendered::Html {
                html,
                markdown: table,
            }),
            None => {
                warn!("Markdown conversion yielded no table, falling back to raw text");
                Ok(Rendered::Raw { markdown: table })
            }
        }
    }
}

/// Renders table Markdown to HTML. Table syntax is an opt-in pulldown-cmark
/// extension. Returns None when the output has no `<table>` element, which
/// happens when the extracted rows are not actually well-formed table
/// Markdown (e.g. a missing separator row).
fn render_html(markdown: &str) -> Option<String> {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
    let mut out = String::new();
    html::push_html(&mut out, parser);

    if out.contains("<table>") {
        Some(out)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ResponseNormalizer {
        ResponseNormalizer::new(Vec::new())
    }

    fn screen_fix() -> ResponseNormalizer {
        ResponseNormalizer::new(vec![Correction {
            pattern: "2.8-inch LCD".to_string(),
            replacement: "10.1-inch color touch screen".to_string(),
        }])
    }

    #[test]
    fn fenced_table_with_surrounding_prose() {
        let raw = "Here you go:\n```\n| A | B |\n| - | - |\n| 1 | 2 |\n```\nThanks.";
        let table = normalizer().extract_table(raw).unwrap();
        assert_eq!(table, "| A | B |\n| - | - |\n| 1 | 2 |");
    }

    #[test]
    fn no_table_is_empty_table_error() {
        let err = normalizer().extract_table("no table here").unwrap_err();
        assert_eq!(err, NormalizeError::EmptyTable);
    }

    #[test]
    fn empty_response_is_empty_table_error() {
        let err = normalizer().extract_table("").unwrap_err();
        assert_eq!(err, NormalizeError::EmptyTable);
    }

    #[test]
    fn extraction_is_idempotent() {
        let raw = "Intro.\n| A | B |\n| - | - |\n| 1 | 2 |\nOutro.";
        let once = normalizer().extract_table(raw).unwrap();
        let twice = normalizer().extract_table(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn every_extracted_line_is_a_table_row() {
        let raw = "prose\n```markdown\n| H |\n| - |\ntext inside fence\n| v |\n```";
        let table = normalizer().extract_table(raw).unwrap();
        assert!(table.lines().all(|line| line.starts_with('|')));
    }

    #[test]
    fn rows_keep_their_original_order() {
        let raw = "| H1 | H2 |\n| -- | -- |\n| r1 | x |\n| r2 | y |";
        let table = normalizer().extract_table(raw).unwrap();
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(
            rows,
            vec!["| H1 | H2 |", "| -- | -- |", "| r1 | x |", "| r2 | y |"]
        );
    }

    #[test]
    fn correction_rewrites_matching_row_only() {
        let raw = "| Model | Screen |\n| - | - |\n| Lexmark MX942 | 2.8-inch LCD |\n| HP M428 | 2.7-inch panel |";
        let table = screen_fix().extract_table(raw).unwrap();
        let corrected = screen_fix().apply_corrections(table);
        assert!(corrected.contains("| Lexmark MX942 | 10.1-inch color touch screen |"));
        assert!(corrected.contains("| HP M428 | 2.7-inch panel |"));
    }

    #[test]
    fn correction_is_noop_on_unrelated_table() {
        let table = "| Model | Screen |\n| - | - |\n| Epson L3250 | 1.44-inch LCD |".to_string();
        assert_eq!(screen_fix().apply_corrections(table.clone()), table);
    }

    #[test]
    fn well_formed_table_renders_to_html() {
        let raw = "| A | B |\n| - | - |\n| 1 | 2 |";
        match normalizer().normalize(raw).unwrap() {
            Rendered::Html { html, markdown } => {
                assert!(html.contains("<table>"));
                assert!(html.contains("<td>1</td>"));
                assert_eq!(markdown, raw);
            }
            Rendered::Raw { .. } => panic!("expected HTML rendering"),
        }
    }

    #[test]
    fn malformed_table_falls_back_to_raw_text() {
        // No separator row, so pulldown-cmark sees a paragraph, not a table.
        let raw = "| A | B |\n| 1 | 2";
        match normalizer().normalize(raw).unwrap() {
            Rendered::Raw { markdown } => assert_eq!(markdown, "| A | B |\n| 1 | 2"),
            Rendered::Html { .. } => panic!("expected raw fallback"),
        }
    }
}
