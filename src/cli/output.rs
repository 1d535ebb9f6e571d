use console::{style, Color};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// The tagged result handed to the presentation layer. Styling is chosen
/// from the variant alone, never by inspecting the text for error words.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// A well-formed table, converted to HTML.
    Table { html: String, markdown: String },
    /// Table text that did not convert; shown preformatted instead.
    RawText { markdown: String },
    /// A user-facing failure message with remediation text where known.
    Error { message: String },
}

pub struct OutputFormatter {
    use_colors: bool,
}

pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let message = message.to_string();

        let handle = thread::spawn(move || {
            let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            let mut frame_index = 0;

            while running_clone.load(Ordering::Relaxed) {
                eprint!("\r{} {}", frames[frame_index], message);
                let _ = io::stderr().flush();
                frame_index = (frame_index + 1) % frames.len();
                thread::sleep(Duration::from_millis(100));
            }

            // Clear the spinner line
            eprint!("\r{}\r", " ".repeat(message.len() + 3));
            let _ = io::stderr().flush();
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl OutputFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats an outcome for the terminal. `--raw` swaps the table HTML
    /// for the normalized Markdown.
    pub fn format_outcome(&self, outcome: &RenderOutcome, raw: bool) -> String {
        match outcome {
            RenderOutcome::Table { html, markdown } => {
                if raw {
                    markdown.clone()
                } else {
                    html.trim_end().to_string()
                }
            }
            RenderOutcome::RawText { markdown } => format!(
                "{}\n{markdown}",
                self.format_warning("Could not render the table as HTML; showing it as returned:")
            ),
            RenderOutcome::Error { message } => self.format_error(message),
        }
    }

    pub fn format_error(&self, message: &str) -> String {
        format!("{} {}", self.style_text("Error:", Color::Red), message)
    }

    pub fn format_success(&self, message: &str) -> String {
        format!("{} {}", self.style_text("✓", Color::Green), message)
    }

    pub fn format_warning(&self, message: &str) -> String {
        format!("{} {}", self.style_text("⚠", Color::Yellow), message)
    }

    fn style_text(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            style(text).fg(color).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Renders a standalone result page. The page styling follows the original
/// comparison agent's look: a plain sans-serif page, preformatted fallback
/// blocks, and a red `.error` class picked by the outcome tag.
pub fn render_page(title: &str, outcome: &RenderOutcome) -> String {
    let body = match outcome {
        RenderOutcome::Table { html, .. } => format!("<h2>Result</h2>\n{html}"),
        RenderOutcome::RawText { markdown } => {
            format!("<h2>Result</h2>\n<pre>{}</pre>", escape_html(markdown))
        }
        RenderOutcome::Error { message } => {
            format!("<pre class=\"error\">{}</pre>", escape_html(message))
        }
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        h1 {{ color: #333; }}
        table {{ border-collapse: collapse; }}
        th, td {{ border: 1px solid #ccc; padding: 8px; }}
        pre {{ background-color: #f4f4f4; padding: 10px; border-radius: 5px; white-space: pre-wrap; word-wrap: break-word; overflow: auto; }}
        .error {{ color: red; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    {body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_styling_comes_from_the_tag_not_the_text() {
        // A legitimate table mentioning "Error" must not pick up error styling.
        let table = RenderOutcome::Table {
            html: "<table><tr><td>Error indicator light</td></tr></table>".to_string(),
            markdown: "| Error indicator light |".to_string(),
        };
        let page = render_page("Test", &table);
        assert!(!page.contains("class=\"error\""));

        let error = RenderOutcome::Error {
            message: "something broke".to_string(),
        };
        let page = render_page("Test", &error);
        assert!(page.contains("<pre class=\"error\">something broke</pre>"));
    }

    #[test]
    fn raw_fallback_is_escaped_into_a_pre_block() {
        let outcome = RenderOutcome::RawText {
            markdown: "| a<b | c&d |".to_string(),
        };
        let page = render_page("Test", &outcome);
        assert!(page.contains("<pre>| a&lt;b | c&amp;d |</pre>"));
    }

    #[test]
    fn raw_flag_prints_markdown_for_table_outcomes() {
        let formatter = OutputFormatter::new(false);
        let outcome = RenderOutcome::Table {
            html: "<table></table>".to_string(),
            markdown: "| a |".to_string(),
        };
        assert_eq!(formatter.format_outcome(&outcome, true), "| a |");
        assert_eq!(formatter.format_outcome(&outcome, false), "<table></table>");
    }

    #[test]
    fn error_outcome_is_prefixed_for_the_terminal() {
        let formatter = OutputFormatter::new(false);
        let outcome = RenderOutcome::Error {
            message: "no key".to_string(),
        };
        assert_eq!(formatter.format_outcome(&outcome, false), "Error: no key");
    }
}
