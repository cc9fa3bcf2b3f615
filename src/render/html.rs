//! HTML renderer — standalone pattern library page with semantic markup.
//!
//! Example markup is inserted verbatim for a live preview and again, escaped,
//! as a code listing. Private records are left out.

use crate::config::SectionLayout;
use crate::model::*;
use crate::render::Renderer;
use crate::toc::Anchors;
use anyhow::Result;

pub struct HtmlRenderer;

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; max-width: 64em; margin: 2em auto; padding: 0 1em; color: #1a1a1a; }
nav ul { list-style: none; padding-left: 1em; }
code { background: #f4f4f4; padding: 0.15em 0.3em; border-radius: 3px; }
pre { background: #f4f4f4; padding: 1em; border-radius: 5px; overflow-x: auto; }
dt { font-weight: bold; margin-top: 0.5em; }
dd { margin-left: 1.5em; }
table { border-collapse: collapse; }
td, th { border-bottom: 1px solid #ddd; padding: 0.4em 0.8em; text-align: left; }
.sg-pattern { border-top: 1px solid #ddd; padding: 1em 0; }
.sg-source { color: #666; font-size: 0.85em; }
.sg-example { border: 1px dashed #bbb; padding: 1em; margin: 0.5em 0; }
.sg-swatch { display: inline-block; width: 1.5em; height: 1.5em; border: 1px solid #ccc; border-radius: 3px; vertical-align: middle; }
.sg-badge { display: inline-block; font-size: 0.75em; padding: 0.1em 0.4em; border-radius: 3px; margin-left: 0.5em; background: #c77966; color: white; }
.sg-diagnostics { color: #703030; }
";

/// Anchors for one section and each of its visible records.
struct SectionPlan<'a> {
    section: &'a Section,
    anchor: String,
    records: Vec<(&'a PatternRecord, String)>,
}

fn plan(library: &Library) -> Vec<SectionPlan<'_>> {
    let mut anchors = Anchors::default();
    library
        .sections
        .iter()
        .map(|section| {
            let anchor = anchors.unique(&section.title);
            let records = section
                .records()
                .filter(|r| !r.is_private())
                .map(|r| {
                    let label = r.title().unwrap_or("pattern");
                    (r, anchors.unique(&format!("{} {}", section.title, label)))
                })
                .collect();
            SectionPlan {
                section,
                anchor,
                records,
            }
        })
        .collect()
}

impl Renderer for HtmlRenderer {
    fn render(&self, library: &Library) -> Result<String> {
        let plans = plan(library);
        let title = html_escape(&library.template.title);
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        out.push_str(&format!("<title>{}</title>\n", title));
        for href in library.template.assets.iter().chain(&library.include.css) {
            out.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{}\">\n",
                html_escape(href)
            ));
        }
        out.push_str("<style>\n");
        out.push_str(STYLE);
        out.push_str("</style>\n</head>\n<body>\n");
        out.push_str(&format!("<header><h1>{}</h1></header>\n", title));

        // Index
        out.push_str("<nav>\n<h2>Index</h2>\n<ul>\n");
        for p in &plans {
            out.push_str(&format!(
                "  <li><a href=\"#{}\">{}</a>",
                p.anchor,
                html_escape(&p.section.title)
            ));
            let titled: Vec<_> = p
                .records
                .iter()
                .filter_map(|(r, a)| r.title().map(|t| (t, a)))
                .collect();
            if !titled.is_empty() {
                out.push_str("\n    <ul>\n");
                for (t, a) in titled {
                    out.push_str(&format!(
                        "      <li><a href=\"#{}\">{}</a></li>\n",
                        a,
                        html_escape(t)
                    ));
                }
                out.push_str("    </ul>\n  ");
            }
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n</nav>\n<main>\n");

        for p in &plans {
            out.push_str(&render_section(p, library.template.selector_prefix.as_deref()));
        }

        out.push_str("</main>\n");
        for src in &library.include.js {
            out.push_str(&format!("<script src=\"{}\"></script>\n", html_escape(src)));
        }
        out.push_str("</body>\n</html>\n");
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "html"
    }
}

fn render_section(p: &SectionPlan<'_>, prefix: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<section id=\"{}\">\n<h2>{}</h2>\n",
        p.anchor,
        html_escape(&p.section.title)
    ));

    if p.records.is_empty() {
        out.push_str("<p class=\"sg-empty\"><em>No patterns documented.</em></p>\n");
    }

    for (record, anchor) in &p.records {
        out.push_str(&match p.section.layout {
            SectionLayout::Patterns => render_pattern(record, anchor, prefix),
            SectionLayout::Variables => render_variables(record, anchor),
        });
    }

    let problems: Vec<_> = p
        .section
        .files
        .iter()
        .flat_map(|f| f.diagnostics.iter().map(move |d| (f, d)))
        .collect();
    if !problems.is_empty() {
        out.push_str(&format!(
            "<details class=\"sg-diagnostics\">\n<summary>{} problem(s)</summary>\n<ul>\n",
            problems.len()
        ));
        for (file, diag) in problems {
            out.push_str(&format!(
                "  <li><code>{}</code>: {}</li>\n",
                html_escape(&file.path.display().to_string()),
                html_escape(&diag.to_string())
            ));
        }
        out.push_str("</ul>\n</details>\n");
    }

    out.push_str("</section>\n");
    out
}

/// Heading, source location, description and body shared by both layouts.
fn render_heading(record: &PatternRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<h3>{}",
        html_escape(record.title().unwrap_or("Untitled"))
    ));
    if record.is_deprecated() {
        out.push_str(" <span class=\"sg-badge\">deprecated</span>");
    }
    out.push_str("</h3>\n");
    out.push_str(&format!(
        "<p class=\"sg-source\"><code>{}:{}</code></p>\n",
        html_escape(&record.source_path.display().to_string()),
        record.line
    ));

    if let Some(desc) = record.tag(Tag::Description) {
        out.push_str(&format!("<p>{}</p>\n", html_escape(desc)));
    }
    if let Some(note) = record.tag(Tag::Deprecated).filter(|n| !n.is_empty()) {
        out.push_str(&format!(
            "<p><strong>Deprecated:</strong> {}</p>\n",
            html_escape(note)
        ));
    }
    for para in record.body.split("\n\n").filter(|p| !p.trim().is_empty()) {
        out.push_str(&format!("<p>{}</p>\n", html_escape(para.trim())));
    }
    out
}

fn render_pattern(record: &PatternRecord, anchor: &str, prefix: Option<&str>) -> String {
    let mut out = format!("<article class=\"sg-pattern\" id=\"{}\">\n", anchor);
    out.push_str(&render_heading(record));

    if let Some(usage) = record.tag(Tag::Usage) {
        out.push_str("<h4>Usage</h4>\n");
        out.push_str(&format!("<p>{}</p>\n", html_escape(usage)));
    }

    if let Some(example) = record.tag(Tag::Example).filter(|e| !e.is_empty()) {
        out.push_str("<h4>Example</h4>\n");
        match prefix {
            Some(prefix) => out.push_str(&format!(
                "<div class=\"sg-example\"><div class=\"{}\">{}</div></div>\n",
                html_escape(prefix),
                example
            )),
            None => out.push_str(&format!("<div class=\"sg-example\">{}</div>\n", example)),
        }
        out.push_str(&format!(
            "<pre><code class=\"language-html\">{}</code></pre>\n",
            html_escape(example)
        ));
    }

    out.push_str(&render_variants("Modifiers", record.modifiers()));
    out.push_str(&render_variants("States", record.states()));

    if !record.variables.is_empty() {
        out.push_str(&variables_table(&record.variables));
    }

    out.push_str("</article>\n");
    out
}

fn render_variables(record: &PatternRecord, anchor: &str) -> String {
    let mut out = format!("<article class=\"sg-pattern\" id=\"{}\">\n", anchor);
    out.push_str(&render_heading(record));
    if let Some(usage) = record.tag(Tag::Usage) {
        out.push_str(&format!("<p><em>{}</em></p>\n", html_escape(usage)));
    }
    if record.variables.is_empty() {
        out.push_str(&format!(
            "<pre><code class=\"language-css\">{}</code></pre>\n",
            html_escape(&record.code)
        ));
    } else {
        out.push_str(&variables_table(&record.variables));
    }
    out.push_str("</article>\n");
    out
}

fn render_variants<'a>(heading: &str, variants: impl Iterator<Item = &'a Variant>) -> String {
    let items: Vec<_> = variants.collect();
    if items.is_empty() {
        return String::new();
    }
    let mut out = format!("<h4>{}</h4>\n<dl>\n", heading);
    for v in items {
        out.push_str(&format!("  <dt><code>{}</code></dt>\n", html_escape(&v.name)));
        if !v.description.is_empty() {
            out.push_str(&format!("  <dd>{}</dd>\n", html_escape(&v.description)));
        }
    }
    out.push_str("</dl>\n");
    out
}

fn variables_table(vars: &[Variable]) -> String {
    let mut out = String::from(
        "<table>\n<thead><tr><th></th><th>Name</th><th>Value</th><th>Note</th></tr></thead>\n<tbody>\n",
    );
    for var in vars {
        let swatch = if looks_like_color(&var.value) {
            format!(
                "<span class=\"sg-swatch\" style=\"background: {}\"></span>",
                html_escape(&var.value)
            )
        } else {
            String::new()
        };
        out.push_str(&format!(
            "  <tr><td>{}</td><td><code>{}</code></td><td><code>{}</code></td><td>{}</td></tr>\n",
            swatch,
            html_escape(&var.name),
            html_escape(&var.value),
            html_escape(var.comment.as_deref().unwrap_or(""))
        ));
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn looks_like_color(value: &str) -> bool {
    let v = value.trim().to_ascii_lowercase();
    (v.starts_with('#') && v.len() > 1 && v[1..].chars().all(|c| c.is_ascii_hexdigit()))
        || ["rgb(", "rgba(", "hsl(", "hsla("]
            .iter()
            .any(|f| v.starts_with(f))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
