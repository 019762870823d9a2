//! HTML rendering
//!
//! Reports render through an embedded Tera template. The template name ends
//! in `.html`, so Tera autoescapes every value taken from the report.

use serde::Serialize;
use tera::{Context, Tera};

use super::{Report, Section};

const REPORT_TEMPLATE: &str = "report.html";

#[derive(Serialize)]
struct Row<'a> {
    label: &'a str,
    value: &'a str,
}

/// Template-facing shape of a section; text bodies are split into paragraphs.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SectionView<'a> {
    Summary { title: &'a str, rows: Vec<Row<'a>> },
    Table { title: &'a str, columns: &'a [String], rows: &'a [Vec<String>] },
    Text { title: &'a str, paragraphs: Vec<&'a str> },
}

impl<'a> From<&'a Section> for SectionView<'a> {
    fn from(section: &'a Section) -> Self {
        match section {
            Section::Summary { title, rows } => Self::Summary {
                title,
                rows: rows
                    .iter()
                    .map(|(label, value)| Row { label, value })
                    .collect(),
            },
            Section::Table { title, columns, rows } => Self::Table { title, columns, rows },
            Section::Text { title, body } => Self::Text {
                title,
                paragraphs: body.lines().collect(),
            },
        }
    }
}

fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(REPORT_TEMPLATE, include_str!("templates/report.html"))?;
    Ok(tera)
}

/// Render a standalone HTML document.
pub fn render_html(report: &Report) -> Result<String, tera::Error> {
    let mut context = Context::new();
    context.insert("report", report);
    let sections: Vec<SectionView<'_>> = report.sections.iter().map(SectionView::from).collect();
    context.insert("sections", &sections);
    context.insert(
        "generated_on",
        &report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    templates()?.render(REPORT_TEMPLATE, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::{ReportKind, Section};
    use crate::types::Well;

    #[test]
    fn test_escapes_user_text() {
        let well = Well::new("<script>", "A & B");
        let report = Report::new(
            ReportKind::DailyDrilling,
            &well,
            vec![Section::text("Operations", "Tripped in\nWashed to bottom")],
        );
        let html = render_html(&report).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("A &amp; B"));
        assert!(html.contains("<p>Tripped in</p>"));
        assert!(html.contains("<p>Washed to bottom</p>"));
        assert!(html.contains(&report.signature));
    }

    #[test]
    fn test_table_markup() {
        let report = Report::new(
            ReportKind::Bha,
            &Well::new("W", "O"),
            vec![Section::table("Components", &["Name", "OD"], vec![vec!["Bit".into(), "8.500".into()]])],
        );
        let html = render_html(&report).unwrap();
        assert!(html.contains("<tr><th>Name</th><th>OD</th></tr>"));
        assert!(html.contains("<tr><td>Bit</td><td>8.500</td></tr>"));
    }

    #[test]
    fn test_summary_rows() {
        let report = Report::new(
            ReportKind::FinalWell,
            &Well::new("W", "O"),
            vec![Section::summary("Well Information", vec![("Rig", "Rig <7>".to_string())])],
        );
        let html = render_html(&report).unwrap();
        assert!(html.contains("<h2>Well Information</h2>"));
        assert!(html.contains("<tr><th>Rig</th><td>Rig &lt;7&gt;</td></tr>"));
    }
}
