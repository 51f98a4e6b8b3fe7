//! PDF rendering via `printpdf`.
//!
//! Text is set in the built-in Helvetica faces, which only cover the
//! WinAnsi (Latin-1) character set. Names or prescriptions in other scripts
//! are still exported but will not display correctly in the document.

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use super::report::VisitReport;
use super::{ExportError, ExportResult};

/// Approximate characters per prescription line at 10pt.
const WRAP_WIDTH: usize = 90;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const PAGE_TOP: f32 = 275.0;
const PAGE_BOTTOM: f32 = 15.0;
const PRESCRIPTION_LEADING: f32 = 5.0;

const LEFT: f32 = 14.0;
const VALUE_COLUMN: f32 = 80.0;

/// Render a report to A4 PDF bytes.
///
/// A prescription that runs past the bottom margin continues on new pages.
pub fn render_pdf(report: &VisitReport) -> ExportResult<Vec<u8>> {
    let (doc, page1, layer1) =
        PdfDocument::new(&report.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let mut layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;

    let mut y = Mm(PAGE_TOP);

    layer.use_text(&report.title, 18.0, Mm(LEFT), y, &bold);
    y -= Mm(10.0);

    for line in [
        format!("Patient: {}", report.patient_name),
        format!("Contact: {}", report.patient_contact),
        format!("Visit Date: {}", report.visit_date),
    ] {
        layer.use_text(line, 12.0, Mm(LEFT), y, &font);
        y -= Mm(7.0);
    }

    y -= Mm(4.0);
    y = draw_metrics(&layer, report, y, &font, &bold);

    y -= Mm(10.0);
    layer.use_text("Prescription:", 12.0, Mm(LEFT), y, &bold);
    y -= Mm(7.0);
    let lines: Vec<String> = report
        .prescription
        .lines()
        .flat_map(|l| wrap_text(l, WRAP_WIDTH))
        .collect();
    let mut current_page = 0;
    for (line, (page, line_y)) in lines.iter().zip(place_lines(y.0, lines.len())) {
        if page != current_page {
            let (next_page, next_layer) = doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("Layer {}", page + 1),
            );
            layer = doc.get_page(next_page).get_layer(next_layer);
            current_page = page;
        }
        layer.use_text(line.as_str(), 10.0, Mm(LEFT), Mm(line_y), &font);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ExportError::Pdf(format!("buffer error: {e}")))
}

fn draw_metrics(
    layer: &PdfLayerReference,
    report: &VisitReport,
    mut y: Mm,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
) -> Mm {
    layer.use_text("Metric", 10.0, Mm(LEFT), y, bold);
    layer.use_text("Value", 10.0, Mm(VALUE_COLUMN), y, bold);
    y -= Mm(6.0);

    for row in &report.metrics {
        layer.use_text(&row.metric, 10.0, Mm(LEFT), y, bold);
        layer.use_text(&row.value, 10.0, Mm(VALUE_COLUMN), y, font);
        y -= Mm(6.0);
    }
    y
}

/// Page index (0 is the first page) and baseline for `count` lines starting
/// at `start_y`.
fn place_lines(start_y: f32, count: usize) -> Vec<(usize, f32)> {
    let mut placed = Vec::with_capacity(count);
    let mut page = 0;
    let mut y = start_y;
    for _ in 0..count {
        if y < PAGE_BOTTOM {
            page += 1;
            y = PAGE_TOP;
        }
        placed.push((page, y));
        y -= PRESCRIPTION_LEADING;
    }
    placed
}

/// Greedy word wrap. Always yields at least one line.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Patient, Visit};

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("short", 80), vec!["short"]);
    }

    #[test]
    fn test_render_pdf() {
        let patient = Patient::new("Jane Doe".into(), "555-1234".into());
        let mut visit = Visit::new(patient.id.clone(), Default::default());
        visit.prescription = "Take one tablet daily.\nReview in two weeks.".into();

        let bytes = render_pdf(&VisitReport::new(&patient, &visit)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_place_lines_breaks_pages_at_margin() {
        let placed = place_lines(25.0, 4);
        assert_eq!(
            placed,
            vec![(0, 25.0), (0, 20.0), (0, 15.0), (1, PAGE_TOP)]
        );

        let placed = place_lines(PAGE_TOP, 200);
        assert!(placed.iter().all(|&(_, y)| (PAGE_BOTTOM..=PAGE_TOP).contains(&y)));
        assert!(placed.windows(2).all(|w| w[1].0 >= w[0].0));
        assert!(placed.last().unwrap().0 >= 3);
    }

    #[test]
    fn test_render_long_prescription() {
        let patient = Patient::new("Jane Doe".into(), "555-1234".into());
        let mut visit = Visit::new(patient.id.clone(), Default::default());
        visit.prescription = (1..=150)
            .map(|n| format!("Step {n}: take one tablet after meals."))
            .collect::<Vec<_>>()
            .join("\n");

        let bytes = render_pdf(&VisitReport::new(&patient, &visit)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_non_latin_name() {
        let patient = Patient::new("Zoë Ψ 山田".into(), "555-1234".into());
        let visit = Visit::new(patient.id.clone(), Default::default());

        let bytes = render_pdf(&VisitReport::new(&patient, &visit)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
