//! テキストレイアウトのPDFレポート生成
//!
//! 組み込みフォント（Helvetica）で項目と判定を並べる簡易レイアウト。
//! 写真はHTML出力側で確認する前提で、ここでは枚数だけを記す。

use crate::error::{ReportCliError, Result};
use commissioning_report_common::ReportSnapshot;
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_MM: f32 = 6.0;
/// 1行に収める概算文字数（Helvetica 10pt想定）
const WRAP_CHARS: usize = 90;

/// 組み込みフォントで扱えない文字を置き換える
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c.to_string() } else { "?".to_string() })
        .collect()
}

/// 雑な文字数ベースの折り返し
fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > width {
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

struct PdfWriterState {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y_mm: f32,
}

impl PdfWriterState {
    fn ensure_room(&mut self, needed_mm: f32) {
        if self.y_mm - needed_mm < MARGIN_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y_mm = A4_HEIGHT_MM - MARGIN_MM;
        }
    }

    fn text_line(&mut self, text: &str, size: f32, indent_mm: f32, font: &IndirectFontRef) {
        self.ensure_room(LINE_MM);
        self.layer.use_text(
            sanitize(text),
            size,
            Mm(MARGIN_MM + indent_mm),
            Mm(self.y_mm),
            font,
        );
        self.y_mm -= LINE_MM;
    }

    fn gap(&mut self, mm: f32) {
        self.y_mm -= mm;
    }
}

pub fn generate_pdf(snapshot: &ReportSnapshot, output_path: &Path, title: &str) -> Result<()> {
    let (doc, page1, layer1) =
        PdfDocument::new(title, Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportCliError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportCliError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;

    let mut state = PdfWriterState { doc, layer, y_mm: A4_HEIGHT_MM - MARGIN_MM };

    state.text_line(title, 16.0, 0.0, &font_bold);
    state.gap(4.0);

    for (label, value) in [
        ("Project", &snapshot.project_name),
        ("Opportunity No.", &snapshot.opportunity_number),
        ("Address", &snapshot.address),
        ("Inspection Date", &snapshot.inspection_date),
    ] {
        if !value.is_empty() {
            state.text_line(&format!("{}: {}", label, value), 10.0, 0.0, &font);
        }
    }
    state.gap(2.0);

    if !snapshot.products.is_empty() {
        state.text_line("Product List", 12.0, 0.0, &font_bold);
        for (name, model, quantity) in &snapshot.products {
            state.text_line(
                &format!("{}  model: {}  qty: {}", name, model, quantity),
                10.0,
                4.0,
                &font,
            );
        }
        state.gap(2.0);
    }

    for category in &snapshot.categories {
        state.ensure_room(LINE_MM * 3.0);
        state.text_line(&category.name, 12.0, 0.0, &font_bold);

        for item in &category.items {
            let first_prefix = format!("[{}] ", item.status);
            for (i, line) in wrap_lines(&item.text, WRAP_CHARS).iter().enumerate() {
                let text = if i == 0 {
                    format!("{}{}", first_prefix, line)
                } else {
                    line.clone()
                };
                state.text_line(&text, 10.0, if i == 0 { 4.0 } else { 10.0 }, &font);
            }
            if !item.issue.is_empty() {
                state.text_line(&format!("Issue: {}", item.issue), 9.0, 10.0, &font);
            }
            if !item.images.is_empty() {
                state.text_line(
                    &format!("Evidence photos: {}", item.images.len()),
                    9.0,
                    10.0,
                    &font,
                );
            }
        }
        state.gap(3.0);
    }

    let signatures = [
        ("Commissioner", &snapshot.commissioner_signature),
        ("Installer", &snapshot.installer_signature),
        ("Customer", &snapshot.customer_signature),
    ];
    state.ensure_room(LINE_MM * 4.0);
    state.text_line("Signatures", 12.0, 0.0, &font_bold);
    for (label, signature) in signatures {
        let mark = if signature.is_empty() { "(not signed)" } else { "(signed)" };
        state.text_line(&format!("{}: {}", label, mark), 10.0, 4.0, &font);
    }

    let file = File::create(output_path)?;
    state
        .doc
        .save(&mut BufWriter::new(file))
        .map_err(|e| ReportCliError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))?;

    Ok(())
}
