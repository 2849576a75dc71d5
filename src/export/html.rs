//! 印刷可能なHTMLレポート生成
//!
//! スナップショットから自己完結のHTML（画像はData URL埋め込み）を
//! 生成する。外部リソース参照なし、そのまま印刷・配布できる。

use crate::error::Result;
use commissioning_report_common::ReportSnapshot;
use std::fmt::Write as _;
use std::path::Path;

/// HTMLエスケープ
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const STYLE: &str = "\
body{font-family:sans-serif;max-width:900px;margin:0 auto;padding:24px;color:#222}\
h1{border-bottom:3px solid #a50034;padding-bottom:8px}\
h2{border-bottom:2px solid #a50034;padding-bottom:4px;margin-top:32px}\
table{border-collapse:collapse;width:100%;margin:12px 0}\
th,td{border:1px solid #bbb;padding:8px;text-align:left;vertical-align:top}\
th{background:#f4f4f4}\
.status-ok{color:#1a7f37;font-weight:bold}\
.status-ng{color:#c62828;font-weight:bold}\
.issue{color:#c62828;font-size:0.9em}\
.evidence img{height:96px;margin:4px;border:1px solid #bbb}\
.signature img{height:72px;border-bottom:1px solid #222}\
.meta td{border:none;padding:2px 8px}\
@media print{body{padding:0}}";

fn status_class(status: &str) -> &'static str {
    match status {
        "OK" => "status-ok",
        "NG" => "status-ng",
        _ => "",
    }
}

/// スナップショットをHTML文字列に変換する
pub fn build_html(snapshot: &ReportSnapshot) -> String {
    let mut out = String::new();
    let title = if snapshot.title.is_empty() {
        "Commissioning Report"
    } else {
        &snapshot.title
    };

    let _ = write!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>",
        escape(title),
        STYLE
    );
    let _ = write!(out, "<h1>{}</h1>", escape(title));

    // プロジェクト情報
    out.push_str("<table class=\"meta\">");
    for (label, value) in [
        ("Project", &snapshot.project_name),
        ("Opportunity No.", &snapshot.opportunity_number),
        ("Address", &snapshot.address),
        ("Inspection Date", &snapshot.inspection_date),
    ] {
        let _ = write!(out, "<tr><td><b>{}</b></td><td>{}</td></tr>", label, escape(value));
    }
    out.push_str("</table>");

    // 製品リスト
    out.push_str("<h2>Product List</h2><table><tr><th>Product</th><th>Model Name</th><th>Quantity</th></tr>");
    for (name, model, quantity) in &snapshot.products {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(name),
            escape(model),
            escape(quantity)
        );
    }
    out.push_str("</table>");

    // カテゴリとチェック項目
    for category in &snapshot.categories {
        let _ = write!(out, "<h2>{}</h2>", escape(&category.name));
        out.push_str("<table><tr><th>Checklist</th><th>Type</th><th>Result</th></tr>");
        for item in &category.items {
            let _ = write!(
                out,
                "<tr><td>{}",
                escape(&item.text)
            );
            if !item.issue.is_empty() {
                let _ = write!(out, "<div class=\"issue\">Issue: {}</div>", escape(&item.issue));
            }
            if !item.images.is_empty() {
                out.push_str("<div class=\"evidence\">");
                for image in &item.images {
                    // Data URLのみ受け付ける（外部参照は埋め込まない）
                    if image.starts_with("data:image/") {
                        let _ = write!(out, "<img src=\"{}\" alt=\"evidence\">", image);
                    }
                }
                out.push_str("</div>");
            }
            let _ = write!(
                out,
                "</td><td>{}</td><td class=\"{}\">{}</td></tr>",
                escape(&item.product_type),
                status_class(&item.status),
                escape(&item.status)
            );
        }
        out.push_str("</table>");
    }

    // 署名欄
    out.push_str("<h2>Signatures</h2><table><tr><th>Commissioner</th><th>Installer</th><th>Customer</th></tr><tr>");
    for signature in [
        &snapshot.commissioner_signature,
        &snapshot.installer_signature,
        &snapshot.customer_signature,
    ] {
        if signature.starts_with("data:image/") {
            let _ = write!(out, "<td class=\"signature\"><img src=\"{}\" alt=\"signature\"></td>", signature);
        } else {
            out.push_str("<td></td>");
        }
    }
    out.push_str("</tr></table></body></html>");

    out
}

/// HTMLファイルを書き出す
pub fn generate_html(snapshot: &ReportSnapshot, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, build_html(snapshot))?;
    Ok(())
}
