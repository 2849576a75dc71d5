//! エクスポートの統合テスト

use commissioning_report_common::{Category, ChecklistItem, Product, ReportData, ReportSnapshot};
use commissioning_report_rust::export::{html, pdf};
use tempfile::tempdir;

fn sample_report() -> ReportData {
    ReportData {
        title: "LGE SAC Commissioning Report".into(),
        project_name: "Tower A".into(),
        opportunity_number: "OPP-2025-001".into(),
        address: "Seoul, Gangnam-gu".into(),
        inspection_date: "2025-06-01".into(),
        products: vec![Product {
            name: "ODU".into(),
            model_name: "ARUM080LTE5".into(),
            quantity: "2".into(),
        }],
        categories: vec![Category {
            id: "c1".into(),
            name: "Refrigerant Pipe".into(),
            items: vec![
                ChecklistItem {
                    id: "i1".into(),
                    text: "Is the pipe insulated?".into(),
                    pass: true,
                    images: vec!["data:image/jpeg;base64,/9j/AAAA".into()],
                    ..Default::default()
                },
                ChecklistItem {
                    id: "i2".into(),
                    text: "Leak test passed?".into(),
                    fail: true,
                    issue: "joint leak at ODU side".into(),
                    ..Default::default()
                },
            ],
        }],
        commissioner_signature: "data:image/png;base64,iVBOR".into(),
        ..Default::default()
    }
}

#[test]
fn test_html_export_is_self_contained() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("report.html");
    let snapshot = ReportSnapshot::capture(&sample_report());

    html::generate_html(&snapshot, &path).expect("HTML生成失敗");

    let content = std::fs::read_to_string(&path).expect("読み込み失敗");
    // ヘッダ・製品・判定・問題メモ・埋め込み画像がすべて1ファイルに入る
    assert!(content.contains("LGE SAC Commissioning Report"));
    assert!(content.contains("ARUM080LTE5"));
    assert!(content.contains("joint leak at ODU side"));
    assert!(content.contains("data:image/jpeg;base64,/9j/AAAA"));
    assert!(content.contains("data:image/png;base64,iVBOR"));
}

#[test]
fn test_pdf_export_writes_valid_header() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("report.pdf");
    let snapshot = ReportSnapshot::capture(&sample_report());

    pdf::generate_pdf(&snapshot, &path, "Commissioning_Report").expect("PDF生成失敗");

    let bytes = std::fs::read(&path).expect("読み込み失敗");
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 500);
}

#[test]
fn test_snapshot_reflects_current_values() {
    let mut report = sample_report();
    report.categories[0].items[1].set_pass(true);

    let snapshot = ReportSnapshot::capture(&report);
    assert_eq!(snapshot.categories[0].items[0].status, "OK");
    // set_passでfailはクリアされるのでNGではなくOK
    assert_eq!(snapshot.categories[0].items[1].status, "OK");
}
