pub mod html;
pub mod pdf;

use crate::cli::ExportFormat;
use crate::error::Result;
use commissioning_report_common::ReportSnapshot;
use std::path::{Path, PathBuf};

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.to_path_buf()
    }
}

pub fn export_snapshot(
    snapshot: &ReportSnapshot,
    format: &ExportFormat,
    output_dir: &Path,
    title: &str,
) -> Result<()> {
    match format {
        ExportFormat::Html => {
            let output_path = output_path_for_format(output_dir, title, "html");
            println!("- HTMLを生成中...");
            html::generate_html(snapshot, &output_path)?;
            println!("✔ HTML出力: {}", output_path.display());
        }
        ExportFormat::Pdf => {
            let output_path = output_path_for_format(output_dir, title, "pdf");
            println!("- PDFを生成中...");
            pdf::generate_pdf(snapshot, &output_path, title)?;
            println!("✔ PDF出力: {}", output_path.display());
        }
        ExportFormat::Both => {
            let html_path = output_path_for_format(output_dir, title, "html");
            println!("- HTMLを生成中...");
            html::generate_html(snapshot, &html_path)?;
            println!("✔ HTML出力: {}", html_path.display());

            let pdf_path = output_path_for_format(output_dir, title, "pdf");
            println!("- PDFを生成中...");
            pdf::generate_pdf(snapshot, &pdf_path, title)?;
            println!("✔ PDF出力: {}", pdf_path.display());
        }
    }

    Ok(())
}
