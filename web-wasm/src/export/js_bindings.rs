//! JavaScript Bridge バインディング
//!
//! DOMのラスタライズはフォーム入力の現在値を拾えないため、PDF生成は
//! スナップショットJSONをJavaScript側のレンダラに渡して行う。
//! 署名パッドの描画もJavaScript側に委譲する。

use commissioning_report_common::ReportSnapshot;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/pdf-bridge.js")]
extern "C" {
    /// スナップショットJSONからPDFを生成（Uint8Arrayを返す）
    #[wasm_bindgen(js_name = "generateReportPdf", catch)]
    pub async fn generate_report_pdf_js(snapshot_json: &str) -> Result<JsValue, JsValue>;
}

#[wasm_bindgen(module = "/js/download.js")]
extern "C" {
    /// バイト配列をファイルとしてダウンロードさせる
    #[wasm_bindgen(js_name = "downloadPdf")]
    pub fn download_pdf_js(data: &[u8], filename: &str);
}

#[wasm_bindgen(module = "/js/signature-pad.js")]
extern "C" {
    /// キャンバスを署名パッドとして初期化
    #[wasm_bindgen(js_name = "initSignaturePad")]
    pub fn init_signature_pad_js(canvas_id: &str);

    /// 現在の署名をData URLとして読み出す（未記入ならnull）
    #[wasm_bindgen(js_name = "readSignature")]
    pub fn read_signature_js(canvas_id: &str) -> Option<String>;

    /// 署名パッドを消去
    #[wasm_bindgen(js_name = "clearSignature")]
    pub fn clear_signature_js(canvas_id: &str);
}

/// スナップショットをレンダラに渡すJSONへ変換する
pub fn snapshot_to_json(snapshot: &ReportSnapshot) -> Result<String, String> {
    serde_json::to_string(snapshot).map_err(|e| format!("JSON変換に失敗: {}", e))
}
