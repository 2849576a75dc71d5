//! 逆ジオコーディング
//!
//! 端末の現在地から住所文字列を引く。Nominatim APIが使えない・
//! 失敗した場合は生の座標表示に格下げする（住所欄が空のままに
//! なるよりはまし、という扱い）。

use futures::channel::oneshot;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    display_name: Option<String>,
}

/// 座標の素の表示（ジオコーディング失敗時のフォールバック）
pub fn coords_label(lat: f64, lon: f64) -> String {
    format!("{:.5}, {:.5}", lat, lon)
}

/// 座標→住所。失敗したら座標表示を返す（エラーは返さない）
pub async fn reverse_geocode(lat: f64, lon: f64) -> String {
    match fetch_address(lat, lon).await {
        Some(address) => address,
        None => coords_label(lat, lon),
    }
}

async fn fetch_address(lat: f64, lon: f64) -> Option<String> {
    let url = format!("{}?format=json&lat={}&lon={}", NOMINATIM_URL, lat, lon);

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(&url, &opts).ok()?;
    let window = web_sys::window()?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await.ok()?;
    let resp: Response = resp_value.dyn_into().ok()?;
    if !resp.ok() {
        return None;
    }

    let text = JsFuture::from(resp.text().ok()?).await.ok()?;
    let parsed: NominatimResponse = serde_json::from_str(&text.as_string()?).ok()?;
    parsed.display_name
}

/// 端末の現在地を取得する（Geolocation API）
pub async fn current_position() -> Result<(f64, f64), String> {
    let window = web_sys::window().ok_or("windowが取得できません")?;
    let geolocation = window
        .navigator()
        .geolocation()
        .map_err(|_| "位置情報が利用できません")?;

    let (tx, rx) = oneshot::channel::<Result<(f64, f64), String>>();
    let tx = std::rc::Rc::new(std::cell::RefCell::new(Some(tx)));

    let tx_ok = tx.clone();
    let on_success = Closure::wrap(Box::new(move |pos: web_sys::Position| {
        let coords = pos.coords();
        if let Some(tx) = tx_ok.borrow_mut().take() {
            let _ = tx.send(Ok((coords.latitude(), coords.longitude())));
        }
    }) as Box<dyn FnMut(web_sys::Position)>);

    let tx_err = tx.clone();
    let on_error = Closure::wrap(Box::new(move |err: web_sys::PositionError| {
        if let Some(tx) = tx_err.borrow_mut().take() {
            let _ = tx.send(Err(format!("位置情報の取得に失敗: {}", err.message())));
        }
    }) as Box<dyn FnMut(web_sys::PositionError)>);

    geolocation
        .get_current_position_with_error_callback(
            on_success.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
        )
        .map_err(|_| "位置情報の要求に失敗しました")?;

    // コールバックはチャネル解決まで生かす
    on_success.forget();
    on_error.forget();

    rx.await.map_err(|_| "位置情報の応答がありません".to_string())?
}
