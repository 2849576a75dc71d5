use clap::Parser;
use commissioning_report_common::{
    default_template, diff_entries, extract_cache, media, prepare_for_save, seed_if_empty,
    template_from_categories, validate, AccessGate, ChecklistItem, Credential, GateConfig,
    InspectionEntry, ReportData, ReportSnapshot,
};
use commissioning_report_rust::{cli, config, error, export, scanner, store};

use cli::{Cli, Commands};
use config::Config;
use error::{ReportCliError, Result};
use store::http::HttpTemplateStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Show { report } => {
            println!("📋 commissioning-report - レポート概要\n");

            let report = store::load_report(&report)?;
            print_summary(&report);
        }

        Commands::Export { report, format, output, title } => {
            println!("📄 commissioning-report - エクスポート\n");

            let report_data = store::load_report(&report)?;
            let snapshot = ReportSnapshot::capture(&report_data);

            let title = title.unwrap_or_else(|| {
                if report_data.title.is_empty() {
                    "Commissioning_Report".to_string()
                } else {
                    report_data.title.replace(' ', "_")
                }
            });
            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));

            export::export_snapshot(&snapshot, &format, &output_dir, &title)?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Attach { report: report_path, item_id, folder } => {
            println!("📷 commissioning-report - 証拠写真の添付\n");

            let mut report = store::load_report(&report_path)?;

            println!("[1/3] 写真をスキャン中...");
            let images = scanner::scan_folder(&folder)?;
            if images.is_empty() {
                return Err(ReportCliError::NoImagesFound(folder.display().to_string()));
            }
            println!("✔ {}枚の写真を検出\n", images.len());

            println!("[2/3] 画像を正規化中...");
            let opts = media::NormalizeOptions {
                max_dimension: config.max_image_dimension,
                jpeg_quality: config.jpeg_quality,
                ..Default::default()
            };

            let item = find_item_mut(&mut report, &item_id)
                .ok_or_else(|| ReportCliError::ItemNotFound(item_id.clone()))?;
            let before = InspectionEntry::from_item(item);

            // ピークメモリを抑えるため1枚ずつ読み込んで処理する
            let progress = indicatif::ProgressBar::new(images.len() as u64);
            let mut added = 0usize;
            let mut errors: Vec<media::FileError> = Vec::new();
            for image_file in &images {
                let outcome = match std::fs::read(&image_file.path) {
                    Ok(bytes) => media::normalize_batch(
                        &[(image_file.file_name.clone(), bytes)],
                        &opts,
                        item.images.len(),
                    ),
                    Err(e) => media::BatchOutcome {
                        images: Vec::new(),
                        errors: vec![media::FileError {
                            file_name: image_file.file_name.clone(),
                            message: e.to_string(),
                        }],
                    },
                };
                added += outcome.images.len();
                item.images.extend(outcome.images);
                errors.extend(outcome.errors);
                progress.inc(1);
            }
            progress.finish_and_clear();
            let after = InspectionEntry::from_item(item);

            println!("✔ {}枚を添付", added);
            for error in &errors {
                eprintln!("⚠ スキップ: {} ({})", error.file_name, error.message);
            }

            println!("\n[3/3] 保存中...");
            let changes = diff_entries(&item_id, &before, &after, &chrono::Utc::now().to_rfc3339());

            let folder = report_dir(&report_path);
            store::save_report(&report_path, &report)?;
            store::save_cache(folder, &extract_cache(&report.categories))?;
            if let Err(e) = store::append_history(folder, &changes) {
                eprintln!("⚠ 履歴の記録に失敗: {}", e);
            }
            println!("✔ 保存完了: {}", report_path.display());
        }

        Commands::Edit { report: report_path } => {
            println!("✏️  commissioning-report - 編集モード\n");

            let mut report = store::load_report(&report_path)?;
            run_edit_session(&config, &report_path, &mut report)?;
        }

        Commands::Template { pull, push, seed, show, file } => {
            println!("🗂  commissioning-report - テンプレート\n");

            if pull {
                let http = http_store(&config)?;
                println!("- ストアから取得中...");
                let template = http.load_template().await?;
                validate(&template)?;
                store::save_template_file(&file, &template)?;
                println!("✔ 取得完了: {} (v{}, {}項目)", file.display(), template.version, template.item_count());
            }

            if push {
                let http = http_store(&config)?;
                let mut template = store::load_template_file(&file)?;
                validate(&template)?;
                let base_version = template.version;
                prepare_for_save(&mut template);
                println!("- ストアへ保存中...");
                http.save_template(&template, base_version).await?;
                println!("✔ 保存完了 (v{})", template.version);
            }

            if seed {
                let http = http_store(&config)?;
                println!("- ストアを確認中...");
                let loaded = http.load_template().await?;
                match seed_if_empty(&loaded) {
                    Some(seeded) => {
                        http.save_template(&seeded, loaded.version).await?;
                        println!("✔ デフォルトテンプレートをシード ({}カテゴリ)", seeded.categories.len());
                    }
                    None => println!("シード不要（{}カテゴリ登録済み）", loaded.categories.len()),
                }
            }

            if show {
                let template = if file.exists() {
                    store::load_template_file(&file)?
                } else {
                    println!("（ファイルなし、バンドル版デフォルトを表示）");
                    default_template()
                };
                println!("テンプレート v{} / 製品タイプ: {}", template.version, template.product_types.join(", "));
                for cat in &template.categories {
                    println!("  [{}] {} ({}項目)", cat.id, cat.name, cat.items.len());
                    if cli.verbose {
                        for item in &cat.items {
                            println!("    - [{}] ({}) {}", item.id, item.product_type, item.text);
                        }
                    }
                }
            }

            if !pull && !push && !seed && !show {
                println!("操作を指定してください: --pull / --push / --seed / --show");
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| std::path::PathBuf::from("."));
            let cache_path = store::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = store::load_cache(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    println!("  概算サイズ: {} KB", cache.approx_size_bytes() / 1024);
                    match cache.size_check() {
                        commissioning_report_common::SizeCheck::Ok => {}
                        commissioning_report_common::SizeCheck::NearLimit => {
                            println!("⚠ サイズが警告閾値に近づいています。画像の削減を検討してください")
                        }
                        commissioning_report_common::SizeCheck::OverLimit => {
                            println!("⚠ サイズが上限を超えています。保存に失敗する可能性があります")
                        }
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                let confirmed = dialoguer::Confirm::new()
                    .with_prompt("ローカルの点検データをすべて削除します。よろしいですか？")
                    .default(false)
                    .interact()?;
                if confirmed {
                    match store::clear_cache(&target) {
                        Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                        Ok(false) => println!("キャッシュファイルが存在しません"),
                        Err(e) => println!("キャッシュ削除エラー: {}", e),
                    }
                } else {
                    println!("キャンセルしました");
                }
            }
        }

        Commands::Config { set_store_url, set_api_key, set_password, show } => {
            let mut config = config;

            if let Some(url) = set_store_url {
                config.store_url = Some(url);
                config.save()?;
                println!("✔ ストアURLを設定しました");
            }

            if let Some(key) = set_api_key {
                config.api_key = Some(key);
                config.save()?;
                println!("✔ APIキーを設定しました");
            }

            if set_password {
                let password = dialoguer::Password::new()
                    .with_prompt("編集モードパスワード")
                    .with_confirmation("確認のため再入力", "パスワードが一致しません")
                    .interact()?;
                config.set_password(&password)?;
                println!("✔ パスワードを設定しました（ダイジェストのみ保存）");
            }

            if show {
                println!("設定:");
                println!("  ストアURL: {}", config.store_url.as_deref().unwrap_or("未設定"));
                println!("  APIキー: {}", if config.api_key.is_some() { "設定済み" } else { "未設定" });
                println!("  パスワード: {}", if config.password_sha256.is_some() { "設定済み" } else { "未設定" });
                println!("  最大画像サイズ: {}px", config.max_image_dimension);
                println!("  JPEG品質: {}", config.jpeg_quality);
                println!("  デバウンス遅延: {}ms", config.debounce_ms);
            }
        }
    }

    Ok(())
}

fn report_dir(report_path: &std::path::Path) -> &std::path::Path {
    report_path.parent().unwrap_or_else(|| std::path::Path::new("."))
}

fn http_store(config: &Config) -> Result<HttpTemplateStore> {
    let url = config.store_url()?;
    let api_key = config.api_key.clone().unwrap_or_default();
    Ok(HttpTemplateStore::new(url, &api_key))
}

fn find_item_mut<'a>(report: &'a mut ReportData, item_id: &str) -> Option<&'a mut ChecklistItem> {
    report
        .categories
        .iter_mut()
        .flat_map(|c| c.items.iter_mut())
        .find(|i| i.id == item_id)
}

fn print_summary(report: &ReportData) {
    println!("タイトル: {}", report.title);
    if !report.project_name.is_empty() {
        println!("プロジェクト: {}", report.project_name);
    }
    if !report.inspection_date.is_empty() {
        println!("点検日: {}", report.inspection_date);
    }
    println!();

    for cat in &report.categories {
        let ok = cat.items.iter().filter(|i| i.pass).count();
        let ng = cat.items.iter().filter(|i| i.fail).count();
        let pending = cat.items.len() - ok - ng;
        println!("{} — OK:{} NG:{} 未判定:{}", cat.name, ok, ng, pending);
        for item in &cat.items {
            let mark = if item.pass { "✔" } else if item.fail { "✘" } else { "・" };
            println!("  {} [{}] {}", mark, item.id, item.text);
            if !item.issue.is_empty() {
                println!("      問題: {}", item.issue);
            }
            if !item.images.is_empty() {
                println!("      写真: {}枚", item.images.len());
            }
        }
    }
}

/// 対話編集セッション
///
/// アクセスゲートを通過した場合のみ入れる。終了時（Unlocked→Locked）に
/// テンプレート変更があればtemplate.jsonへ書き戻す。
fn run_edit_session(
    config: &Config,
    report_path: &std::path::Path,
    report: &mut ReportData,
) -> Result<()> {
    let mut gate = AccessGate::new(GateConfig {
        password_sha256: config.password_sha256.clone(),
    });

    let password = dialoguer::Password::new()
        .with_prompt("編集モードパスワード")
        .interact()?;
    gate.unlock(&Credential::Password(password))
        .map_err(|e| {
            eprintln!("✘ 編集モードに入れません");
            e
        })?;
    println!("✔ 編集モードに入りました\n");

    let mut all_changes = Vec::new();

    loop {
        let action = dialoguer::Select::new()
            .with_prompt("操作を選択")
            .items(&["項目の判定を編集", "カテゴリ名を変更", "編集を終了"])
            .default(0)
            .interact()?;

        match action {
            0 => {
                let cat_names: Vec<&str> =
                    report.categories.iter().map(|c| c.name.as_str()).collect();
                if cat_names.is_empty() {
                    println!("カテゴリがありません");
                    continue;
                }
                let ci = dialoguer::Select::new()
                    .with_prompt("カテゴリ")
                    .items(&cat_names)
                    .interact()?;

                let item_labels: Vec<String> = report.categories[ci]
                    .items
                    .iter()
                    .map(|i| {
                        let mark = if i.pass { "OK" } else if i.fail { "NG" } else { "-" };
                        format!("[{}] {}", mark, i.text)
                    })
                    .collect();
                if item_labels.is_empty() {
                    println!("項目がありません");
                    continue;
                }
                let ii = dialoguer::Select::new()
                    .with_prompt("項目")
                    .items(&item_labels)
                    .interact()?;

                let item = &mut report.categories[ci].items[ii];
                let before = InspectionEntry::from_item(item);

                let verdict = dialoguer::Select::new()
                    .with_prompt("判定")
                    .items(&["OK", "NG", "クリア", "問題メモを入力"])
                    .interact()?;
                match verdict {
                    0 => item.set_pass(true),
                    1 => item.set_fail(true),
                    2 => {
                        item.set_pass(false);
                        item.set_fail(false);
                    }
                    _ => {
                        let issue: String = dialoguer::Input::new()
                            .with_prompt("問題メモ")
                            .allow_empty(true)
                            .interact_text()?;
                        item.issue = issue;
                    }
                }

                all_changes.extend(diff_entries(
                    &item.id.clone(),
                    &before,
                    &InspectionEntry::from_item(item),
                    &chrono::Utc::now().to_rfc3339(),
                ));
            }
            1 => {
                let cat_names: Vec<&str> =
                    report.categories.iter().map(|c| c.name.as_str()).collect();
                if cat_names.is_empty() {
                    println!("カテゴリがありません");
                    continue;
                }
                let ci = dialoguer::Select::new()
                    .with_prompt("カテゴリ")
                    .items(&cat_names)
                    .interact()?;
                let new_name: String = dialoguer::Input::new()
                    .with_prompt("新しいカテゴリ名")
                    .with_initial_text(report.categories[ci].name.clone())
                    .interact_text()?;
                if !new_name.trim().is_empty() {
                    report.categories[ci].name = new_name;
                    gate.mark_template_dirty();
                }
            }
            _ => break,
        }
    }

    // Unlocked → Locked。テンプレート書き戻しはこの遷移でのみ行う
    let template_dirty = gate.lock();

    let folder = report_dir(report_path);
    store::save_report(report_path, report)?;
    store::save_cache(folder, &extract_cache(&report.categories))?;
    if let Err(e) = store::append_history(folder, &all_changes) {
        eprintln!("⚠ 履歴の記録に失敗: {}", e);
    }
    println!("✔ レポートを保存: {}", report_path.display());

    if template_dirty {
        let template_path = folder.join("template.json");
        let base = store::load_template_file(&template_path)
            .map(|t| t.version)
            .unwrap_or(0);
        let mut template =
            template_from_categories(&report.categories, &report.product_types, base);
        prepare_for_save(&mut template);
        store::save_template_file(&template_path, &template)?;
        println!("✔ テンプレートを書き戻し: {} (v{})", template_path.display(), template.version);
        println!("  ストアへ反映するには `commissioning-report template --push` を実行してください");
    }

    println!("\n✅ 編集モードを終了しました");
    Ok(())
}
