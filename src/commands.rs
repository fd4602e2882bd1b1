//! サブコマンドの実行
//!
//! 1回の実行を1回の画面表示とみなし、入場で下書きを復元し、
//! 終了時に `suspend` してから抜ける。

use crate::cli::Commands;
use crate::config::Config;
use crate::error::{DraftCliError, Result};
use crate::file_store::FileStore;
use crate::fixtures::FixtureService;
use crate::report;
use spare_parts_common::{
    filter_catalog, load_catalog, mark_added, DraftSession, DraftStore, PartCard,
};
use tracing::debug;

/// 下書きファイルを開く
pub fn open_store(config: &Config) -> Result<DraftStore<FileStore>> {
    let dir = config.resolved_store_dir()?;
    let store = FileStore::open(&dir, &config.origin)?;
    debug!(path = %store.path().display(), "draft store opened");
    Ok(DraftStore::new(store))
}

/// 下書きを復元したセッションを開く
pub async fn open_session(
    config: &Config,
    service_call_id: &str,
    service: &FixtureService,
) -> Result<DraftSession<FileStore>> {
    let mut session = DraftSession::new(service_call_id, open_store(config)?);
    let outcome = session.restore(service).await;
    debug!(?outcome, service_call_id, "draft session entered");
    Ok(session)
}

pub async fn run(command: Commands, config: &mut Config) -> Result<()> {
    let service = FixtureService::new(config.data_dir.clone());

    match command {
        Commands::Catalog { asset, search, service_call, json } => {
            let mut entries = load_catalog(&service, &asset).await;

            if let Some(service_call) = service_call {
                let mut session = open_session(config, &service_call, &service).await?;
                mark_added(&mut entries, |name| session.ledger().contains(name));
                session.suspend();
            }

            let visible = filter_catalog(&entries, search.as_deref().unwrap_or(""));
            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                report::print_catalog(&visible);
            }
        }

        Commands::Show { service_call, appeal_rows } => {
            let mut session = open_session(config, &service_call, &service).await?;
            for row_id in &appeal_rows {
                session.ledger_mut().set_appeal_enabled(row_id, true);
            }
            report::print_draft(&session);
            session.suspend();
        }

        Commands::Add { service_call, asset, name, quantity, old_serial, new_serial } => {
            let entries = load_catalog(&service, &asset).await;
            let entry = entries
                .into_iter()
                .find(|entry| entry.item.name == name)
                .ok_or_else(|| DraftCliError::PartNotFound(name.clone()))?;

            let mut card = PartCard::new(entry.item);
            card.set_quantity(quantity);
            if let Some(serial) = old_serial {
                card.set_old_serial_number(serial);
            }
            if let Some(serial) = new_serial {
                card.set_new_serial_number(serial);
            }

            let mut session = open_session(config, &service_call, &service).await?;
            if session.ledger_mut().add_part(card.submit()) {
                println!(
                    "✔ {} を追加しました（数量 {} / 上限 {}）",
                    card.item().name,
                    card.quantity(),
                    card.item().max_quantity()
                );
            } else {
                println!("{} は追加済みです", name);
            }
            session.suspend();
        }

        Commands::Remove { service_call, name } => {
            let mut session = open_session(config, &service_call, &service).await?;
            let removed = session
                .ledger_mut()
                .remove_part(&name)
                .ok_or_else(|| DraftCliError::NotSelected(name.clone()))?;
            if session.ledger().resolve_id(&removed.name).is_some() {
                println!("✔ {} を削除予定にしました", name);
            } else {
                println!("✔ {} を削除しました", name);
            }
            session.suspend();
        }

        Commands::Quantity { service_call, name, quantity } => {
            let mut session = open_session(config, &service_call, &service).await?;
            let applied = session
                .ledger_mut()
                .set_quantity(&name, quantity)
                .ok_or_else(|| DraftCliError::NotSelected(name.clone()))?;
            println!("✔ {} の数量: {}", name, applied);
            session.suspend();
        }

        Commands::Appeal { service_call, name, reason } => {
            let mut session = open_session(config, &service_call, &service).await?;
            let row_id = session
                .ledger()
                .selected()
                .iter()
                .find(|part| part.name == name)
                .map(|part| part.id.clone())
                .ok_or_else(|| DraftCliError::NotSelected(name.clone()))?;

            if session.ledger_mut().set_appeal_reason(&row_id, &reason) {
                println!("✔ {} のアピール理由を設定しました", name);
            } else {
                println!("アピール理由が空のため変更しません");
            }
            session.suspend();
        }

        Commands::Repairability { service_call, status } => {
            let mut session = open_session(config, &service_call, &service).await?;
            session.ledger_mut().set_repairability(status.to_status());
            if session.ledger().is_repairability_visible() {
                println!("✔ 修理可否: {}", status);
            } else {
                println!("修理可否は現在の選択では不要です");
            }
            session.suspend();
        }

        Commands::Validate { service_call, appeal_rows, output } => {
            let mut session = open_session(config, &service_call, &service).await?;
            for row_id in &appeal_rows {
                session.ledger_mut().set_appeal_enabled(row_id, true);
            }

            let outcome = session.validate();
            if !outcome.is_valid {
                report::print_draft(&session);
                println!("\n✘ 検証エラー");
                return Ok(());
            }

            let json = session.spare_parts_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &json)?;
                    println!("✔ 保存用JSONを出力: {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Reset { yes } => {
            let confirmed = yes
                || dialoguer::Confirm::new()
                    .with_prompt(format!("オリジン '{}' の下書きを全て削除しますか？", config.origin))
                    .default(false)
                    .interact()
                    .map_err(|e| DraftCliError::Io(std::io::Error::other(e)))?;

            if confirmed {
                open_store(config)?.clear_all()?;
                println!("✔ 下書きを削除しました");
            }
        }

        Commands::Config { set_origin, set_data_dir, set_store_dir, show } => {
            let mut changed = false;
            if let Some(origin) = set_origin {
                config.set_origin(origin)?;
                changed = true;
            }
            if let Some(dir) = set_data_dir {
                config.data_dir = dir;
                changed = true;
            }
            if let Some(dir) = set_store_dir {
                config.store_dir = Some(dir);
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  オリジン: {}", config.origin);
                println!("  フィクスチャ: {}", config.data_dir.display());
                println!("  保存先: {}", config.resolved_store_dir()?.display());
            }
        }
    }

    Ok(())
}
