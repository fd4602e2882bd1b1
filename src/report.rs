//! 端末表示

use spare_parts_common::{CatalogEntry, DraftSession, KeyValueStore, Repairability};

pub fn print_catalog(entries: &[&CatalogEntry]) {
    if entries.is_empty() {
        println!("該当する部品がありません");
        return;
    }

    for entry in entries {
        let item = &entry.item;
        println!(
            "{} {:<12} {:<22} {:<32} 最大{:>3}  {}",
            if entry.disabled { "✔" } else { " " },
            item.name,
            item.level.as_deref().unwrap_or("-"),
            item.description,
            item.max_qty,
            entry.warranty,
        );
    }
    println!("\n{}件", entries.len());
}

pub fn print_draft<S: KeyValueStore>(session: &DraftSession<S>) {
    let ledger = session.ledger();
    println!("サービスコール: {}", session.service_call_id());

    if ledger.is_empty() {
        println!("  選択中の部品はありません");
    }
    for part in ledger.selected() {
        let saved = ledger
            .resolve_id(&part.name)
            .map(|id| format!("保存済み {}", id))
            .unwrap_or_else(|| "新規".to_string());
        println!(
            "  {:<12} {:<32} x{:<3} 旧:{} 新:{} [{}]{}",
            part.name,
            part.description,
            part.quantity,
            part.old_serial_number.as_deref().unwrap_or("-"),
            part.new_serial_number.as_deref().unwrap_or("-"),
            saved,
            part.appeal_reason
                .as_deref()
                .map(|r| format!(" アピール: {}", r))
                .unwrap_or_default(),
        );
    }

    if !ledger.marked_for_delete().is_empty() {
        println!("  削除予定: {}", ledger.marked_for_delete().join(", "));
    }

    if ledger.is_repairability_visible() {
        let status = match ledger.repairability() {
            Some(Repairability::WaitingForParts) => "部品待ち",
            Some(Repairability::StartingRepair) => "修理開始",
            None => "未選択",
        };
        println!("  修理可否: {}", status);
    }

    if session.is_repairability_error() {
        if let Some(message) = &session.error_fields().repairability_error {
            println!("  ⚠ {}", message);
        }
    }
}
