//! 定数定義
//!
//! 部品カテゴリの表示順、保証区分の値、数量ステッパーの範囲など。

/// カテゴリ（level, 小文字）→ 表示優先度
///
/// 表にないカテゴリは優先度なしとしてアルファベット順で後ろに並ぶ。
pub const LEVEL_PRIORITY: &[(&str, u8)] = &[
    ("mu", 0),
    ("motor unit-commercial", 0),
    ("motor unit-residential", 0),
    ("motor unit", 0),
    ("power supply", 1),
    ("cables", 2),
    ("brushes", 3),
    ("filters", 4),
    ("tracks & belts", 5),
];

/// 保証内の保存値
pub const IN_WARRANTY: &str = "In Warranty";

/// 保証外の保存値
pub const OUT_OF_WARRANTY: &str = "Out of Warranty";

/// 数量の下限
pub const MIN_QUANTITY: u32 = 1;

/// ステッパーの増減幅
pub const QUANTITY_STEP: u32 = 1;

/// 修理可否エラーのフィールド名
pub const REPAIRABILITY_ERROR_FIELD: &str = "repairabilityError";

/// 修理可否が未選択のときのメッセージ
pub const REPAIRABILITY_ERROR_MESSAGE: &str =
    "Please choose whether the service call is waiting for parts or the repair can start.";

/// カテゴリ名から表示優先度を引く（大文字小文字は無視）
pub fn level_priority(level: &str) -> Option<u8> {
    let lowered = level.to_lowercase();
    LEVEL_PRIORITY
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, priority)| *priority)
}

/// 保証フラグから保存値を返す
pub fn warranty_label(is_out_of_warranty: bool) -> &'static str {
    if is_out_of_warranty {
        OUT_OF_WARRANTY
    } else {
        IN_WARRANTY
    }
}
