use clap::{Parser, Subcommand};
use spare_parts_common::Repairability;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "parts-draft")]
#[command(about = "サービスコール用の交換部品選択・下書き管理ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 保存オリジン（設定ファイルより優先）
    #[arg(long, global = true)]
    pub origin: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// カタログを表示順で一覧
    Catalog {
        /// 機器ID
        #[arg(short, long, required = true)]
        asset: String,

        /// 部品名・説明で絞り込み
        #[arg(short, long)]
        search: Option<String>,

        /// 追加済み表示に使うサービスコール
        #[arg(short = 'c', long)]
        service_call: Option<String>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 下書きの内容を表示
    Show {
        /// サービスコールID
        #[arg(short = 'c', long, required = true)]
        service_call: String,

        /// アピール入力を有効にする行ID
        #[arg(long = "appeal-row")]
        appeal_rows: Vec<String>,
    },

    /// 部品を追加
    Add {
        /// サービスコールID
        #[arg(short = 'c', long, required = true)]
        service_call: String,

        /// 機器ID
        #[arg(short, long, required = true)]
        asset: String,

        /// 部品名（SKU）
        #[arg(required = true)]
        name: String,

        /// 数量（1〜最大数量に丸める）
        #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
        quantity: i64,

        /// 取り外した部品のシリアル番号
        #[arg(long)]
        old_serial: Option<String>,

        /// 取り付ける部品のシリアル番号
        #[arg(long)]
        new_serial: Option<String>,
    },

    /// 部品を削除
    Remove {
        /// サービスコールID
        #[arg(short = 'c', long, required = true)]
        service_call: String,

        /// 部品名（SKU）
        #[arg(required = true)]
        name: String,
    },

    /// 数量を変更
    Quantity {
        /// サービスコールID
        #[arg(short = 'c', long, required = true)]
        service_call: String,

        /// 部品名（SKU）
        #[arg(required = true)]
        name: String,

        /// 新しい数量
        #[arg(required = true, allow_negative_numbers = true)]
        quantity: i64,
    },

    /// 保証外部品のアピール理由を設定
    Appeal {
        /// サービスコールID
        #[arg(short = 'c', long, required = true)]
        service_call: String,

        /// 部品名（SKU）
        #[arg(required = true)]
        name: String,

        /// アピール理由
        #[arg(required = true)]
        reason: String,
    },

    /// 修理可否を設定 (waiting/starting/unset)
    Repairability {
        /// サービスコールID
        #[arg(short = 'c', long, required = true)]
        service_call: String,

        #[arg(required = true)]
        status: RepairabilityArg,
    },

    /// 保存前の検証（成功時は保存用JSONを出力）
    Validate {
        /// サービスコールID
        #[arg(short = 'c', long, required = true)]
        service_call: String,

        /// アピール入力を有効にする行ID
        #[arg(long = "appeal-row")]
        appeal_rows: Vec<String>,

        /// 保存用JSONの出力先（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 下書きを全て削除
    Reset {
        /// 確認しない
        #[arg(short, long)]
        yes: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 保存オリジンを設定
        #[arg(long)]
        set_origin: Option<String>,

        /// フィクスチャのディレクトリを設定
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// 下書きファイルの保存先を設定
        #[arg(long)]
        set_store_dir: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 修理可否の指定
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepairabilityArg {
    /// 部品待ち
    Waiting,
    /// 修理開始
    Starting,
    /// 未選択に戻す
    Unset,
}

impl RepairabilityArg {
    pub fn to_status(self) -> Option<Repairability> {
        match self {
            RepairabilityArg::Waiting => Some(Repairability::WaitingForParts),
            RepairabilityArg::Starting => Some(Repairability::StartingRepair),
            RepairabilityArg::Unset => None,
        }
    }
}

impl std::str::FromStr for RepairabilityArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "waiting" | "wait" | "true" => Ok(RepairabilityArg::Waiting),
            "starting" | "start" | "false" => Ok(RepairabilityArg::Starting),
            "unset" | "none" => Ok(RepairabilityArg::Unset),
            _ => Err(format!(
                "Unknown repairability: {}. Use waiting, starting, or unset",
                s
            )),
        }
    }
}

impl std::fmt::Display for RepairabilityArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepairabilityArg::Waiting => write!(f, "waiting"),
            RepairabilityArg::Starting => write!(f, "starting"),
            RepairabilityArg::Unset => write!(f, "unset"),
        }
    }
}
