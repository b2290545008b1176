use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// 五個排行榜；宣告順序即抓取與輸出順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Total,
}

impl RankType {
    pub const ALL: [RankType; 5] = [
        RankType::Daily,
        RankType::Weekly,
        RankType::Monthly,
        RankType::Yearly,
        RankType::Total,
    ];

    /// Upstream `rankType` query value.
    pub fn api_code(self) -> &'static str {
        match self {
            RankType::Daily => "10005",
            RankType::Weekly => "10000",
            RankType::Monthly => "10001",
            RankType::Yearly => "10003",
            RankType::Total => "10004",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RankType::Daily => "日榜",
            RankType::Weekly => "周榜",
            RankType::Monthly => "月榜",
            RankType::Yearly => "年榜",
            RankType::Total => "总榜",
        }
    }

    /// Lower wins when a portfolio appears on several boards.
    pub fn priority(self) -> u8 {
        match self {
            RankType::Total => 1,
            RankType::Yearly => 2,
            RankType::Monthly => 3,
            RankType::Weekly => 4,
            RankType::Daily => 5,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            RankType::Daily => "daily",
            RankType::Weekly => "weekly",
            RankType::Monthly => "monthly",
            RankType::Yearly => "yearly",
            RankType::Total => "total",
        }
    }
}

impl fmt::Display for RankType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One leaderboard row: the upstream fields plus the rank we assign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub rank: usize,
    pub rank_type: RankType,
    pub rank_name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RankEntry {
    /// Wraps a raw upstream item; non-object items are rejected.
    pub fn from_raw(raw: Value, rank: usize, rank_type: RankType) -> Option<Self> {
        let Value::Object(mut fields) = raw else {
            return None;
        };
        for reserved in ["rank", "rank_type", "rank_name"] {
            fields.remove(reserved);
        }
        Some(Self {
            rank,
            rank_type,
            rank_name: rank_type.label().to_string(),
            fields,
        })
    }

    pub fn field_str(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .and_then(value_to_string)
            .filter(|s| !s.is_empty())
    }

    pub fn portfolio_id(&self) -> Option<String> {
        self.field_str("zjzh")
    }

    pub fn portfolio_name(&self) -> Option<String> {
        self.field_str("zhuheName")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankBoard {
    pub data: Vec<RankEntry>,
}

pub type RankBoards = BTreeMap<RankType, Vec<RankEntry>>;

/// 快取中的排行榜快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankSnapshot {
    pub timestamp: String,
    pub date: String,
    pub update_time: String,
    pub total_records: usize,
    pub data: BTreeMap<RankType, RankBoard>,
}

impl RankSnapshot {
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }

    pub fn entries(&self) -> impl Iterator<Item = &RankEntry> {
        self.data.values().flat_map(|board| board.data.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    #[serde(rename = "买入")]
    Buy,
    #[serde(rename = "卖出")]
    Sell,
}

impl TradeAction {
    /// `cwhj_mr` 有值代表買入，否則看 `cwhj_mc` 是否為賣出；`-` 表示無
    pub fn parse(buy_ratio: &str, sell_ratio: &str) -> Option<Self> {
        let present = |s: &str| !s.is_empty() && s != "-";
        if present(buy_ratio) {
            Some(TradeAction::Buy)
        } else if present(sell_ratio) {
            Some(TradeAction::Sell)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TradeAction::Buy => "买入",
            TradeAction::Sell => "卖出",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(rename = "日期")]
    pub date: String,
    #[serde(rename = "组合ID")]
    pub portfolio_id: String,
    #[serde(rename = "组合名称")]
    pub portfolio_name: String,
    #[serde(rename = "调仓股票")]
    pub stock_code: String,
    #[serde(rename = "股票名称")]
    pub stock_name: String,
    #[serde(rename = "调仓情况")]
    pub action: TradeAction,
    #[serde(rename = "成交价格")]
    pub price: String,
    #[serde(rename = "持仓比例")]
    pub position_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTag {
    #[serde(rename = "type")]
    pub rank_type: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboInfo {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub ranks: Vec<RankTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    #[serde(rename = "股票代码")]
    pub stock_code: String,
    #[serde(rename = "股票名称")]
    pub stock_name: String,
    #[serde(rename = "买入组合")]
    pub buy_combos: Vec<ComboInfo>,
    #[serde(rename = "卖出组合")]
    pub sell_combos: Vec<ComboInfo>,
    #[serde(rename = "买入组合数")]
    pub buy_count: usize,
    #[serde(rename = "卖出组合数")]
    pub sell_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "股票代码")]
    pub stock_code: String,
    #[serde(rename = "股票名称")]
    pub stock_name: String,
    #[serde(rename = "成本价")]
    pub cost_price: String,
    #[serde(rename = "现价")]
    pub current_price: String,
    #[serde(rename = "盈亏比")]
    pub profit_rate: String,
    #[serde(rename = "仓位")]
    pub position_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDetail {
    #[serde(rename = "组合ID")]
    pub portfolio_id: String,
    #[serde(rename = "组合名称")]
    pub name: String,
    #[serde(rename = "管理人")]
    pub manager: String,
    #[serde(rename = "总收益率")]
    pub total_return: String,
    #[serde(rename = "今日收益率")]
    pub daily_return: String,
    #[serde(rename = "持仓信息")]
    pub positions: Vec<Position>,
}

/// Upstream fields arrive as either strings or numbers.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
