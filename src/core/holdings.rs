use crate::domain::model::{
    value_to_string, ComboInfo, RankTag, StockSummary, TradeAction, TradeRecord,
};
use serde_json::Value;
use std::collections::HashMap;

/// A ranked portfolio whose position changes are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioRef {
    pub id: String,
    pub name: String,
}

fn field(record: &Value, key: &str) -> Option<String> {
    record.get(key).and_then(value_to_string)
}

/// Converts one portfolio's raw position changes into trade records, keeping
/// only those dated on one of `target_dates`.
pub fn parse_hold_changes(
    portfolio: &PortfolioRef,
    changes: &[Value],
    target_dates: &[String],
) -> Vec<TradeRecord> {
    changes
        .iter()
        .filter_map(|change| {
            let date = field(change, "tzrq").unwrap_or_default();
            if !target_dates.contains(&date) {
                return None;
            }

            let buy_ratio = field(change, "cwhj_mr").unwrap_or_else(|| "-".to_string());
            let sell_ratio = field(change, "cwhj_mc").unwrap_or_else(|| "-".to_string());
            let action = TradeAction::parse(&buy_ratio, &sell_ratio)?;

            let (price_key, position_ratio) = match action {
                TradeAction::Buy => ("cjjg_mr", buy_ratio),
                TradeAction::Sell => ("cjjg_mc", sell_ratio),
            };

            Some(TradeRecord {
                date,
                portfolio_id: portfolio.id.clone(),
                portfolio_name: portfolio.name.clone(),
                stock_code: field(change, "stkMktCode").unwrap_or_default(),
                stock_name: field(change, "stkName").unwrap_or_default(),
                action,
                price: field(change, price_key).unwrap_or_else(|| "-".to_string()),
                position_ratio,
            })
        })
        .collect()
}

/// Groups trade records per stock, in first-seen order, then sorts by the
/// number of buying portfolios (descending, stable).
///
/// A portfolio is listed at most once per stock and side.
pub fn summarize_by_stock(
    records: &[TradeRecord],
    rank_tags: &HashMap<String, Vec<RankTag>>,
) -> Vec<StockSummary> {
    let mut summaries: Vec<StockSummary> = Vec::new();
    let mut index_by_stock: HashMap<(String, String), usize> = HashMap::new();

    for record in records {
        let stock_key = (record.stock_code.clone(), record.stock_name.clone());
        let index = *index_by_stock.entry(stock_key).or_insert_with(|| {
            summaries.push(StockSummary {
                stock_code: record.stock_code.clone(),
                stock_name: record.stock_name.clone(),
                buy_combos: Vec::new(),
                sell_combos: Vec::new(),
                buy_count: 0,
                sell_count: 0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[index];
        let combos = match record.action {
            TradeAction::Buy => &mut summary.buy_combos,
            TradeAction::Sell => &mut summary.sell_combos,
        };
        if combos.iter().any(|c| c.id == record.portfolio_id) {
            continue;
        }
        combos.push(ComboInfo {
            id: record.portfolio_id.clone(),
            name: record.portfolio_name.clone(),
            display_name: record.portfolio_name.clone(),
            ranks: rank_tags
                .get(&record.portfolio_id)
                .cloned()
                .unwrap_or_default(),
        });
    }

    for summary in &mut summaries {
        summary.buy_count = summary.buy_combos.len();
        summary.sell_count = summary.sell_combos.len();
    }
    summaries.sort_by(|a, b| b.buy_count.cmp(&a.buy_count));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn portfolio(id: &str, name: &str) -> PortfolioRef {
        PortfolioRef {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn record(portfolio_id: &str, code: &str, action: TradeAction) -> TradeRecord {
        TradeRecord {
            date: "20240115".to_string(),
            portfolio_id: portfolio_id.to_string(),
            portfolio_name: format!("组合{}", portfolio_id),
            stock_code: code.to_string(),
            stock_name: format!("股票{}", code),
            action,
            price: "10.00".to_string(),
            position_ratio: "1成".to_string(),
        }
    }

    #[test]
    fn test_parse_hold_changes_filters_dates_and_actions() {
        let changes = vec![
            json!({"tzrq": "20240115", "stkMktCode": "600519", "stkName": "贵州茅台",
                   "cwhj_mr": "2成", "cwhj_mc": "-", "cjjg_mr": "1700.00", "cjjg_mc": "-"}),
            json!({"tzrq": "20240115", "stkMktCode": "000001", "stkName": "平安银行",
                   "cwhj_mr": "-", "cwhj_mc": "1.5成", "cjjg_mc": 9.87}),
            json!({"tzrq": "20240115", "stkMktCode": "000002", "cwhj_mr": "-", "cwhj_mc": "-"}),
            json!({"tzrq": "20240112", "stkMktCode": "300750", "cwhj_mr": "1成"}),
        ];
        let dates = vec!["20240115".to_string()];

        let records = parse_hold_changes(&portfolio("1", "稳健"), &changes, &dates);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].action, TradeAction::Buy);
        assert_eq!(records[0].price, "1700.00");
        assert_eq!(records[0].position_ratio, "2成");
        assert_eq!(records[0].portfolio_name, "稳健");

        assert_eq!(records[1].action, TradeAction::Sell);
        assert_eq!(records[1].price, "9.87");
        assert_eq!(records[1].position_ratio, "1.5成");
    }

    #[test]
    fn test_missing_price_defaults_to_dash() {
        let changes = vec![json!({"tzrq": "20240115", "stkMktCode": "1", "cwhj_mr": "1成"})];
        let records =
            parse_hold_changes(&portfolio("1", "a"), &changes, &["20240115".to_string()]);
        assert_eq!(records[0].price, "-");
        assert_eq!(records[0].stock_name, "");
    }

    #[test]
    fn test_summarize_groups_and_sorts_by_buy_count() {
        let records = vec![
            record("1", "600000", TradeAction::Sell),
            record("1", "600519", TradeAction::Buy),
            record("2", "600519", TradeAction::Buy),
            record("2", "600519", TradeAction::Buy),
            record("3", "600519", TradeAction::Sell),
        ];
        let mut tags = HashMap::new();
        tags.insert(
            "2".to_string(),
            vec![RankTag {
                rank_type: "日榜".to_string(),
                text: "日榜3".to_string(),
            }],
        );

        let summary = summarize_by_stock(&records, &tags);
        assert_eq!(summary.len(), 2);

        let first = &summary[0];
        assert_eq!(first.stock_code, "600519");
        assert_eq!(first.buy_count, 2);
        assert_eq!(first.sell_count, 1);
        assert_eq!(first.buy_combos[1].ranks[0].text, "日榜3");
        assert!(first.buy_combos[0].ranks.is_empty());

        assert_eq!(summary[1].stock_code, "600000");
        assert_eq!(summary[1].buy_count, 0);
        assert_eq!(summary[1].sell_count, 1);
    }

    #[test]
    fn test_summary_serializes_wire_keys() {
        let summary = summarize_by_stock(&[record("9", "600519", TradeAction::Buy)], &HashMap::new());
        let value = serde_json::to_value(&summary[0]).unwrap();
        assert_eq!(value["股票代码"], "600519");
        assert_eq!(value["买入组合数"], 1);
        assert_eq!(value["买入组合"][0]["display_name"], "组合9");
    }
}
