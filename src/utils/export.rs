use crate::domain::model::{StockSummary, TradeRecord};
use crate::utils::error::Result;
use std::path::Path;

/// Writes trade records with their Chinese column headers.
pub fn write_trade_records_csv<P: AsRef<Path>>(path: P, records: &[TradeRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per stock; combos are joined into `名称(id)` lists.
pub fn write_stock_summary_csv<P: AsRef<Path>>(path: P, summary: &[StockSummary]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "股票代码",
        "股票名称",
        "买入组合数",
        "卖出组合数",
        "买入组合",
        "卖出组合",
    ])?;

    for stock in summary {
        let join = |combos: &[crate::domain::model::ComboInfo]| {
            combos
                .iter()
                .map(|c| format!("{}({})", c.display_name, c.id))
                .collect::<Vec<_>>()
                .join("; ")
        };
        writer.write_record([
            stock.stock_code.clone(),
            stock.stock_name.clone(),
            stock.buy_count.to_string(),
            stock.sell_count.to_string(),
            join(&stock.buy_combos),
            join(&stock.sell_combos),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
