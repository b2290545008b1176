use crate::domain::model::{value_to_string, PortfolioDetail, Position};
use serde_json::Value;

fn text(object: &Value, key: &str) -> String {
    object.get(key).and_then(value_to_string).unwrap_or_default()
}

/// Missing or empty fields read as 0; anything else must parse as a number.
fn number(object: &Value, key: &str) -> Option<f64> {
    match object.get(key) {
        None | Some(Value::Null) => Some(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => Some(0.0),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    }
}

fn parse_position(raw: &Value) -> Option<Position> {
    let cost = number(raw, "cbj")?;
    let current = number(raw, "__zxjg")?;
    let weight = number(raw, "positionRateDetail")?;
    let profit = number(raw, "webYkRate")?;

    Some(Position {
        stock_code: text(raw, "__code"),
        stock_name: text(raw, "__name"),
        cost_price: format!("{:.3}", cost),
        current_price: format!("{:.3}", current),
        profit_rate: format!("{:.2}%", profit),
        position_rate: format!("{:.1}%", weight),
    })
}

/// Builds the holdings view from the `data` object of a detail response.
///
/// Positions with unparseable numbers are skipped.
pub fn parse_portfolio_detail(portfolio_id: &str, data: &Value) -> PortfolioDetail {
    let detail = data.get("detail").cloned().unwrap_or(Value::Null);
    let positions = data
        .get("position")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|raw| {
                    let position = parse_position(raw);
                    if position.is_none() {
                        tracing::warn!("⚠️ Skipping malformed position in {}: {}", portfolio_id, raw);
                    }
                    position
                })
                .collect()
        })
        .unwrap_or_default();

    PortfolioDetail {
        portfolio_id: portfolio_id.to_string(),
        name: text(&detail, "zuheName"),
        manager: text(&detail, "uidNick"),
        total_return: text(&detail, "rate"),
        daily_return: text(&detail, "rateDay"),
        positions,
    }
}
