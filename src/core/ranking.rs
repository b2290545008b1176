use crate::domain::model::{RankBoard, RankBoards, RankEntry, RankSnapshot, RankTag, RankType};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const LATEST_KEY: &str = "latest_rank_data";
pub const DAILY_KEY_PREFIX: &str = "rank_data_";

/// Keeps each portfolio only on its highest-priority board (總榜 > 年榜 > 月榜 > 周榜 > 日榜).
///
/// Rows without a portfolio id are dropped. Every input board stays present in
/// the output, possibly empty, and is re-ranked from 1 in its previous order.
pub fn deduplicate(boards: RankBoards) -> RankBoards {
    let mut winners: HashMap<String, (u8, RankType)> = HashMap::new();
    for (rank_type, entries) in &boards {
        for entry in entries {
            let Some(id) = entry.portfolio_id() else {
                continue;
            };
            let priority = rank_type.priority();
            match winners.get(&id) {
                Some((best, _)) if *best <= priority => {}
                _ => {
                    winners.insert(id, (priority, *rank_type));
                }
            }
        }
    }

    let mut claimed: HashSet<String> = HashSet::new();
    let mut deduplicated: RankBoards = BTreeMap::new();
    for (rank_type, entries) in boards {
        let mut kept: Vec<RankEntry> = Vec::new();
        for entry in entries {
            let Some(id) = entry.portfolio_id() else {
                continue;
            };
            let wins_here = winners.get(&id).is_some_and(|(_, t)| *t == rank_type);
            // 同一榜內重複的組合只保留第一筆
            if wins_here && claimed.insert(id) {
                kept.push(entry);
            }
        }
        kept.sort_by_key(|entry| entry.rank);
        for (index, entry) in kept.iter_mut().enumerate() {
            entry.rank = index + 1;
        }
        deduplicated.insert(rank_type, kept);
    }
    deduplicated
}

pub fn build_snapshot(boards: RankBoards, now: NaiveDateTime) -> RankSnapshot {
    let total_records = boards.values().map(Vec::len).sum();
    RankSnapshot {
        timestamp: now.format("%Y%m%d_%H%M%S").to_string(),
        date: now.format("%Y-%m-%d").to_string(),
        update_time: now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        total_records,
        data: boards
            .into_iter()
            .map(|(rank_type, data)| (rank_type, RankBoard { data }))
            .collect(),
    }
}

pub fn daily_key(date: NaiveDate) -> String {
    format!("{}{}", DAILY_KEY_PREFIX, date.format("%Y%m%d"))
}

/// Whether a `rank_data_*` key is past retention.
///
/// `rank_data_YYYYMMDD` covers the whole day, so it expires `expire_hours`
/// after that day ends. The older `rank_data_YYYYMMDD_HHMMSS` form expires
/// `expire_hours` after its timestamp. Unrecognised keys never expire.
pub fn is_expired_daily_key(key: &str, now: NaiveDateTime, expire_hours: i64) -> bool {
    let Some(stamp) = key.strip_prefix(DAILY_KEY_PREFIX) else {
        return false;
    };
    let threshold = now - Duration::hours(expire_hours);

    let covered_until = match stamp.len() {
        8 => NaiveDate::parse_from_str(stamp, "%Y%m%d")
            .ok()
            .and_then(|d| d.succ_opt())
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
        15 => NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S").ok(),
        _ => None,
    };
    covered_until.is_some_and(|until| until < threshold)
}

/// Portfolio id → compact rank tags (`日榜3`, `总榜12`, ...) by board position.
pub fn portfolio_rank_tags(snapshot: &RankSnapshot) -> HashMap<String, Vec<RankTag>> {
    let mut tags: HashMap<String, Vec<RankTag>> = HashMap::new();
    for (rank_type, board) in &snapshot.data {
        for (index, entry) in board.data.iter().enumerate() {
            let (Some(id), Some(_)) = (entry.portfolio_id(), entry.portfolio_name()) else {
                continue;
            };
            tags.entry(id).or_default().push(RankTag {
                rank_type: rank_type.label().to_string(),
                text: format!("{}{}", rank_type.label(), index + 1),
            });
        }
    }
    tags
}

/// 最新排行榜摘要：每榜筆數與前三名
pub fn summary_report(snapshot: &RankSnapshot) -> String {
    let mut lines = vec![
        "=== 最新排行榜数据摘要 ===".to_string(),
        format!("更新时间: {}", snapshot.update_time),
        format!("总记录数: {}条", snapshot.total_records),
    ];

    for (rank_type, board) in &snapshot.data {
        lines.push(format!("  {}: {}条", rank_type.label(), board.data.len()));
        if board.data.is_empty() {
            continue;
        }
        lines.push("    前3名:".to_string());
        for (index, entry) in board.data.iter().take(3).enumerate() {
            lines.push(format!(
                "      {}. {} ({}: {}%)",
                index + 1,
                entry.portfolio_name().unwrap_or_else(|| "Unknown".to_string()),
                entry.field_str("rateTitle").unwrap_or_default(),
                entry.field_str("rateForApp").unwrap_or_else(|| "N/A".to_string()),
            ));
        }
    }
    lines.push("=".repeat(40));
    lines.join("\n")
}
