// ==========================================
// 需求预测系统 - 快照映射器
// ==========================================
// 职责: 库存/欠交/外部标记表 → 按料号键控的快照
// 约束: 每个料号至多一条;重复时后行覆盖前行并告警
// 策略: 数值字段缺失按 0 处理 (连接缺失不是错误)
// ==========================================

use crate::domain::inventory::{BackorderSnapshot, InventorySnapshot};
use crate::importer::error::{ImportError, ImportResult};
use std::collections::{HashMap, HashSet};
use tracing::warn;

// 快照表列名别名
const PART_NO_ALIASES: &[&str] = &["Part Number", "PN", "part_no"];
const ON_HAND_ALIASES: &[&str] = &["On Hand", "on_hand", "OH Qty"];
const IN_TRANSIT_ALIASES: &[&str] = &["In Transit", "in_transit", "IT Qty"];
const BACKORDER_ALIASES: &[&str] = &["Backorder Qty", "backorder_qty", "BO Qty"];

// ==========================================
// SnapshotMapper - 快照映射器
// ==========================================
pub struct SnapshotMapper;

impl SnapshotMapper {
    pub fn new() -> Self {
        Self
    }

    /// 库存快照表 → 按料号的库存快照
    ///
    /// 数值缺失按 0;料号重复时后行覆盖并告警
    pub fn map_inventory(
        &self,
        rows: &[HashMap<String, String>],
    ) -> ImportResult<HashMap<String, InventorySnapshot>> {
        let mut snapshots: HashMap<String, InventorySnapshot> = HashMap::new();

        for (idx, row) in rows.iter().enumerate() {
            let part_no = match get_by_aliases(row, PART_NO_ALIASES) {
                Some(v) => v,
                None => continue, // 无料号的行无法键控,丢弃
            };
            let on_hand = parse_numeric_or_zero(row, ON_HAND_ALIASES, idx + 1, "on_hand")?;
            let in_transit =
                parse_numeric_or_zero(row, IN_TRANSIT_ALIASES, idx + 1, "in_transit")?;

            if snapshots.contains_key(&part_no) {
                warn!(part_no = %part_no, row = idx + 1, "库存快照料号重复,后行覆盖前行");
            }
            snapshots.insert(
                part_no.clone(),
                InventorySnapshot {
                    part_no,
                    on_hand,
                    in_transit,
                },
            );
        }

        Ok(snapshots)
    }

    /// 欠交快照表 → 按料号的欠交快照
    pub fn map_backorders(
        &self,
        rows: &[HashMap<String, String>],
    ) -> ImportResult<HashMap<String, BackorderSnapshot>> {
        let mut snapshots: HashMap<String, BackorderSnapshot> = HashMap::new();

        for (idx, row) in rows.iter().enumerate() {
            let part_no = match get_by_aliases(row, PART_NO_ALIASES) {
                Some(v) => v,
                None => continue,
            };
            let backorder_qty =
                parse_numeric_or_zero(row, BACKORDER_ALIASES, idx + 1, "backorder_qty")?;

            if snapshots.contains_key(&part_no) {
                warn!(part_no = %part_no, row = idx + 1, "欠交快照料号重复,后行覆盖前行");
            }
            snapshots.insert(
                part_no.clone(),
                BackorderSnapshot {
                    part_no,
                    backorder_qty,
                },
            );
        }

        Ok(snapshots)
    }

    /// 外部已标记过剩表 → 料号集合
    pub fn map_flagged(&self, rows: &[HashMap<String, String>]) -> HashSet<String> {
        rows.iter()
            .filter_map(|row| get_by_aliases(row, PART_NO_ALIASES))
            .collect()
    }
}

impl Default for SnapshotMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// 按别名列表提取非空字符串字段
fn get_by_aliases(row: &HashMap<String, String>, aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        if let Some(v) = row.get(*alias) {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// 解析数值字段,缺失按 0,不可解析为结构性错误
///
/// "NaN" 是上游 DataFrame 的缺失标记,按缺失处理;
/// 其余非有限数值 (如 "inf") 会污染风险公式,必须拒绝
fn parse_numeric_or_zero(
    row: &HashMap<String, String>,
    aliases: &[&str],
    row_number: usize,
    field: &str,
) -> ImportResult<f64> {
    let raw = match get_by_aliases(row, aliases) {
        None => return Ok(0.0),
        Some(raw) if raw.eq_ignore_ascii_case("nan") => return Ok(0.0),
        Some(raw) => raw,
    };
    let value: f64 = raw.parse().map_err(|_| {
        ImportError::CsvParseError(format!(
            "行 {} 字段 {} 无法解析为数值: {}",
            row_number, field, raw
        ))
    })?;
    if !value.is_finite() {
        return Err(ImportError::CsvParseError(format!(
            "行 {} 字段 {} 非有限数值: {}",
            row_number, field, raw
        )));
    }
    Ok(value)
}
