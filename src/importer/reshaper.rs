// ==========================================
// 需求预测系统 - 销售历史重塑器
// ==========================================
// 职责: 宽表 (每月一列) / 长表 → 扁平 SalesRecord 序列
// 红线: 期间列标签非法 = 结构性错误,在逐行处理前拒绝整批
// 策略: 料号/销量缺失静默丢弃 (数据清洗,非错误),计数可审计
// ==========================================

use crate::config::PlannerConfig;
use crate::domain::sales::SalesRecord;
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

// 标识列别名 (源表列名不统一,与字段映射器同策略)
const PART_NO_ALIASES: &[&str] = &["Part Number", "PN", "part_no"];
const REGION_ALIASES: &[&str] = &["Geo Region", "Region", "region"];
const DATE_ALIASES: &[&str] = &["Date", "Month", "period"];
const QUANTITY_ALIASES: &[&str] = &["Sales Qty", "Quantity", "quantity"];

// ==========================================
// RejectedCell - 被拒绝的单元格
// ==========================================
// 行级输入错误: 该单元格不进入结果,批次继续
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCell {
    pub row: usize,       // 行号 (1 起,表头之后)
    pub column: String,   // 列名
    pub message: String,  // 拒绝原因
}

// ==========================================
// ReshapeReport - 重塑结果报告
// ==========================================
// 所有清洗/拒绝决定对调用方可见
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReshapeReport {
    pub records: Vec<SalesRecord>,     // 重塑后的销售记录
    pub dropped_rows: usize,           // 料号缺失而丢弃的行数
    pub dropped_cells: usize,          // 销量缺失而丢弃的单元格数
    pub ignored_columns: Vec<String>,  // 不匹配期间模式而忽略的列
    pub rejected: Vec<RejectedCell>,   // 行级拒绝明细
}

// ==========================================
// Reshaper - 重塑器 (纯变换,无副作用)
// ==========================================
pub struct Reshaper {
    default_region: String,
}

impl Reshaper {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            default_region: config.default_region.clone(),
        }
    }

    // ==========================================
    // 宽表重塑 (melt)
    // ==========================================

    /// 宽表 → 扁平销售记录
    ///
    /// # 规则
    /// - 以 4 位数字开头后接 '-' 的列视为期间列候选
    /// - 候选列必须解析为 YYYY-MM 或 YYYY-MM-DD,否则整批拒绝
    /// - 非候选且非标识列: 忽略 (记入报告)
    /// - 料号缺失: 整行丢弃;销量单元格为空或 "NaN": 丢弃该单元格
    /// - 销量不可解析、非有限或为负: 该单元格进入 rejected,批次继续
    pub fn reshape_wide(
        &self,
        rows: &[HashMap<String, String>],
    ) -> ImportResult<ReshapeReport> {
        if rows.is_empty() {
            return Err(ImportError::EmptyTable("销售历史宽表".to_string()));
        }

        // 汇总全部列名 (行与行之间列集合可能不一致)
        let mut all_columns: BTreeSet<String> = BTreeSet::new();
        for row in rows {
            for key in row.keys() {
                all_columns.insert(key.clone());
            }
        }

        // 结构性校验: 期间列分类在任何逐行处理之前完成
        let mut period_columns: Vec<(String, NaiveDate)> = Vec::new();
        let mut ignored_columns: Vec<String> = Vec::new();
        for column in &all_columns {
            if is_identity_column(column) {
                continue;
            }
            if is_period_label_candidate(column) {
                match parse_period_label(column) {
                    Some(period) => period_columns.push((column.clone(), period)),
                    None => {
                        return Err(ImportError::PeriodLabelError {
                            label: column.clone(),
                        })
                    }
                }
            } else {
                ignored_columns.push(column.clone());
            }
        }
        period_columns.sort_by_key(|(_, period)| *period);

        if !ignored_columns.is_empty() {
            debug!(columns = ?ignored_columns, "忽略非期间列");
        }

        let mut report = ReshapeReport {
            ignored_columns,
            ..Default::default()
        };

        // 逐行展开
        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;

            let part_no = match get_by_aliases(row, PART_NO_ALIASES) {
                Some(v) => v,
                None => {
                    // 料号缺失: 数据清洗策略,静默丢弃整行
                    report.dropped_rows += 1;
                    continue;
                }
            };
            let region = get_by_aliases(row, REGION_ALIASES)
                .unwrap_or_else(|| self.default_region.clone());

            for (column, period) in &period_columns {
                let raw = match row.get(column).map(|v| v.trim()) {
                    Some(v) if !v.is_empty() && !is_missing_marker(v) => v,
                    // 销量缺失 (空白或 NaN 标记): 静默丢弃该单元格
                    _ => {
                        report.dropped_cells += 1;
                        continue;
                    }
                };

                match parse_quantity(raw) {
                    Ok(quantity) => report.records.push(SalesRecord {
                        part_no: part_no.clone(),
                        region: region.clone(),
                        period: *period,
                        quantity,
                    }),
                    Err(message) => report.rejected.push(RejectedCell {
                        row: row_number,
                        column: column.clone(),
                        message,
                    }),
                }
            }
        }

        if !report.rejected.is_empty() {
            warn!(rejected = report.rejected.len(), "存在被拒绝的销量单元格");
        }
        debug!(
            records = report.records.len(),
            dropped_rows = report.dropped_rows,
            dropped_cells = report.dropped_cells,
            "宽表重塑完成"
        );

        Ok(report)
    }

    // ==========================================
    // 长表重塑
    // ==========================================

    /// 长表 (Date / PN / Sales Qty [/ Region]) → 扁平销售记录
    ///
    /// # 规则
    /// - 料号列与日期列是必需标识列,缺失则整批拒绝
    /// - 日期单元格解析失败: 该行进入 rejected,批次继续
    pub fn reshape_long(
        &self,
        rows: &[HashMap<String, String>],
    ) -> ImportResult<ReshapeReport> {
        if rows.is_empty() {
            return Err(ImportError::EmptyTable("销售历史长表".to_string()));
        }

        // 结构性校验: 必需列存在于表头
        let header_has = |aliases: &[&str]| {
            rows.iter()
                .any(|row| aliases.iter().any(|a| row.contains_key(*a)))
        };
        if !header_has(PART_NO_ALIASES) {
            return Err(ImportError::MissingIdentityColumn(
                "part_no".to_string(),
                PART_NO_ALIASES.join("/"),
            ));
        }
        if !header_has(DATE_ALIASES) {
            return Err(ImportError::MissingIdentityColumn(
                "period".to_string(),
                DATE_ALIASES.join("/"),
            ));
        }
        if !header_has(QUANTITY_ALIASES) {
            return Err(ImportError::MissingIdentityColumn(
                "quantity".to_string(),
                QUANTITY_ALIASES.join("/"),
            ));
        }

        let mut report = ReshapeReport::default();

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;

            let part_no = match get_by_aliases(row, PART_NO_ALIASES) {
                Some(v) => v,
                None => {
                    report.dropped_rows += 1;
                    continue;
                }
            };
            let region = get_by_aliases(row, REGION_ALIASES)
                .unwrap_or_else(|| self.default_region.clone());

            let raw_date = match get_by_aliases(row, DATE_ALIASES) {
                Some(v) => v,
                None => {
                    report.dropped_rows += 1;
                    continue;
                }
            };
            let period = match parse_period_label(&raw_date) {
                Some(d) => d,
                None => {
                    report.rejected.push(RejectedCell {
                        row: row_number,
                        column: "Date".to_string(),
                        message: format!("日期格式错误: {}", raw_date),
                    });
                    continue;
                }
            };

            let raw_qty = match get_by_aliases(row, QUANTITY_ALIASES) {
                Some(v) if !is_missing_marker(&v) => v,
                // 销量缺失 (空白或 NaN 标记): 静默丢弃
                _ => {
                    report.dropped_cells += 1;
                    continue;
                }
            };
            match parse_quantity(&raw_qty) {
                Ok(quantity) => report.records.push(SalesRecord {
                    part_no,
                    region,
                    period,
                    quantity,
                }),
                Err(message) => report.rejected.push(RejectedCell {
                    row: row_number,
                    column: "Sales Qty".to_string(),
                    message,
                }),
            }
        }

        debug!(
            records = report.records.len(),
            dropped_rows = report.dropped_rows,
            "长表重塑完成"
        );

        Ok(report)
    }
}

// ==========================================
// 解析辅助函数
// ==========================================

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

/// 标识列判定 (宽表中不参与 melt 的列)
fn is_identity_column(column: &str) -> bool {
    PART_NO_ALIASES.contains(&column) || REGION_ALIASES.contains(&column)
}

/// 期间列候选判定: 4 位数字开头,后接 '-'
fn is_period_label_candidate(column: &str) -> bool {
    let bytes = column.as_bytes();
    bytes.len() >= 5
        && bytes[..4].iter().all(|b| b.is_ascii_digit())
        && bytes[4] == b'-'
}

/// 解析期间标签: YYYY-MM (归一化到当月1日) 或 YYYY-MM-DD
fn parse_period_label(label: &str) -> Option<NaiveDate> {
    let trimmed = label.trim();
    if trimmed.len() == 7 {
        return NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d").ok();
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// 缺失值标记判定
///
/// 上游以 DataFrame 落盘的表格对缺失单元格写出 "NaN",
/// 按缺失处理而不是数值
fn is_missing_marker(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("nan")
}

/// 解析销量: 必须为非负的有限数值
///
/// f64::parse 本身接受 "inf"/"NaN" 等拼写,而 NaN 会使
/// 负值检查与下游求和/风险比较全部静默失真,必须在此拦截
fn parse_quantity(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("无法解析为数值: {}", raw))?;
    if !value.is_finite() {
        return Err(format!("销量非有限数值: {}", raw));
    }
    if value < 0.0 {
        return Err(format!("销量为负: {}", value));
    }
    Ok(value)
}
