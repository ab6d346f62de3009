// ==========================================
// 需求预测系统 - 内置线性趋势 Oracle
// ==========================================
// 算法: 最小二乘拟合 (日序号, 销量),外推日频预测
// 定位: 缺省实现与测试基准;生产算法由外部 Oracle 替换
// ==========================================

use crate::domain::sales::TimeSeries;
use crate::oracle::{FittedModel, ForecastOracle, OracleError};
use chrono::{Duration, NaiveDate};

// ==========================================
// LinearTrendOracle
// ==========================================
pub struct LinearTrendOracle;

impl LinearTrendOracle {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinearTrendOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastOracle for LinearTrendOracle {
    fn fit(&self, series: &TimeSeries) -> Result<Box<dyn FittedModel>, OracleError> {
        if series.len() < 2 {
            return Err(OracleError::Fit(format!(
                "序列点数不足: {} (至少需要 2)",
                series.len()
            )));
        }

        let origin = series.points[0].0;
        let xs: Vec<f64> = series
            .points
            .iter()
            .map(|(d, _)| (*d - origin).num_days() as f64)
            .collect();
        let ys: Vec<f64> = series.points.iter().map(|(_, q)| *q).collect();

        let n = xs.len() as f64;
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        if sxx == 0.0 {
            // 所有点同一天,无法确定趋势
            return Err(OracleError::Fit("时间维度零方差".to_string()));
        }
        let sxy: f64 = xs
            .iter()
            .zip(ys.iter())
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let last_period = series
            .last_period()
            .ok_or_else(|| OracleError::Fit("空序列".to_string()))?;

        Ok(Box::new(LinearTrendModel {
            origin,
            last_period,
            slope,
            intercept,
        }))
    }
}

// ==========================================
// LinearTrendModel - 已拟合的线性趋势模型
// ==========================================
struct LinearTrendModel {
    origin: NaiveDate,      // 拟合序列首期 (x=0)
    last_period: NaiveDate, // 拟合序列末期,预测自其后一天开始
    slope: f64,
    intercept: f64,
}

impl FittedModel for LinearTrendModel {
    fn predict(&self, horizon_days: usize) -> Result<Vec<(NaiveDate, f64)>, OracleError> {
        if horizon_days == 0 {
            return Err(OracleError::Predict("horizon 为 0".to_string()));
        }

        let mut points = Vec::with_capacity(horizon_days);
        for offset in 1..=horizon_days {
            let date = self.last_period + Duration::days(offset as i64);
            let x = (date - self.origin).num_days() as f64;
            points.push((date, self.intercept + self.slope * x));
        }
        Ok(points)
    }
}
