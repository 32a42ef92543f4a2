//! Per-classification statistics over a merged table.

use crate::domain::classify::SentimentClass;
use crate::domain::merge::MergedRecord;
use crate::domain::trade::Side;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSummary {
    pub class: SentimentClass,
    pub trades: usize,
    pub buys: usize,
    pub sells: usize,
    /// Rows with a non-null closed PnL.
    pub pnl_count: usize,
    pub total_pnl: f64,
    pub mean_pnl: Option<f64>,
    /// Share of PnL-bearing rows with PnL > 0.
    pub win_rate: Option<f64>,
    pub mean_leverage: Option<f64>,
}

/// Pearson coefficients over rows where PnL, leverage and score are all present.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    pub rows: usize,
    pub pnl_leverage: Option<f64>,
    pub pnl_sentiment: Option<f64>,
    pub leverage_sentiment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rows: usize,
    pub accounts: usize,
    pub dominant: Option<SentimentClass>,
    pub classes: Vec<ClassSummary>,
    pub correlation: Correlation,
}

pub fn summarize(records: &[MergedRecord]) -> Summary {
    let classes: Vec<ClassSummary> = SentimentClass::ALL
        .iter()
        .filter_map(|class| summarize_class(*class, records))
        .collect();

    let mut dominant: Option<&ClassSummary> = None;
    for cs in &classes {
        if dominant.is_none_or(|d| cs.trades > d.trades) {
            dominant = Some(cs);
        }
    }

    let accounts: BTreeSet<&str> = records.iter().map(|r| r.trade.account.as_str()).collect();

    Summary {
        rows: records.len(),
        accounts: accounts.len(),
        dominant: dominant.map(|d| d.class),
        correlation: correlate(records),
        classes,
    }
}

fn summarize_class(class: SentimentClass, records: &[MergedRecord]) -> Option<ClassSummary> {
    let rows: Vec<&MergedRecord> = records.iter().filter(|r| r.classification == class).collect();
    if rows.is_empty() {
        return None;
    }

    let buys = rows.iter().filter(|r| r.trade.side == Side::Buy).count();
    let pnls: Vec<f64> = rows.iter().filter_map(|r| r.trade.closed_pnl).collect();
    let total_pnl: f64 = pnls.iter().sum();
    let wins = pnls.iter().filter(|p| **p > 0.0).count();
    let leverages: Vec<f64> = rows.iter().map(|r| r.trade.leverage).collect();

    Some(ClassSummary {
        class,
        trades: rows.len(),
        buys,
        sells: rows.len() - buys,
        pnl_count: pnls.len(),
        total_pnl,
        mean_pnl: mean(&pnls),
        win_rate: if pnls.is_empty() {
            None
        } else {
            Some(wins as f64 / pnls.len() as f64)
        },
        mean_leverage: mean(&leverages),
    })
}

fn correlate(records: &[MergedRecord]) -> Correlation {
    let complete: Vec<(f64, f64, f64)> = records
        .iter()
        .filter_map(|r| {
            let pnl = r.trade.closed_pnl?;
            let score = r.sentiment_score?;
            Some((pnl, r.trade.leverage, score))
        })
        .collect();

    let pnl: Vec<f64> = complete.iter().map(|c| c.0).collect();
    let lev: Vec<f64> = complete.iter().map(|c| c.1).collect();
    let score: Vec<f64> = complete.iter().map(|c| c.2).collect();

    Correlation {
        rows: complete.len(),
        pnl_leverage: pearson(&pnl, &lev),
        pnl_sentiment: pearson(&pnl, &score),
        leverage_sentiment: pearson(&lev, &score),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// `None` with fewer than two points or when either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::TradeRecord;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn row(
        account: &str,
        side: Side,
        pnl: Option<f64>,
        size: f64,
        score: Option<f64>,
        class: SentimentClass,
    ) -> MergedRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        MergedRecord {
            trade: TradeRecord::new(1, account.into(), "BTC".into(), 100.0, size, side, ts, pnl)
                .unwrap(),
            sentiment_score: score,
            label: None,
            classification: class,
        }
    }

    #[test]
    fn pearson_perfect_correlation() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert_relative_eq!(r, 1.0, epsilon = 1e-12);
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert_relative_eq!(r, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn pearson_degenerate_inputs() {
        assert!(pearson(&[1.0], &[1.0]).is_none());
        assert!(pearson(&[1.0, 1.0], &[2.0, 3.0]).is_none());
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn groups_rows_by_class() {
        let rows = vec![
            row("a", Side::Buy, Some(10.0), 100.0, Some(20.0), SentimentClass::Fear),
            row("a", Side::Sell, Some(-5.0), 300.0, Some(25.0), SentimentClass::Fear),
            row("b", Side::Buy, None, 200.0, Some(70.0), SentimentClass::Greed),
        ];
        let s = summarize(&rows);

        assert_eq!(s.rows, 3);
        assert_eq!(s.accounts, 2);
        assert_eq!(s.dominant, Some(SentimentClass::Fear));
        assert_eq!(s.classes.len(), 2);

        let fear = &s.classes[0];
        assert_eq!(fear.class, SentimentClass::Fear);
        assert_eq!((fear.trades, fear.buys, fear.sells), (2, 1, 1));
        assert_relative_eq!(fear.total_pnl, 5.0);
        assert_relative_eq!(fear.mean_pnl.unwrap(), 2.5);
        assert_relative_eq!(fear.win_rate.unwrap(), 0.5);
        assert_relative_eq!(fear.mean_leverage.unwrap(), 2.0);

        let greed = &s.classes[1];
        assert_eq!(greed.pnl_count, 0);
        assert_eq!(greed.mean_pnl, None);
        assert_eq!(greed.win_rate, None);
    }

    #[test]
    fn dominant_tie_goes_to_lower_class() {
        let rows = vec![
            row("a", Side::Buy, None, 100.0, Some(70.0), SentimentClass::Greed),
            row("a", Side::Buy, None, 100.0, Some(50.0), SentimentClass::Neutral),
        ];
        assert_eq!(summarize(&rows).dominant, Some(SentimentClass::Neutral));
    }

    #[test]
    fn correlation_skips_incomplete_rows() {
        let rows = vec![
            row("a", Side::Buy, Some(1.0), 100.0, Some(10.0), SentimentClass::Fear),
            row("a", Side::Buy, Some(2.0), 200.0, Some(20.0), SentimentClass::Fear),
            row("a", Side::Buy, Some(3.0), 300.0, Some(30.0), SentimentClass::Fear),
            row("a", Side::Buy, None, 900.0, Some(90.0), SentimentClass::Greed),
            row("a", Side::Buy, Some(9.0), 900.0, None, SentimentClass::Unknown),
        ];
        let c = summarize(&rows).correlation;
        assert_eq!(c.rows, 3);
        assert_relative_eq!(c.pnl_leverage.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.leverage_sentiment.unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_table() {
        let s = summarize(&[]);
        assert_eq!(s.rows, 0);
        assert_eq!(s.dominant, None);
        assert!(s.classes.is_empty());
        assert_eq!(s.correlation.rows, 0);
        assert_eq!(s.correlation.pnl_leverage, None);
    }
}
