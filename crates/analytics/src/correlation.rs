use crate::error::AnalyticsError;
use crate::series::ReturnSeries;
use crate::stats::pearson;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Pairwise Pearson correlations of several return series.
///
/// Entries are `None` where the correlation is undefined: fewer than two
/// common observations, or a series with no variance over them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
    /// Number of dates shared by every series.
    pub observations: usize,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Looks up the correlation between two labels.
    ///
    /// The outer `None` means a label is unknown; the inner one means the
    /// correlation is undefined.
    pub fn get(&self, a: &str, b: &str) -> Option<Option<f64>> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        Some(self.values[i][j])
    }

    /// A copy with every defined entry rounded to `decimals` places.
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        Self {
            labels: self.labels.clone(),
            values: self
                .values
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|v| v.map(|v| (v * factor).round() / factor))
                        .collect()
                })
                .collect(),
            observations: self.observations,
        }
    }
}

/// Correlates every pair of `named` return series over the dates they all share.
///
/// Labels keep the order given. The diagonal is 1.0 wherever the series has
/// variance over the common dates.
pub fn correlation_matrix(
    named: &[(&str, &ReturnSeries)],
) -> Result<CorrelationMatrix, AnalyticsError> {
    let mut seen = HashSet::new();
    for (label, _) in named {
        if !seen.insert(*label) {
            return Err(AnalyticsError::InvalidParameter(format!(
                "duplicate correlation label '{}'",
                label
            )));
        }
    }

    let columns = align_on_common_dates(named.iter().map(|(_, s)| *s));
    let observations = columns.first().map_or(0, Vec::len);
    let n = named.len();

    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = pearson(&columns[i], &columns[i]).map(|_| 1.0);
        for j in (i + 1)..n {
            let rho = pearson(&columns[i], &columns[j]);
            values[i][j] = rho;
            values[j][i] = rho;
        }
    }

    Ok(CorrelationMatrix {
        labels: named.iter().map(|(l, _)| l.to_string()).collect(),
        values,
        observations,
    })
}

/// Inner-joins the series on date and returns one value column per series.
///
/// No interpolation: only dates present in every series survive.
fn align_on_common_dates<'a>(series: impl Iterator<Item = &'a ReturnSeries>) -> Vec<Vec<f64>> {
    let by_date: Vec<(&str, HashMap<NaiveDate, f64>)> = series
        .map(|s| {
            (
                s.symbol.as_str(),
                s.observations.iter().map(|o| (o.date, o.value)).collect(),
            )
        })
        .collect();

    let mut common: BTreeSet<NaiveDate> = match by_date.first() {
        Some((_, first)) => first.keys().copied().collect(),
        None => return Vec::new(),
    };
    for (_, dates) in &by_date[1..] {
        common.retain(|d| dates.contains_key(d));
    }

    for (symbol, dates) in &by_date {
        let discarded = dates.len() - common.len();
        if discarded > 0 {
            tracing::debug!(symbol, discarded, "Dates dropped by correlation alignment");
        }
    }
    if common.is_empty() && !by_date.is_empty() {
        tracing::warn!("Return series share no dates; correlations are undefined");
    }

    by_date
        .iter()
        .map(|(_, dates)| common.iter().map(|d| dates[d]).collect())
        .collect()
}
