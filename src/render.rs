use analytics::Recovery;
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use configuration::OutputFormat;
use crash_report::CrashReport;

/// Renders a report in the requested format.
pub fn render(report: &CrashReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_tables(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn render_tables(report: &CrashReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== {} crash: {} to {} ===\n\n",
        report.year, report.window.start, report.window.end
    ));
    out.push_str(&format!("{}\n\n", summary_table(report)));
    out.push_str(&format!(
        "{} month-end closes\n{}\n\n",
        report.index.name,
        index_table(report)
    ));
    out.push_str(&format!("Sector performance (rebased to 1.0)\n{}\n\n", sector_table(report)));
    out.push_str(&format!(
        "{} rolling volatility ({}-day)\n{}\n",
        report.index.name,
        report.volatility.window,
        volatility_table(report)
    ));
    if let Some((date, peak)) = report.volatility.peak() {
        out.push_str(&format!("Peak volatility: {:.2}% on {}\n", peak * 100.0, date));
    }
    out.push('\n');
    out.push_str(&format!(
        "Return correlation over {} common dates\n{}\n",
        report.correlation.observations,
        correlation_heatmap(report)
    ));
    out
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn summary_table(report: &CrashReport) -> Table {
    let dd = &report.drawdown;
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Max drawdown".to_string(), format!("{:.2}%", dd.as_pct())]);
    table.add_row(vec![
        "Peak".to_string(),
        format!("{:.2} on {}", dd.peak_price, dd.peak_date),
    ]);
    table.add_row(vec!["Trough".to_string(), dd.trough_date.to_string()]);
    table.add_row(vec!["Recovery".to_string(), recovery_label(&report.recovery)]);
    table
}

fn recovery_label(recovery: &Recovery) -> String {
    match recovery {
        Recovery::Recovered {
            days, recovery_date, ..
        } => format!("{} days (on {})", days, recovery_date),
        Recovery::Unrecovered { .. } => "Not recovered".to_string(),
    }
}

fn index_table(report: &CrashReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Month", "Close", "Drawdown"]);
    let rows: Vec<_> = report
        .index_series
        .iter()
        .zip(&report.drawdown_curve.observations)
        .collect();
    for (point, dd) in month_ends(&rows, |(p, _)| p.date) {
        table.add_row(vec![
            Cell::new(point.date.format("%Y-%m")),
            Cell::new(format!("{:.2}", point.price)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}%", dd.value * 100.0)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn sector_table(report: &CrashReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Sector", "Symbol", "Low", "End", "Return"]);
    for sector in &report.sectors {
        let values: Vec<f64> = sector.normalized.values().collect();
        let low = values.iter().copied().fold(f64::INFINITY, f64::min);
        let end = values.last().copied().unwrap_or(1.0);
        table.add_row(vec![
            Cell::new(&sector.instrument.name),
            Cell::new(&sector.instrument.symbol),
            Cell::new(format!("{:.3}", low)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", end)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:+.2}%", (end - 1.0) * 100.0)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn volatility_table(report: &CrashReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Month", "Daily std"]);
    for point in month_ends(&report.volatility.points, |p| p.date) {
        table.add_row(vec![
            Cell::new(point.date.format("%Y-%m")),
            Cell::new(percent_or_na(point.value)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn correlation_heatmap(report: &CrashReport) -> Table {
    let matrix = report.correlation.rounded(2);
    let mut table = new_table();
    let mut header = vec![Cell::new("")];
    header.extend(matrix.labels.iter().map(Cell::new));
    table.set_header(header);

    for (label, row) in matrix.labels.iter().zip(&matrix.values) {
        let mut cells = vec![Cell::new(label)];
        cells.extend(row.iter().map(|value| {
            let cell = Cell::new(correlation_label(*value)).set_alignment(CellAlignment::Center);
            match value {
                Some(rho) => cell.bg(heat_color(*rho)).fg(Color::Black),
                None => cell,
            }
        }));
        table.add_row(cells);
    }
    table
}

/// Keeps the last item of every calendar month, in order.
fn month_ends<T>(items: &[T], date: impl Fn(&T) -> NaiveDate) -> Vec<&T> {
    let mut out: Vec<&T> = Vec::new();
    for item in items {
        if let Some(last) = out.last_mut() {
            if same_month(date(*last), date(item)) {
                *last = item;
                continue;
            }
        }
        out.push(item);
    }
    out
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn correlation_label(value: Option<f64>) -> String {
    match value {
        Some(rho) => format!("{:.2}", rho),
        None => "n/a".to_string(),
    }
}

fn percent_or_na(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

/// Diverging blue-white-red scale over `[-1, 1]`.
fn heat_color(rho: f64) -> Color {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const HOT: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = rho.clamp(-1.0, 1.0);
    let (from, to, w) = if t < 0.0 {
        (NEUTRAL, COLD, -t)
    } else {
        (NEUTRAL, HOT, t)
    };
    let mix = |a: f64, b: f64| (a + (b - a) * w).round() as u8;
    Color::Rgb {
        r: mix(from.0, to.0),
        g: mix(from.1, to.1),
        b: mix(from.2, to.2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_ends_keep_last_trading_day() {
        let dates = vec![
            date(2020, 1, 30),
            date(2020, 1, 31),
            date(2020, 2, 3),
            date(2020, 2, 28),
            date(2021, 2, 1),
        ];
        let ends: Vec<NaiveDate> = month_ends(&dates, |d| *d).into_iter().copied().collect();
        assert_eq!(ends, vec![date(2020, 1, 31), date(2020, 2, 28), date(2021, 2, 1)]);
    }

    #[test]
    fn month_ends_of_nothing() {
        let dates: Vec<NaiveDate> = Vec::new();
        assert!(month_ends(&dates, |d| *d).is_empty());
    }

    #[test]
    fn heat_scale_endpoints() {
        assert_eq!(heat_color(0.0), Color::Rgb { r: 221, g: 221, b: 221 });
        assert_eq!(heat_color(1.0), Color::Rgb { r: 180, g: 4, b: 38 });
        assert_eq!(heat_color(-1.0), Color::Rgb { r: 59, g: 76, b: 192 });
        assert_eq!(heat_color(7.0), heat_color(1.0));
    }

    #[test]
    fn undefined_values_print_as_na() {
        assert_eq!(correlation_label(None), "n/a");
        assert_eq!(correlation_label(Some(0.456)), "0.46");
        assert_eq!(percent_or_na(None), "n/a");
        assert_eq!(percent_or_na(Some(0.0123)), "1.23%");
    }

    #[test]
    fn recovery_labels() {
        let unrecovered = Recovery::Unrecovered {
            trough_date: date(2022, 10, 12),
        };
        assert_eq!(recovery_label(&unrecovered), "Not recovered");

        let same_day = Recovery::Recovered {
            days: 0,
            trough_date: date(2020, 3, 23),
            recovery_date: date(2020, 3, 23),
        };
        assert_eq!(recovery_label(&same_day), "0 days (on 2020-03-23)");
    }
}
