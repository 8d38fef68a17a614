//! Six-sheet campaign workbook built from the inputs and result of one run.

use campaign_core::inputs::CampaignInputs;
use campaign_core::types::{OptimizationResult, Strategy};
use campaign_core::{CampaignError, CampaignResult};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

pub const SHEET_INPUTS: &str = "Campaign Inputs";
pub const SHEET_KPI: &str = "KPI Forecast";
pub const SHEET_SCENARIOS: &str = "Optimization Scenarios";
pub const SHEET_EFFICIENCY: &str = "Reach Efficiency";
pub const SHEET_DEMOGRAPHICS: &str = "Age Demographics";
pub const SHEET_OVERLAP: &str = "Overlap Analysis";

// ─── Sheets ─────────────────────────────────────────────────────────────────

/// One tabular sheet: a header row plus value rows of the same width.
#[derive(Debug, Clone, Serialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Sheet {
    fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn to_csv(&self) -> String {
        let mut csv = self
            .columns
            .iter()
            .map(|c| csv_cell(&Value::String(c.clone())))
            .collect::<Vec<_>>()
            .join(",");
        csv.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(csv_cell).collect();
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }
        csv
    }
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::String(s) if s.contains([',', '"', '\n']) => {
            format!("\"{}\"", s.replace('"', "\"\""))
        }
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn opt_number<T: Serialize>(value: Option<T>) -> Value {
    value.map_or(Value::Null, |v| json!(v))
}

// ─── Workbook ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CampaignWorkbook {
    pub sheets: Vec<Sheet>,
}

impl CampaignWorkbook {
    pub fn build(inputs: &CampaignInputs, result: &OptimizationResult) -> Self {
        Self {
            sheets: vec![
                inputs_sheet(inputs),
                kpi_sheet(result),
                scenarios_sheet(result),
                efficiency_sheet(result),
                demographics_sheet(result),
                overlap_sheet(result),
            ],
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_csv(&self, name: &str) -> Option<String> {
        self.sheet(name).map(Sheet::to_csv)
    }

    fn render(&self) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            for (col, title) in sheet.columns.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, title, &header)?;
            }
            for (r, row) in sheet.rows.iter().enumerate() {
                let r = r as u32 + 1;
                for (col, value) in row.iter().enumerate() {
                    let col = col as u16;
                    match value {
                        Value::Number(n) => {
                            worksheet.write_number(r, col, n.as_f64().unwrap_or_default())?;
                        }
                        Value::String(s) => {
                            worksheet.write_string(r, col, s)?;
                        }
                        Value::Bool(b) => {
                            worksheet.write_boolean(r, col, *b)?;
                        }
                        Value::Null => {}
                        other => {
                            worksheet.write_string(r, col, other.to_string())?;
                        }
                    }
                }
            }
        }
        Ok(workbook)
    }

    pub fn to_xlsx(&self) -> CampaignResult<Vec<u8>> {
        let bytes = self
            .render()
            .and_then(|mut wb| wb.save_to_buffer())
            .map_err(|e| CampaignError::Export(e.to_string()))?;
        metrics::counter!("reporting.exports").increment(1);
        info!(sheets = self.sheets.len(), bytes = bytes.len(), "Workbook rendered");
        Ok(bytes)
    }

    pub fn save_xlsx(&self, path: &Path) -> CampaignResult<()> {
        let bytes = self.to_xlsx()?;
        std::fs::write(path, bytes)?;
        info!(path = %path.display(), "Workbook saved");
        Ok(())
    }
}

/// `{prefix}_{customer or "Campaign"}_{YYYY-MM-DD}.xlsx`. Characters that
/// are not valid in file names, and control characters, are replaced with `_`.
pub fn export_filename(prefix: &str, customer: &str, date: NaiveDate) -> String {
    let customer = customer.trim();
    let customer = if customer.is_empty() { "Campaign" } else { customer };
    let customer: String = customer
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{prefix}_{customer}_{}.xlsx", date.format("%Y-%m-%d"))
}

// ─── Sheet builders ─────────────────────────────────────────────────────────

fn inputs_sheet(inputs: &CampaignInputs) -> Sheet {
    let mut sheet = Sheet::new(SHEET_INPUTS, &["Parameter", "Value"]);
    let rows: [(&str, Value); 15] = [
        ("Customer Name", json!(inputs.customer_name)),
        ("Campaign Name", json!(inputs.campaign_name)),
        ("Total Budget", opt_number(inputs.total_budget)),
        ("Goal Type", json!(inputs.goal_type.to_string())),
        ("Start Date", json!(inputs.campaign_start_date.to_string())),
        ("End Date", json!(inputs.campaign_end_date.to_string())),
        ("Duration (Weeks)", json!(inputs.campaign_duration)),
        ("Country", json!(inputs.country.to_string())),
        ("Min Age", opt_number(inputs.age_min)),
        ("Max Age", opt_number(inputs.age_max)),
        ("Gender", json!(inputs.gender.to_string())),
        ("Min Contact Frequency", json!(inputs.minimal_contact_frequency)),
        ("Max Channels", json!(inputs.max_channels)),
        ("Target Reach", opt_number(inputs.target_reach)),
        ("Selected Channels", json!(inputs.channel_selection.join(", "))),
    ];
    for (parameter, value) in rows {
        sheet.push(vec![json!(parameter), value]);
    }
    sheet
}

fn kpi_sheet(result: &OptimizationResult) -> Sheet {
    let mut sheet = Sheet::new(
        SHEET_KPI,
        &[
            "run_id",
            "customer_name",
            "campaign_name",
            "goal_type",
            "run_ts",
            "channel",
            "media_budget",
            "budget_share_pct",
            "cpm",
            "tv_factor",
            "tv_reach_num",
            "tv_reach_pct",
            "digital_impressions",
            "digital_reach_num",
            "digital_reach_pct",
            "contact_freq",
            "budget",
            "reach",
            "roi",
        ],
    );
    for c in &result.channels {
        sheet.push(vec![
            json!(c.run_id.to_string()),
            json!(c.customer_name),
            json!(c.campaign_name),
            json!(c.goal_type.to_string()),
            json!(c.run_ts),
            json!(c.channel),
            json!(c.media_budget),
            json!(c.budget_share_pct),
            json!(c.cpm),
            json!(c.tv_factor),
            json!(c.tv_reach_num),
            json!(c.tv_reach_pct),
            json!(c.digital_impressions),
            json!(c.digital_reach_num),
            json!(c.digital_reach_pct),
            json!(c.contact_freq),
            json!(c.budget),
            json!(c.reach),
            json!(c.roi),
        ]);
    }
    sheet
}

fn scenarios_sheet(result: &OptimizationResult) -> Sheet {
    let mut columns = vec!["step", "budget"];
    columns.extend(Strategy::ALL.iter().map(Strategy::label));
    let mut sheet = Sheet::new(SHEET_SCENARIOS, &columns);
    for point in &result.candidate_comparison {
        let mut row = vec![json!(point.step), json!(point.budget)];
        row.extend(Strategy::ALL.iter().map(|s| json!(point.reach_for(*s))));
        sheet.push(row);
    }
    sheet
}

/// One row per curve point, channels in selection order.
fn efficiency_sheet(result: &OptimizationResult) -> Sheet {
    let mut sheet = Sheet::new(SHEET_EFFICIENCY, &["Channel", "Budget", "Reach"]);
    for (channel, points) in &result.channel_curves {
        for p in points {
            sheet.push(vec![json!(channel), json!(p.budget), json!(p.reach)]);
        }
    }
    sheet
}

fn demographics_sheet(result: &OptimizationResult) -> Sheet {
    let mut sheet = Sheet::new(
        SHEET_DEMOGRAPHICS,
        &["bucket", "reach", "budget", "totalUsers"],
    );
    for a in &result.age_demographics {
        sheet.push(vec![
            json!(a.bucket),
            json!(a.reach),
            json!(a.budget),
            json!(a.total_users),
        ]);
    }
    sheet
}

fn overlap_sheet(result: &OptimizationResult) -> Sheet {
    let mut sheet = Sheet::new(
        SHEET_OVERLAP,
        &["step", "budget", "grossReach", "netReach", "overlap"],
    );
    for p in &result.overlap_data {
        sheet.push(vec![
            json!(p.step),
            json!(p.budget),
            json!(p.gross_reach),
            json!(p.net_reach),
            json!(p.overlap),
        ]);
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::inputs::GoalType;
    use campaign_core::types::{
        AgeBucketData, CandidatePoint, ChannelData, CurvePoint, OverlapPoint,
    };
    use indexmap::IndexMap;
    use uuid::Uuid;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 20).unwrap()
    }

    fn inputs() -> CampaignInputs {
        let mut inputs = CampaignInputs::defaults_on(day());
        inputs.customer_name = "BENU".into();
        inputs.campaign_name = "Spring, \"fresh\" start".into();
        inputs.total_budget = Some(10_000.0);
        inputs.target_reach = Some(100_000.0);
        inputs.set_selection(vec!["Facebook".into(), "Twitch".into()]);
        inputs
    }

    fn channel_row(channel: &str) -> ChannelData {
        ChannelData {
            run_id: Uuid::nil(),
            customer_name: "BENU".into(),
            campaign_name: "Spring".into(),
            goal_type: GoalType::Budget,
            run_ts: "2026-04-20 09:00:00.000 UTC".into(),
            channel: channel.into(),
            media_budget: 5_000.0,
            budget_share_pct: 50.0,
            cpm: 7.5,
            tv_factor: 1.0,
            tv_reach_num: 0,
            tv_reach_pct: 0.0,
            digital_impressions: 500_000.0,
            digital_reach_num: 30_000,
            digital_reach_pct: 0.6,
            contact_freq: 3.0,
            budget: 5_000.0,
            reach: 30_000,
            roi: 3.2,
        }
    }

    fn result() -> OptimizationResult {
        let mut curves = IndexMap::new();
        for name in ["Facebook", "Twitch"] {
            curves.insert(
                name.to_string(),
                (1..=10)
                    .map(|i| CurvePoint {
                        budget: 1_000.0 * i as f64,
                        reach: 5_000 * i,
                    })
                    .collect(),
            );
        }
        OptimizationResult {
            summary: "ok".into(),
            run_id: Uuid::nil(),
            run_ts: "2026-04-20 09:00:00.000 UTC".into(),
            channels: vec![channel_row("Facebook"), channel_row("Twitch")],
            reach_over_time: Vec::new(),
            candidate_comparison: (1..=10)
                .map(|step| CandidatePoint {
                    step,
                    budget: 1_000.0 * f64::from(step),
                    strategy_a: 100,
                    strategy_b: 110,
                    strategy_c: 90,
                })
                .collect(),
            channel_curves: curves,
            age_demographics: vec![AgeBucketData {
                bucket: "15-19".into(),
                reach: 9_000,
                budget: 800,
                total_users: 450_000,
            }],
            overlap_data: vec![OverlapPoint {
                step: 10,
                budget: 10_000.0,
                gross_reach: 100_000,
                net_reach: 85_000,
                overlap: 15_000,
            }],
            user_activity: Vec::new(),
            intersections: Vec::new(),
            total_projected_reach: 105_000,
            users_lost_to_overlap: 12_000,
            target_population: 5_000_000,
            total_media_budget: 10_000.0,
        }
    }

    #[test]
    fn test_sheet_order_and_sizes() {
        let wb = CampaignWorkbook::build(&inputs(), &result());
        let names: Vec<&str> = wb.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                SHEET_INPUTS,
                SHEET_KPI,
                SHEET_SCENARIOS,
                SHEET_EFFICIENCY,
                SHEET_DEMOGRAPHICS,
                SHEET_OVERLAP
            ]
        );
        assert_eq!(wb.sheet(SHEET_INPUTS).unwrap().rows.len(), 15);
        assert_eq!(wb.sheet(SHEET_KPI).unwrap().rows.len(), 2);
        assert_eq!(wb.sheet(SHEET_SCENARIOS).unwrap().rows.len(), 10);
        // 2 channels x 10 points, flattened.
        assert_eq!(wb.sheet(SHEET_EFFICIENCY).unwrap().rows.len(), 20);
        for sheet in &wb.sheets {
            assert!(sheet.rows.iter().all(|r| r.len() == sheet.columns.len()));
        }
    }

    #[test]
    fn test_inputs_sheet_values() {
        let wb = CampaignWorkbook::build(&inputs(), &result());
        let sheet = wb.sheet(SHEET_INPUTS).unwrap();
        assert_eq!(sheet.rows[0], vec![json!("Customer Name"), json!("BENU")]);
        assert_eq!(sheet.rows[2][1], json!(10_000.0));
        assert_eq!(sheet.rows[4][1], json!("2026-04-20"));
        assert_eq!(sheet.rows[8][1], Value::Null);
        assert_eq!(sheet.rows[14][1], json!("Facebook, Twitch"));
    }

    #[test]
    fn test_scenario_headers_use_strategy_labels() {
        let wb = CampaignWorkbook::build(&inputs(), &result());
        let sheet = wb.sheet(SHEET_SCENARIOS).unwrap();
        assert_eq!(sheet.columns[2], "Strategy A (Default)");
        assert_eq!(sheet.columns[4], "Strategy C (Cost Efficient)");
        assert_eq!(sheet.rows[0][3], json!(110));
    }

    #[test]
    fn test_csv_quoting() {
        let wb = CampaignWorkbook::build(&inputs(), &result());
        let csv = wb.sheet_csv(SHEET_INPUTS).unwrap();
        assert!(csv.starts_with("Parameter,Value\n"));
        assert!(csv.contains("Campaign Name,\"Spring, \"\"fresh\"\" start\""));
        assert!(csv.contains("Min Age,\n"));
        assert_eq!(csv.lines().count(), 16);

        let overlap = wb.sheet_csv(SHEET_OVERLAP).unwrap();
        assert_eq!(
            overlap,
            "step,budget,grossReach,netReach,overlap\n10,10000.0,100000,85000,15000\n"
        );
        assert!(wb.sheet_csv("Missing").is_none());
    }

    #[test]
    fn test_xlsx_bytes_are_a_zip() {
        let wb = CampaignWorkbook::build(&inputs(), &result());
        let bytes = wb.to_xlsx().unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("Advantiv_Export", "Blink", day()),
            "Advantiv_Export_Blink_2026-04-20.xlsx"
        );
        assert_eq!(
            export_filename("Advantiv_Export", "  ", day()),
            "Advantiv_Export_Campaign_2026-04-20.xlsx"
        );
        assert_eq!(
            export_filename("Plan", "A/B \"Test\"", day()),
            "Plan_A_B _Test__2026-04-20.xlsx"
        );
        assert_eq!(
            export_filename("Plan", "Acme\r\nSet-Cookie: x\t", day()),
            "Plan_Acme__Set-Cookie_ x_2026-04-20.xlsx"
        );
    }
}
