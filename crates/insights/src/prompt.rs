//! Executive-summary prompt.

use campaign_core::inputs::CampaignInputs;

/// Format a number the way a form field would show it: no trailing `.0`.
fn plain(value: f64) -> String {
    format!("{value}")
}

fn or_any(value: Option<u32>) -> String {
    value.map_or_else(|| "Any".to_string(), |v| v.to_string())
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

/// One line per selected channel listing the constraints set on it.
pub fn channel_constraints(inputs: &CampaignInputs) -> String {
    inputs
        .channel_selection
        .iter()
        .map(|name| {
            let config = inputs.settings_for(name);
            let mut details = format!(
                "Always include: {}, Freq Capping: {}",
                config.always_include, config.frequency_capping
            );
            if let Some(v) = config.effective_fixed_budget() {
                details.push_str(&format!(", Fixed budget: €{}", plain(v)));
            }
            if let Some(v) = config.effective_cpm() {
                details.push_str(&format!(", CPM: €{}", plain(v)));
            }
            if let Some(v) = config.effective_tv_factor() {
                details.push_str(&format!(", TV Factor: {}", plain(v)));
            }
            if let Some(v) = config.effective_scale_factor() {
                details.push_str(&format!(", Scale Factor: {}", plain(v)));
            }
            format!("{name} ({details})")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the prompt sent to the text service.
pub fn build_prompt(inputs: &CampaignInputs) -> String {
    format!(
        "Based on the following marketing campaign parameters, provide a professional executive summary of the best outcome and strategy:
Customer: {customer}
Campaign: {campaign}
Total Budget: €{budget}
Goal: {goal}
Target Reach: {reach}
Channels with constraints: {channels}
Demographics: {age_min}-{age_max} years, Gender: {gender}
Location: {country}
Duration: {weeks} weeks

The optimization engine must respect the fixed budgets, CPMs, TV factors, Scale Factors, and per-channel Frequency Capping settings provided.
Include a brief breakdown of the best channel combinations and why this strategy will succeed.
Keep it concise but data-driven.",
        customer = or_na(&inputs.customer_name),
        campaign = or_na(&inputs.campaign_name),
        budget = plain(inputs.budget_or_zero()),
        goal = inputs.goal_type,
        reach = plain(inputs.reach_or_zero()),
        channels = channel_constraints(inputs),
        age_min = or_any(inputs.age_min),
        age_max = or_any(inputs.age_max),
        gender = inputs.gender,
        country = inputs.country,
        weeks = inputs.campaign_duration,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::inputs::ChannelConfigPatch;
    use chrono::NaiveDate;

    fn inputs() -> CampaignInputs {
        let mut inputs = CampaignInputs::defaults_on(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        inputs.total_budget = Some(25_000.0);
        inputs.target_reach = Some(400_000.0);
        inputs.campaign_name = "Spring Launch".into();
        inputs.age_min = Some(25);
        inputs.set_selection(vec!["Facebook".into(), "Local Radio".into()]);
        inputs
    }

    #[test]
    fn test_prompt_fields() {
        let prompt = build_prompt(&inputs());
        assert!(prompt.contains("Customer: N/A"));
        assert!(prompt.contains("Campaign: Spring Launch"));
        assert!(prompt.contains("Total Budget: €25000\n"));
        assert!(prompt.contains("Goal: Budget"));
        assert!(prompt.contains("Target Reach: 400000\n"));
        assert!(prompt.contains("Demographics: 25-Any years, Gender: All"));
        assert!(prompt.contains("Location: NL"));
        assert!(prompt.contains("Duration: 1 weeks"));
    }

    #[test]
    fn test_channel_constraints_skip_unset_values() {
        let mut inputs = inputs();
        inputs.update_channel_settings(
            "Facebook",
            &ChannelConfigPatch {
                fixed_budget: Some(Some(1500.0)),
                scale_factor: Some(Some(1.25)),
                always_include: Some(true),
                ..Default::default()
            },
        );
        let text = channel_constraints(&inputs);
        assert_eq!(
            text,
            "Facebook (Always include: true, Freq Capping: false, Fixed budget: €1500, \
             CPM: €2.85, TV Factor: 7, Scale Factor: 1.25), \
             Local Radio (Always include: false, Freq Capping: false, TV Factor: 1)"
        );
    }
}
