use anyhow::Result;

use crate::optimizer::OptimizationResult;
use crate::schedule::Pause;
use crate::types::Game;

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// One row per selected package.
pub fn result_to_csv(result: &OptimizationResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "package_id",
        "package",
        "games",
        "weight_sum",
        "billing",
        "active_months",
        "cost",
    ])?;
    for selected in &result.selected_packages {
        writer.write_record([
            selected.package.id.to_string(),
            selected.package.name.clone(),
            selected.covered_games.len().to_string(),
            format!("{:.4}", selected.weight_sum),
            selected
                .billing_type
                .map(|billing| billing.to_string())
                .unwrap_or_default(),
            selected
                .active_months
                .as_ref()
                .map(|months| months.iter().cloned().collect::<Vec<_>>().join(" "))
                .unwrap_or_default(),
            selected.cost.to_string(),
        ])?;
    }
    finish(writer)
}

pub fn games_to_csv(games: &[Game]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "game_id",
        "starts_at",
        "home",
        "away",
        "tournament",
        "base_weight",
        "phase_multiplier",
        "importance_multiplier",
        "total_weight",
    ])?;
    for game in games {
        writer.write_record([
            game.id.to_string(),
            game.starts_at.to_rfc3339(),
            game.home.clone(),
            game.away.clone(),
            game.tournament.clone(),
            format!("{:.4}", game.base_weight),
            format!("{:.4}", game.phase_multiplier),
            format!("{:.4}", game.importance_multiplier),
            format!("{:.4}", game.total_weight()),
        ])?;
    }
    finish(writer)
}

pub fn pauses_to_csv(pauses: &[Pause]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["tournament", "start", "end", "days"])?;
    for pause in pauses {
        writer.write_record([
            pause.tournament.clone(),
            pause.start.to_rfc3339(),
            pause.end.to_rfc3339(),
            pause.days().to_string(),
        ])?;
    }
    finish(writer)
}
