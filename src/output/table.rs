use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::analysis::{AnalysisReport, WindowPlan};
use crate::optimizer::OptimizationResult;
use crate::output::{format_percent, format_price};
use crate::schedule::Pause;
use crate::types::Game;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_result_table(result: &OptimizationResult) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Package",
        "Games",
        "Weight",
        "Billing",
        "Months",
        "Cost",
    ]);

    for selected in &result.selected_packages {
        let months = selected
            .active_months
            .as_ref()
            .map(|months| months.iter().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_else(|| "12 (yearly)".to_string());
        table.add_row(Row::from(vec![
            Cell::new(&selected.package.name),
            Cell::new(selected.covered_games.len()),
            Cell::new(format!("{:.2}", selected.weight_sum)),
            Cell::new(
                selected
                    .billing_type
                    .map(|billing| billing.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(months),
            Cell::new(format_price(selected.cost)),
        ]));
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\nStrategy: {}\nTotal cost: {}\nCoverage: {} of games, {} weighted",
        result.strategy,
        format_price(result.total_cost),
        format_percent(result.coverage_ratio),
        format_percent(result.weighted_coverage),
    ));
    if let Some(stats) = &result.stats {
        out.push_str(&format!(
            "\nSearch: {} iterations, {} accepted, {} improvements, {} ms ({:?})",
            stats.iterations, stats.accepted, stats.improvements, stats.elapsed_ms, stats.stop_reason
        ));
    }
    if !result.uncovered_games.is_empty() {
        let mut uncovered = new_table();
        uncovered.set_header(vec![Cell::new("Uncovered game").fg(Color::Yellow), Cell::new("Kickoff")]);
        for game in &result.uncovered_games {
            uncovered.add_row(vec![
                format!("{} vs {} ({})", game.home, game.away, game.tournament),
                game.starts_at.format(DATE_FORMAT).to_string(),
            ]);
        }
        out.push('\n');
        out.push_str(&uncovered.to_string());
    }
    out
}

pub fn render_pauses_table(pauses: &[Pause]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Tournament", "From", "To", "Days"]);
    for pause in pauses {
        table.add_row(vec![
            pause.tournament.clone(),
            pause.start.format(DATE_FORMAT).to_string(),
            pause.end.format(DATE_FORMAT).to_string(),
            pause.days().to_string(),
        ]);
    }
    table.to_string()
}

pub fn render_window_plan(plan: &WindowPlan) -> String {
    let mut out = format!(
        "Main league: {}\nWindow: {} .. {}\n",
        plan.main_league.as_deref().unwrap_or("-"),
        plan.window.start.format(DATE_FORMAT),
        plan.window.end.format(DATE_FORMAT),
    );
    out.push_str(&render_pauses_table(&plan.window.pauses));
    out
}

pub fn render_weights_table(games: &[Game]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Kickoff",
        "Match",
        "Tournament",
        "Base",
        "Phase",
        "Importance",
        "Total",
    ]);
    for game in games {
        table.add_row(vec![
            game.starts_at.format(DATE_FORMAT).to_string(),
            format!("{} vs {}", game.home, game.away),
            game.tournament.clone(),
            format!("{:.2}", game.base_weight),
            format!("{:.2}", game.phase_multiplier),
            format!("{:.2}", game.importance_multiplier),
            format!("{:.3}", game.total_weight()),
        ]);
    }
    table.to_string()
}

pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = format!(
        "Main league: {}\nWindow: {} .. {}\nTournaments: {}\n",
        report.main_league.as_deref().unwrap_or("-"),
        report.window.start.format(DATE_FORMAT),
        report.window.end.format(DATE_FORMAT),
        report
            .tournaments
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", "),
    );
    out.push_str(&render_result_table(&report.result));
    if !report.unstreamable_games.is_empty() {
        out.push_str(&format!(
            "\n{} game(s) have no streaming offer:\n",
            report.unstreamable_games.len()
        ));
        let mut table = new_table();
        table.set_header(vec!["Kickoff", "Match", "Tournament"]);
        for game in &report.unstreamable_games {
            table.add_row(vec![
                game.starts_at.format(DATE_FORMAT).to_string(),
                format!("{} vs {}", game.home, game.away),
                game.tournament.clone(),
            ]);
        }
        out.push_str(&table.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::coverage::CoverageMap;
    use crate::optimizer::greedy::GreedyOptimizer;
    use crate::optimizer::PackageOptimizer;
    use crate::types::{Offer, Package};

    #[test]
    fn result_table_lists_packages_and_uncovered_games() {
        let kickoff = Utc
            .with_ymd_and_hms(2024, 9, 14, 15, 30, 0)
            .single()
            .expect("valid date");
        let games = vec![
            Game::new(1, "Bayern", "Kiel", "Bundesliga 24/25", kickoff),
            Game::new(2, "Bayern", "Mainz", "DFB Pokal 24/25", kickoff),
        ];
        let packages = vec![Package::new(7, "Sky Bundesliga").with_monthly(2999)];
        let coverage = CoverageMap::build(games, &packages, &[Offer::live(1, 7)], true);
        let result = GreedyOptimizer.optimize(&coverage, 3);

        let rendered = render_result_table(&result);
        assert!(rendered.contains("Sky Bundesliga"));
        assert!(rendered.contains("29.99"));
        assert!(rendered.contains("2024-09"));
        assert!(rendered.contains("Bayern vs Mainz"));
        assert!(rendered.contains("50.0%"));
    }

    #[test]
    fn full_coverage_has_no_uncovered_section() {
        let kickoff = Utc
            .with_ymd_and_hms(2024, 9, 14, 15, 30, 0)
            .single()
            .expect("valid date");
        let games = vec![Game::new(1, "Bayern", "Kiel", "Bundesliga 24/25", kickoff)];
        let packages = vec![Package::new(7, "Sky Bundesliga").with_monthly(2999)];
        let coverage = CoverageMap::build(games, &packages, &[Offer::live(1, 7)], true);
        let result = GreedyOptimizer.optimize(&coverage, 3);

        let rendered = render_result_table(&result);
        assert!(rendered.contains("100.0%"));
        assert!(!rendered.contains("Uncovered game"));
    }
}
