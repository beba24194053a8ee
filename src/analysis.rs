//! Request-scoped pipeline: team fixtures in, package recommendation out.
//!
//! The optimizer core is pure and never fails. Input validation and the
//! time-window planning around it live here so the CLI and the HTTP server
//! share one code path.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, OptimizerConfig};
use crate::coverage::CoverageMap;
use crate::optimizer::{build_optimizer, OptimizationResult, Strategy};
use crate::schedule::{main_league, plan_window, team_tournaments, AnalysisWindow};
use crate::types::{Game, GameId, Offer, Package};
use crate::weights::{base_tournament_name, MatchContext, WeightModel};

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("at least one team is required")]
    NoTeams,
    #[error("min_horizon_days must not be negative, got {0}")]
    NegativeHorizon(i64),
    #[error("pause_factor must be positive, got {0}")]
    InvalidPauseFactor(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub teams: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub games: Vec<Game>,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub context: MatchContext,
    #[serde(default)]
    pub max_packages: Option<usize>,
    #[serde(default)]
    pub require_live: Option<bool>,
    #[serde(default)]
    pub strategy: Option<Strategy>,
}

/// Core-only input: games carry their final weights already and no window is
/// applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub games: Vec<Game>,
    pub packages: Vec<Package>,
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub max_packages: Option<usize>,
    #[serde(default)]
    pub require_live: Option<bool>,
    #[serde(default)]
    pub strategy: Option<Strategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowPlan {
    pub main_league: Option<String>,
    pub tournaments: BTreeSet<String>,
    pub window: AnalysisWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub window: AnalysisWindow,
    pub main_league: Option<String>,
    pub tournaments: BTreeSet<String>,
    pub result: OptimizationResult,
    pub unstreamable_games: Vec<Game>,
}

pub fn run_analysis(request: &AnalysisRequest, config: &Config) -> Result<AnalysisReport, InputError> {
    let plan = plan_analysis_window(request, config)?;
    let offered = offered_game_ids(&request.offers);

    let (streamable, unstreamable_games): (Vec<Game>, Vec<Game>) =
        team_games(&request.games, &request.teams, request.start_date)
            .into_iter()
            .filter(|game| plan.window.contains(game.starts_at))
            .partition(|game| offered.contains(&game.id));

    let model = WeightModel::new(config.weights.clone());
    let weighted = model.weigh_all(streamable, &request.context);

    let settings = effective_settings(
        &config.optimizer,
        request.strategy,
        request.max_packages,
        request.require_live,
    );
    let coverage = CoverageMap::build(
        weighted,
        &request.packages,
        &request.offers,
        settings.require_live,
    );
    let optimizer = build_optimizer(settings.strategy, &config.annealing);
    let result = optimizer.optimize(&coverage, settings.max_packages);

    info!(
        "analysis for {} team(s): {} games in window, {} unstreamable, {} package(s) selected at {}",
        request.teams.len(),
        coverage.game_count(),
        unstreamable_games.len(),
        result.selected_packages.len(),
        result.total_cost
    );

    Ok(AnalysisReport {
        window: plan.window,
        main_league: plan.main_league,
        tournaments: plan.tournaments,
        result,
        unstreamable_games,
    })
}

/// Main-league detection, pause detection and the resulting window end.
pub fn plan_analysis_window(
    request: &AnalysisRequest,
    config: &Config,
) -> Result<WindowPlan, InputError> {
    validate(request, config)?;

    let games = team_games(&request.games, &request.teams, request.start_date);
    let tournaments = team_tournaments(&games, &request.teams);
    let main_league = main_league(&tournaments);
    let offered = offered_game_ids(&request.offers);

    let reference: Vec<Game> = match &main_league {
        Some(league) => {
            let base = base_tournament_name(league);
            games
                .iter()
                .filter(|game| base_tournament_name(&game.tournament) == base)
                .filter(|game| offered.contains(&game.id))
                .cloned()
                .collect()
        }
        None => Vec::new(),
    };
    debug!(
        "main league {:?} with {} streamable reference games",
        main_league,
        reference.len()
    );

    let window = plan_window(request.start_date, &reference, &config.window);
    Ok(WindowPlan {
        main_league,
        tournaments,
        window,
    })
}

/// The requested teams' games from `start_date` onward, weighted.
pub fn weigh_request(request: &AnalysisRequest, config: &Config) -> Result<Vec<Game>, InputError> {
    validate(request, config)?;
    let games = team_games(&request.games, &request.teams, request.start_date);
    Ok(WeightModel::new(config.weights.clone()).weigh_all(games, &request.context))
}

pub fn solve(request: &SolveRequest, config: &Config) -> OptimizationResult {
    let settings = effective_settings(
        &config.optimizer,
        request.strategy,
        request.max_packages,
        request.require_live,
    );
    let coverage = CoverageMap::build(
        request.games.clone(),
        &request.packages,
        &request.offers,
        settings.require_live,
    );
    build_optimizer(settings.strategy, &config.annealing).optimize(&coverage, settings.max_packages)
}

/// Games involving any of `teams` that start at or after `start`, in
/// chronological order.
pub fn team_games(games: &[Game], teams: &[String], start: DateTime<Utc>) -> Vec<Game> {
    let mut selected: Vec<Game> = games
        .iter()
        .filter(|game| game.starts_at >= start)
        .filter(|game| teams.iter().any(|team| game.involves(team)))
        .cloned()
        .collect();
    selected.sort_by_key(|game| game.starts_at);
    selected
}

fn offered_game_ids(offers: &[Offer]) -> HashSet<GameId> {
    offers.iter().map(|offer| offer.game_id).collect()
}

fn validate(request: &AnalysisRequest, config: &Config) -> Result<(), InputError> {
    if request.teams.iter().all(|team| team.trim().is_empty()) {
        return Err(InputError::NoTeams);
    }
    if config.window.min_horizon_days < 0 {
        return Err(InputError::NegativeHorizon(config.window.min_horizon_days));
    }
    let factor = config.window.pause_factor;
    if factor.is_nan() || factor <= 0.0 {
        return Err(InputError::InvalidPauseFactor(config.window.pause_factor));
    }
    Ok(())
}

fn effective_settings(
    base: &OptimizerConfig,
    strategy: Option<Strategy>,
    max_packages: Option<usize>,
    require_live: Option<bool>,
) -> OptimizerConfig {
    OptimizerConfig {
        strategy: strategy.unwrap_or(base.strategy),
        max_packages: max_packages.unwrap_or(base.max_packages),
        require_live: require_live.unwrap_or(base.require_live),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn day(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 18, 0, 0)
            .single()
            .expect("valid date")
            + Duration::days(offset)
    }

    /// Weekly Bundesliga games for Bayern with a winter break after day 126,
    /// a cup game on day 10 only on the cup package, and an unrelated game.
    fn request() -> AnalysisRequest {
        let mut games = Vec::new();
        let mut offers = Vec::new();
        let league_days: Vec<i64> = (0..=18).map(|week| week * 7).chain([168, 175]).collect();
        for (idx, offset) in league_days.iter().enumerate() {
            let id = idx as u64 + 1;
            games.push(Game::new(id, "Bayern", "Opponent", "Bundesliga 24/25", day(*offset)));
            offers.push(Offer::live(id, 1));
        }
        games.push(Game::new(50, "Mainz", "Bayern", "DFB Pokal 24/25", day(10)));
        offers.push(Offer::live(50, 2));
        games.push(Game::new(60, "Bayern", "Inter", "Friendly", day(12)));
        games.push(Game::new(70, "Celtic", "Rangers", "Premiership 24/25", day(14)));
        offers.push(Offer::live(70, 1));

        AnalysisRequest {
            teams: vec!["Bayern".to_string()],
            start_date: day(0),
            games,
            packages: vec![
                Package::new(1, "League Pass").with_monthly(3000),
                Package::new(2, "Cup Pass").with_monthly(1000),
            ],
            offers,
            context: MatchContext::default(),
            max_packages: None,
            require_live: None,
            strategy: Some(Strategy::Greedy),
        }
    }

    #[test]
    fn window_ends_at_winter_break() {
        let plan = plan_analysis_window(&request(), &Config::default()).expect("valid request");
        assert_eq!(plan.main_league.as_deref(), Some("Bundesliga 24/25"));
        assert_eq!(plan.window.end, day(126));
        assert_eq!(plan.window.pauses.len(), 1);
        assert!(plan.tournaments.contains("DFB Pokal 24/25"));
        assert!(!plan.tournaments.contains("Premiership 24/25"));
    }

    #[test]
    fn full_pipeline_covers_team_games() {
        let report = run_analysis(&request(), &Config::default()).expect("valid request");
        // 19 league games up to the break plus the cup game.
        let covered: usize = report
            .result
            .selected_packages
            .iter()
            .map(|p| p.covered_games.len())
            .sum();
        assert_eq!(covered, 20);
        assert!(report.result.uncovered_games.is_empty());
        assert_eq!(report.unstreamable_games.len(), 1);
        assert_eq!(report.unstreamable_games[0].id, 60);
        assert!((report.result.coverage_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn budget_override_limits_selection() {
        let mut req = request();
        req.max_packages = Some(1);
        let report = run_analysis(&req, &Config::default()).expect("valid request");
        assert_eq!(report.result.selected_packages.len(), 1);
        assert_eq!(report.result.selected_packages[0].package.id, 1);
        assert_eq!(report.result.uncovered_games.len(), 1);
    }

    #[test]
    fn empty_team_list_is_rejected() {
        let mut req = request();
        req.teams = vec![" ".to_string()];
        assert_eq!(
            run_analysis(&req, &Config::default()).err(),
            Some(InputError::NoTeams)
        );
    }

    #[test]
    fn start_at_calendar_limit_does_not_overflow() {
        let mut req = request();
        req.start_date = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        let plan = plan_analysis_window(&req, &Config::default()).expect("valid request");
        assert_eq!(plan.window.end, DateTime::<Utc>::MAX_UTC);

        let report = run_analysis(&req, &Config::default()).expect("valid request");
        assert!(report.result.selected_packages.is_empty());
        assert!(report.unstreamable_games.is_empty());
    }

    #[test]
    fn weights_follow_tournament_tiers() {
        let weighted = weigh_request(&request(), &Config::default()).expect("valid request");
        let cup = weighted.iter().find(|g| g.id == 50).expect("cup game");
        let friendly = weighted.iter().find(|g| g.id == 60).expect("friendly");
        assert!((cup.total_weight() - 1.0).abs() < 1e-12);
        assert!((friendly.total_weight() - 0.4).abs() < 1e-12);
        assert!(weighted.iter().all(|g| g.id != 70));
    }

    #[test]
    fn solve_uses_given_weights() {
        let req = SolveRequest {
            games: vec![
                Game::new(1, "A", "B", "X", day(0)).with_base_weight(3.0),
                Game::new(2, "C", "D", "X", day(1)).with_base_weight(1.0),
            ],
            packages: vec![
                Package::new(10, "Heavy").with_monthly(1000),
                Package::new(11, "Light").with_monthly(100),
            ],
            offers: vec![Offer::live(1, 10), Offer::live(2, 11)],
            max_packages: Some(1),
            require_live: None,
            strategy: Some(Strategy::Greedy),
        };
        let result = solve(&req, &Config::default());
        assert_eq!(result.selected_packages.len(), 1);
        // 1.0 / 100 beats 3.0 / 1000.
        assert_eq!(result.selected_packages[0].package.id, 11);
    }
}
