use once_cell::sync::Lazy;
use regex::Regex;

static SEASON_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+\d{2,4}/\d{2,4}$").expect("season suffix pattern compiles"));

/// Base weight per tournament, keyed by name without season suffix.
pub const TOURNAMENT_WEIGHTS: &[(&str, f64)] = &[
    ("UEFA Champions League", 5.0),
    ("Bundesliga", 1.5),
    ("Premier League", 1.5),
    ("LaLiga", 1.5),
    ("Serie A", 1.5),
    ("Ligue 1", 1.5),
    ("Europameisterschaft 2024", 1.5),
    ("UEFA Europa League", 1.0),
    ("DFB Pokal", 1.0),
    ("FA Cup", 1.0),
    ("Copa del Rey", 1.0),
    ("UEFA Super Cup", 1.0),
    ("UEFA Conference League", 0.7),
    ("2. Bundesliga", 0.7),
    ("Liga Portugal", 0.7),
    ("Eredivisie", 0.7),
    ("Süper Lig", 0.7),
    ("3. Liga", 0.4),
    ("Major League Soccer", 0.4),
    ("Saudi Prof. League", 0.4),
];

/// "Bundesliga 24/25" -> "Bundesliga".
pub fn base_tournament_name(tournament: &str) -> String {
    SEASON_SUFFIX.replace(tournament, "").into_owned()
}

pub fn tournament_weight(base_name: &str) -> Option<f64> {
    TOURNAMENT_WEIGHTS
        .iter()
        .find(|(name, _)| *name == base_name)
        .map(|(_, weight)| *weight)
}
