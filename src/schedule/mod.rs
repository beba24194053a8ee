pub mod league;
pub mod pause;
pub mod window;

pub use league::{main_league, team_tournaments};
pub use pause::{average_gap_days, Pause, PauseDetector};
pub use window::{choose_end_date, plan_window, AnalysisWindow};
