use crate::models::{PostByeAverages, TeamTotals};
use std::collections::BTreeMap;

/// Round half away from zero to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(sum: u32, games: u32) -> f64 {
    round2(f64::from(sum) / f64::from(games))
}

impl TeamTotals {
    /// Averages over post-bye games, or `None` if the team played none.
    ///
    /// Overtime points divide by overtime games only; with no overtime games
    /// the overtime average is `None` rather than NaN.
    pub fn averages(&self) -> Option<PostByeAverages> {
        if self.total_games == 0 {
            return None;
        }

        Some(PostByeAverages {
            total_avg: mean(self.point_total, self.total_games),
            first_quarter: mean(self.point_q1, self.total_games),
            second_quarter: mean(self.point_q2, self.total_games),
            third_quarter: mean(self.point_q3, self.total_games),
            fourth_quarter: mean(self.point_q4, self.total_games),
            overtime: (self.ot_games > 0).then(|| mean(self.point_ot, self.ot_games)),
        })
    }
}

/// Turn every team's post-bye totals into averages
pub fn compute_averages(totals: &BTreeMap<String, TeamTotals>) -> BTreeMap<String, PostByeAverages> {
    totals
        .iter()
        .filter_map(|(team, team_totals)| team_totals.averages().map(|avg| (team.clone(), avg)))
        .collect()
}
