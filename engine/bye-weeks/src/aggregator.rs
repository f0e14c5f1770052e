use crate::averages::compute_averages;
use crate::models::{ByeWeek, Game, PostByeAverages, TeamTotals};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Result of one pass over a season's schedule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonAggregate {
    /// One entry per team that rested, in week order then abbreviation order
    pub byes: Vec<ByeWeek>,

    /// Post-bye sums, only for teams that played at least one scored game after their bye
    pub totals: BTreeMap<String, TeamTotals>,
}

impl SeasonAggregate {
    pub fn bye_week_for(&self, team: &str) -> Option<u32> {
        self.byes.iter().find(|bye| bye.team == team).map(|bye| bye.week)
    }

    pub fn averages(&self) -> BTreeMap<String, PostByeAverages> {
        compute_averages(&self.totals)
    }
}

/// Stable sort by week; games within a week keep the API's order
pub fn sort_by_week(games: &mut [Game]) {
    games.sort_by_key(|game| game.week);
}

/// Every abbreviation that hosted a game this season.
///
/// Only home teams are tracked so a relocated franchise shows up under the
/// abbreviation it used that year.
pub fn home_teams(games: &[Game]) -> BTreeSet<String> {
    games.iter().map(|game| game.home_team_abbr.clone()).collect()
}

/// Find each team's bye week and sum its scoring in every game after it.
pub fn aggregate_season(games: &[Game]) -> SeasonAggregate {
    let games: Cow<'_, [Game]> = if games.windows(2).all(|pair| pair[0].week <= pair[1].week) {
        Cow::Borrowed(games)
    } else {
        let mut sorted = games.to_vec();
        sort_by_week(&mut sorted);
        Cow::Owned(sorted)
    };

    let teams = home_teams(&games);
    let mut not_playing = teams.clone();
    let mut had_bye: BTreeSet<String> = BTreeSet::new();
    let mut aggregate = SeasonAggregate::default();

    for (i, game) in games.iter().enumerate() {
        not_playing.remove(&game.home_team_abbr);
        not_playing.remove(&game.visitor_team_abbr);

        if let Some(score) = &game.score {
            let overtime = score.is_overtime();
            let sides = [
                (&game.home_team_abbr, &score.home_team_score),
                (&game.visitor_team_abbr, &score.visitor_team_score),
            ];

            for (team, team_score) in sides {
                if !had_bye.contains(team) {
                    continue;
                }
                let next = aggregate
                    .totals
                    .get(team)
                    .copied()
                    .unwrap_or_default()
                    .with_game(team_score, overtime);
                aggregate.totals.insert(team.clone(), next);
            }
        }

        let last_of_week = games.get(i + 1).map_or(true, |next| next.week != game.week);
        if !last_of_week {
            continue;
        }

        for team in std::mem::replace(&mut not_playing, teams.clone()) {
            if had_bye.contains(&team) {
                debug!("{} idle again in week {}, keeping its first bye", team, game.week);
                continue;
            }
            aggregate.byes.push(ByeWeek { team: team.clone(), week: game.week });
            had_bye.insert(team);
        }
    }

    aggregate
}
