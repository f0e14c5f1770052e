use crate::error::ModelError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Phase label the schedule API uses for games decided in overtime
pub const OVERTIME_PHASE: &str = "FINAL_OVERTIME";

/// Season type as labelled by the schedule API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeasonType {
    #[serde(rename = "PRE")]
    Preseason,

    #[serde(rename = "REG")]
    Regular,

    #[serde(rename = "POST")]
    Postseason,
}

impl SeasonType {
    /// Wire label, also the value stored in `season_types.type`
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonType::Preseason => "PRE",
            SeasonType::Regular => "REG",
            SeasonType::Postseason => "POST",
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeasonType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRE" => Ok(SeasonType::Preseason),
            "REG" => Ok(SeasonType::Regular),
            "POST" => Ok(SeasonType::Postseason),
            other => Err(ModelError::UnknownSeasonType(other.to_string())),
        }
    }
}

/// One game from the schedule API
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Game {
    #[serde(rename = "week")]
    pub week: u32,

    #[serde(rename = "homeTeamAbbr")]
    pub home_team_abbr: String,

    #[serde(rename = "visitorTeamAbbr")]
    pub visitor_team_abbr: String,

    /// Absent (or null) for games that have not been played
    #[serde(rename = "score", default)]
    pub score: Option<GameScore>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GameScore {
    #[serde(rename = "phase", default)]
    pub phase: String,

    #[serde(rename = "homeTeamScore")]
    pub home_team_score: TeamScore,

    #[serde(rename = "visitorTeamScore")]
    pub visitor_team_score: TeamScore,
}

impl GameScore {
    pub fn is_overtime(&self) -> bool {
        self.phase == OVERTIME_PHASE
    }
}

/// Points one side scored, by period
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamScore {
    #[serde(rename = "pointTotal", default, deserialize_with = "null_as_zero")]
    pub point_total: u32,

    #[serde(rename = "pointQ1", default, deserialize_with = "null_as_zero")]
    pub point_q1: u32,

    #[serde(rename = "pointQ2", default, deserialize_with = "null_as_zero")]
    pub point_q2: u32,

    #[serde(rename = "pointQ3", default, deserialize_with = "null_as_zero")]
    pub point_q3: u32,

    #[serde(rename = "pointQ4", default, deserialize_with = "null_as_zero")]
    pub point_q4: u32,

    #[serde(rename = "pointOT", default, deserialize_with = "null_as_zero")]
    pub point_ot: u32,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// Week in which a team had no game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByeWeek {
    pub team: String,
    pub week: u32,
}

/// Running post-bye sums for one team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamTotals {
    pub point_total: u32,
    pub point_q1: u32,
    pub point_q2: u32,
    pub point_q3: u32,
    pub point_q4: u32,
    pub point_ot: u32,
    pub total_games: u32,
    pub ot_games: u32,
}

impl TeamTotals {
    /// Totals after folding in one more game for this team
    pub fn with_game(self, score: &TeamScore, overtime: bool) -> Self {
        Self {
            point_total: self.point_total + score.point_total,
            point_q1: self.point_q1 + score.point_q1,
            point_q2: self.point_q2 + score.point_q2,
            point_q3: self.point_q3 + score.point_q3,
            point_q4: self.point_q4 + score.point_q4,
            point_ot: self.point_ot + score.point_ot,
            total_games: self.total_games + 1,
            ot_games: self.ot_games + u32::from(overtime),
        }
    }
}

/// Post-bye scoring averages for one team, rounded to 2 decimals.
///
/// `overtime` is averaged over overtime games only and is `None` when the team
/// played none after its bye.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostByeAverages {
    pub total_avg: f64,
    pub first_quarter: f64,
    pub second_quarter: f64,
    pub third_quarter: f64,
    pub fourth_quarter: f64,
    pub overtime: Option<f64>,
}

impl PostByeAverages {
    pub fn get(&self, period: Period) -> Option<f64> {
        match period {
            Period::TotalAvg => Some(self.total_avg),
            Period::FirstQuarter => Some(self.first_quarter),
            Period::SecondQuarter => Some(self.second_quarter),
            Period::ThirdQuarter => Some(self.third_quarter),
            Period::FourthQuarter => Some(self.fourth_quarter),
            Period::Overtime => self.overtime,
        }
    }
}

/// Averages column a caller can ask for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    TotalAvg,
    FirstQuarter,
    SecondQuarter,
    ThirdQuarter,
    FourthQuarter,
    Overtime,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::TotalAvg,
        Period::FirstQuarter,
        Period::SecondQuarter,
        Period::ThirdQuarter,
        Period::FourthQuarter,
        Period::Overtime,
    ];

    /// Column name in `points_after_bye`
    pub fn column(&self) -> &'static str {
        match self {
            Period::TotalAvg => "total_avg",
            Period::FirstQuarter => "first_quarter",
            Period::SecondQuarter => "second_quarter",
            Period::ThirdQuarter => "third_quarter",
            Period::FourthQuarter => "fourth_quarter",
            Period::Overtime => "overtime",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Period {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.column() == s)
            .ok_or_else(|| ModelError::UnknownPeriod(s.to_string()))
    }
}
