//! Esports records.

use serde::{Deserialize, Serialize};

use crate::meta::Meta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    #[serde(flatten)]
    pub meta: Meta,
    pub name: String,
    pub game: String,
    #[serde(default)]
    pub status: TournamentStatus,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub prize_pool: Option<f64>,
    #[serde(default)]
    pub max_teams: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(flatten)]
    pub meta: Meta,
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub tournament_id: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(flatten)]
    pub meta: Meta,
    pub name: String,
    pub gamer_tag: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(flatten)]
    pub meta: Meta,
    pub tournament_id: String,
    pub team_a: String,
    pub team_b: String,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub score_a: Option<i64>,
    #[serde(default)]
    pub score_b: Option<i64>,
    #[serde(default)]
    pub round: Option<String>,
}

impl Match {
    /// Final score, when the match is completed and both scores are recorded.
    pub fn final_score(&self) -> Option<(i64, i64)> {
        match (self.status, self.score_a, self.score_b) {
            (MatchStatus::Completed, Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn match_json(status: &str, score_a: serde_json::Value) -> Match {
        serde_json::from_value(json!({
            "$id": "m1",
            "$createdAt": "2024-05-01T12:00:00Z",
            "$updatedAt": "2024-05-01T12:00:00Z",
            "tournament_id": "t1",
            "team_a": "a",
            "team_b": "b",
            "status": status,
            "score_a": score_a,
            "score_b": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_final_score() {
        assert_eq!(match_json("completed", json!(2)).final_score(), Some((2, 1)));
        assert_eq!(match_json("live", json!(2)).final_score(), None);
        assert_eq!(match_json("completed", json!(null)).final_score(), None);
    }

    #[test]
    fn test_status_defaults() {
        let tournament: Tournament = serde_json::from_value(json!({
            "$id": "t1",
            "$createdAt": "2024-05-01T12:00:00Z",
            "$updatedAt": "2024-05-01T12:00:00Z",
            "name": "Worlds",
            "game": "League of Legends"
        }))
        .unwrap();
        assert_eq!(tournament.status, TournamentStatus::Upcoming);
        assert_eq!(tournament.prize_pool, None);
    }
}
