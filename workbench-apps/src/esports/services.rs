//! Esports dashboard counts and tournament standings.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use workbench_backend::Query;
use workbench_fields::DATE_FORMAT;

use super::EsportsApi;
use crate::error::Result;

pub const POINTS_PER_WIN: u32 = 3;
pub const POINTS_PER_DRAW: u32 = 1;

/// Counts shown on the esports dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsportsStats {
    pub total_tournaments: u64,
    pub total_teams: u64,
    pub total_players: u64,
    pub total_matches: u64,
    pub ongoing_tournaments: u64,
    /// Scheduled matches dated today or later.
    pub upcoming_matches: u64,
}

/// One row of a tournament table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: String,
    pub team_name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
}

impl Standing {
    fn new(team_id: &str, team_name: &str) -> Self {
        Self {
            team_id: team_id.to_string(),
            team_name: team_name.to_string(),
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            points: 0,
        }
    }

    fn record(&mut self, scored: i64, conceded: i64) {
        self.played += 1;
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.wins += 1;
                self.points += POINTS_PER_WIN;
            }
            Ordering::Equal => {
                self.draws += 1;
                self.points += POINTS_PER_DRAW;
            }
            Ordering::Less => self.losses += 1,
        }
    }
}

#[instrument(skip(api))]
pub async fn dashboard_stats(api: &EsportsApi, today: NaiveDate) -> Result<EsportsStats> {
    let ongoing = [Query::equal("status", "ongoing")];
    let upcoming = [
        Query::equal("status", "scheduled"),
        Query::greater_equal("scheduled_date", today.format(DATE_FORMAT).to_string()),
    ];

    let (
        total_tournaments,
        total_teams,
        total_players,
        total_matches,
        ongoing_tournaments,
        upcoming_matches,
    ) = tokio::try_join!(
        api.tournaments().count(&[]),
        api.teams().count(&[]),
        api.players().count(&[]),
        api.matches().count(&[]),
        api.tournaments().count(&ongoing),
        api.matches().count(&upcoming),
    )?;

    Ok(EsportsStats {
        total_tournaments,
        total_teams,
        total_players,
        total_matches,
        ongoing_tournaments,
        upcoming_matches,
    })
}

/// Win/draw/loss table for a tournament, best first.
///
/// Every team registered to the tournament gets a row. Only completed
/// matches with both scores count. Rows sort by points, then wins, then
/// team name.
#[instrument(skip(api))]
pub async fn standings(api: &EsportsApi, tournament_id: &str) -> Result<Vec<Standing>> {
    api.tournaments().get(tournament_id).await?;
    let (teams, matches) = tokio::try_join!(
        api.fetch_teams_for_tournament(tournament_id),
        api.fetch_matches_for_tournament(tournament_id),
    )?;

    let mut table: HashMap<String, Standing> = teams
        .iter()
        .map(|t| (t.meta.id.clone(), Standing::new(&t.meta.id, &t.name)))
        .collect();

    for m in &matches {
        let Some((a, b)) = m.final_score() else {
            continue;
        };
        for (team, scored, conceded) in [(&m.team_a, a, b), (&m.team_b, b, a)] {
            table
                .entry(team.clone())
                .or_insert_with(|| {
                    warn!(team = %team, match_id = %m.meta.id, "match references a team outside the tournament");
                    Standing::new(team, team)
                })
                .record(scored, conceded);
        }
    }

    let mut rows: Vec<Standing> = table.into_values().collect();
    rows.sort_by(|x, y| {
        y.points
            .cmp(&x.points)
            .then_with(|| y.wins.cmp(&x.wins))
            .then_with(|| x.team_name.cmp(&y.team_name))
    });
    Ok(rows)
}
