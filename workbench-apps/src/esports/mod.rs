//! Esports tournament manager: tournaments, teams, players and matches.

pub mod models;
pub mod schema;
pub mod services;

use std::sync::Arc;

use workbench_backend::{Backend, Query};
use workbench_config::CollectionIds;

use crate::collection::Collection;
use crate::error::Result;

pub use models::{Match, MatchStatus, Player, Team, Tournament, TournamentStatus};
pub use schema::schema;
pub use services::{dashboard_stats, standings, EsportsStats, Standing};

/// Typed access to the esports collections.
#[derive(Debug, Clone)]
pub struct EsportsApi {
    tournaments: Collection<Tournament>,
    teams: Collection<Team>,
    players: Collection<Player>,
    matches: Collection<Match>,
}

impl EsportsApi {
    pub fn new(backend: Arc<dyn Backend>, ids: &CollectionIds) -> Self {
        Self {
            tournaments: Collection::new(Arc::clone(&backend), &ids.tournaments),
            teams: Collection::new(Arc::clone(&backend), &ids.teams),
            players: Collection::new(Arc::clone(&backend), &ids.players),
            matches: Collection::new(backend, &ids.matches),
        }
    }

    pub fn tournaments(&self) -> &Collection<Tournament> {
        &self.tournaments
    }

    pub fn teams(&self) -> &Collection<Team> {
        &self.teams
    }

    pub fn players(&self) -> &Collection<Player> {
        &self.players
    }

    pub fn matches(&self) -> &Collection<Match> {
        &self.matches
    }

    pub async fn fetch_teams_for_tournament(&self, tournament_id: &str) -> Result<Vec<Team>> {
        self.teams
            .fetch_all(&[Query::equal("tournament_id", tournament_id)])
            .await
    }

    pub async fn fetch_players_for_team(&self, team_id: &str) -> Result<Vec<Player>> {
        self.players
            .fetch_all(&[Query::equal("team_id", team_id)])
            .await
    }

    pub async fn fetch_matches_for_tournament(&self, tournament_id: &str) -> Result<Vec<Match>> {
        self.matches
            .fetch_all(&[
                Query::equal("tournament_id", tournament_id),
                Query::order_asc("scheduled_date"),
                Query::order_asc("scheduled_time"),
            ])
            .await
    }
}
