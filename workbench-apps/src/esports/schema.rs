//! Built-in entity definitions for the esports app.

use workbench_fields::{
    Display, EntityDef, FieldDef, FieldType, Result, Schema, SelectOption, SortKind,
};

pub const TOURNAMENT: &str = "tournament";
pub const TEAM: &str = "team";
pub const PLAYER: &str = "player";
pub const MATCH: &str = "match";

fn status(options: &[(&str, &str)], default: &str) -> FieldDef {
    let mut field = FieldDef::new(
        "status",
        FieldType::Select {
            options: options
                .iter()
                .enumerate()
                .map(|(i, (value, color))| {
                    SelectOption::new(*value, i as i32).with_color(*color)
                })
                .collect(),
        },
    )
    .required()
    .with_default(default);
    field.display = Some(Display::Badge);
    field
}

fn integer(min: f64) -> FieldType {
    FieldType::Number {
        min: Some(min),
        max: None,
        integer: true,
    }
}

fn reference(name: &str, entity: &str, label: &str) -> FieldDef {
    FieldDef::new(
        name,
        FieldType::Reference {
            entity: entity.into(),
        },
    )
    .with_label(label)
}

fn tournament() -> EntityDef {
    EntityDef::new(TOURNAMENT, "tournaments")
        .with_title_field("name")
        .field(FieldDef::new("name", FieldType::Text).required())
        .field(
            FieldDef::new("game", FieldType::Text)
                .required()
                .with_placeholder("Valorant"),
        )
        .field(status(
            &[
                ("upcoming", "blue"),
                ("ongoing", "green"),
                ("completed", "gray"),
            ],
            "upcoming",
        ))
        .field(FieldDef::new("start_date", FieldType::Date).with_sort(SortKind::Datetime))
        .field(FieldDef::new("end_date", FieldType::Date))
        .field(FieldDef::new(
            "prize_pool",
            FieldType::Number {
                min: Some(0.0),
                max: None,
                integer: false,
            },
        ))
        .field(FieldDef::new("max_teams", integer(2.0)))
        .field(FieldDef::new("description", FieldType::Textarea).hidden_in_table())
}

fn team() -> EntityDef {
    EntityDef::new(TEAM, "teams")
        .with_title_field("name")
        .field(FieldDef::new("name", FieldType::Text).required())
        .field(FieldDef::new("tag", FieldType::Text).with_placeholder("C9"))
        .field(FieldDef::new(
            "region",
            FieldType::Select {
                options: ["NA", "EU", "KR", "CN", "SEA", "BR"]
                    .iter()
                    .enumerate()
                    .map(|(i, r)| SelectOption::new(*r, i as i32))
                    .collect(),
            },
        ))
        .field(reference("tournament_id", TOURNAMENT, "Tournament"))
        .field(FieldDef::new("logo_url", FieldType::Text).hidden_in_table())
}

fn player() -> EntityDef {
    EntityDef::new(PLAYER, "players")
        .with_title_field("gamer_tag")
        .field(FieldDef::new("name", FieldType::Text).required())
        .field(FieldDef::new("gamer_tag", FieldType::Text).required())
        .field(FieldDef::new("role", FieldType::Text))
        .field(reference("team_id", TEAM, "Team"))
        .field(FieldDef::new("country", FieldType::Text))
}

fn match_() -> EntityDef {
    EntityDef::new(MATCH, "matches")
        .with_title_field("round")
        .field(reference("tournament_id", TOURNAMENT, "Tournament").required())
        .field(reference("team_a", TEAM, "Team A").required())
        .field(reference("team_b", TEAM, "Team B").required())
        .field(
            FieldDef::new("scheduled_date", FieldType::Date)
                .with_label("Date")
                .with_sort(SortKind::Datetime),
        )
        .field(FieldDef::new("scheduled_time", FieldType::Time).with_label("Time"))
        .field(status(
            &[
                ("scheduled", "blue"),
                ("live", "red"),
                ("completed", "gray"),
            ],
            "scheduled",
        ))
        .field(FieldDef::new("score_a", integer(0.0)))
        .field(FieldDef::new("score_b", integer(0.0)))
        .field(FieldDef::new("round", FieldType::Text).with_placeholder("Quarterfinal"))
}

/// Tournaments, teams, players and matches.
pub fn schema() -> Result<Schema> {
    Schema::builder("esports")
        .entity(tournament())
        .entity(team())
        .entity(player())
        .entity(match_())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use workbench_fields::{validate_record, Record};

    #[test]
    fn test_schema_declares_every_entity() {
        let schema = schema().unwrap();
        let names: Vec<&str> = schema.entities().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["tournament", "team", "player", "match"]);
        assert_eq!(schema.require(MATCH).unwrap().collection, "matches");
    }

    #[test]
    fn test_match_requires_both_teams() {
        let schema = schema().unwrap();
        let record: Record = json!({"tournament_id": "t1", "team_a": "a", "status": "scheduled"})
            .as_object()
            .cloned()
            .unwrap();
        let errors = validate_record(schema.require(MATCH).unwrap(), &record).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.for_field("team_b").is_some());
    }

    #[test]
    fn test_scores_must_be_whole() {
        let schema = schema().unwrap();
        let record: Record = json!({
            "tournament_id": "t1",
            "team_a": "a",
            "team_b": "b",
            "status": "completed",
            "score_a": 1.5
        })
        .as_object()
        .cloned()
        .unwrap();
        let errors = validate_record(schema.require(MATCH).unwrap(), &record).unwrap_err();
        assert!(errors.for_field("score_a").is_some());
    }
}
