//! Built-in entity definitions for the clinic app.

use workbench_fields::{
    Display, EntityDef, FieldDef, FieldType, Result, Schema, SelectOption, SortKind,
};

pub const DOCTOR: &str = "doctor";
pub const PATIENT: &str = "patient";
pub const APPOINTMENT: &str = "appointment";

fn select(options: &[(&str, &str)]) -> FieldType {
    FieldType::Select {
        options: options
            .iter()
            .enumerate()
            .map(|(i, (value, color))| SelectOption::new(*value, i as i32).with_color(*color))
            .collect(),
    }
}

fn doctor() -> EntityDef {
    EntityDef::new(DOCTOR, "doctors")
        .with_title_field("name")
        .field(FieldDef::new("name", FieldType::Text).required())
        .field(
            FieldDef::new("specialty", FieldType::Text)
                .required()
                .with_placeholder("Cardiology"),
        )
        .field(FieldDef::new("email", FieldType::Email))
        .field(FieldDef::new("phone", FieldType::Text))
        .field(
            FieldDef::new("available_days", FieldType::Text)
                .with_placeholder("Mon, Wed, Fri"),
        )
}

fn patient() -> EntityDef {
    EntityDef::new(PATIENT, "patients")
        .with_title_field("name")
        .field(FieldDef::new("name", FieldType::Text).required())
        .field(FieldDef::new("email", FieldType::Email))
        .field(FieldDef::new("phone", FieldType::Text))
        .field(
            FieldDef::new("date_of_birth", FieldType::Date).with_label("Date of birth"),
        )
        .field(FieldDef::new(
            "gender",
            select(&[("female", "pink"), ("male", "blue"), ("other", "gray")]),
        ))
        .field(FieldDef::new("address", FieldType::Textarea).hidden_in_table())
}

fn appointment() -> EntityDef {
    let mut status = FieldDef::new(
        "status",
        select(&[
            ("scheduled", "blue"),
            ("completed", "green"),
            ("cancelled", "red"),
        ]),
    )
    .required()
    .with_default("scheduled");
    status.display = Some(Display::Badge);

    EntityDef::new(APPOINTMENT, "appointments")
        .with_title_field("reason")
        .field(
            FieldDef::new(
                "patient_id",
                FieldType::Reference {
                    entity: PATIENT.into(),
                },
            )
            .required()
            .with_label("Patient"),
        )
        .field(
            FieldDef::new(
                "doctor_id",
                FieldType::Reference {
                    entity: DOCTOR.into(),
                },
            )
            .required()
            .with_label("Doctor"),
        )
        .field(
            FieldDef::new("date", FieldType::Date)
                .required()
                .with_sort(SortKind::Datetime),
        )
        .field(FieldDef::new("time", FieldType::Time).required())
        .field(status)
        .field(FieldDef::new("reason", FieldType::Text))
        .field(FieldDef::new("notes", FieldType::Textarea).hidden_in_table())
}

/// Doctors, patients and appointments.
pub fn schema() -> Result<Schema> {
    Schema::builder("clinic")
        .entity(doctor())
        .entity(patient())
        .entity(appointment())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_declares_every_entity() {
        let schema = schema().unwrap();
        let names: Vec<&str> = schema.entities().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["doctor", "patient", "appointment"]);
    }

    #[test]
    fn test_appointment_status_options() {
        let schema = schema().unwrap();
        let status = schema.require(APPOINTMENT).unwrap().get_field("status").unwrap();
        let values: Vec<&str> = status.options().iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["scheduled", "completed", "cancelled"]);
        assert_eq!(status.default.as_deref(), Some("scheduled"));
    }

    #[test]
    fn test_schema_round_trips_through_yaml() {
        let schema = schema().unwrap();
        let parsed = Schema::from_yaml(&schema.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed.entities(), schema.entities());
    }
}
