//! Clinic appointment booker: doctors, patients and appointments.

pub mod models;
pub mod schema;
pub mod services;

use std::sync::Arc;

use workbench_backend::{Backend, Query};
use workbench_config::CollectionIds;

use crate::collection::Collection;
use crate::error::Result;

pub use models::{Appointment, AppointmentStatus, Doctor, Patient};
pub use schema::schema;
pub use services::{
    dashboard_stats, doctor_schedule, todays_appointments, upcoming_appointments, ClinicStats,
    DoctorSchedule,
};

/// Typed access to the clinic collections.
#[derive(Debug, Clone)]
pub struct ClinicApi {
    doctors: Collection<Doctor>,
    patients: Collection<Patient>,
    appointments: Collection<Appointment>,
}

impl ClinicApi {
    pub fn new(backend: Arc<dyn Backend>, ids: &CollectionIds) -> Self {
        Self {
            doctors: Collection::new(Arc::clone(&backend), &ids.doctors),
            patients: Collection::new(Arc::clone(&backend), &ids.patients),
            appointments: Collection::new(backend, &ids.appointments),
        }
    }

    pub fn doctors(&self) -> &Collection<Doctor> {
        &self.doctors
    }

    pub fn patients(&self) -> &Collection<Patient> {
        &self.patients
    }

    pub fn appointments(&self) -> &Collection<Appointment> {
        &self.appointments
    }

    pub async fn fetch_appointments_for_doctor(&self, doctor_id: &str) -> Result<Vec<Appointment>> {
        self.appointments
            .fetch_all(&[Query::equal("doctor_id", doctor_id)])
            .await
    }

    pub async fn fetch_appointments_for_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<Appointment>> {
        self.appointments
            .fetch_all(&[Query::equal("patient_id", patient_id)])
            .await
    }
}
