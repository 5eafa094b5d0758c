//! Statistics collection.
//!
//! The clinic reports each state transition exactly once through [`ClinicObserver`]; what to make of those reports
//! is up to the observer. [`SimOutputs`] is the collector used by the model runner: it keeps counts, per-patient
//! waiting and sojourn observations, and time-weighted sample paths of the queue lengths and server occupancy.

mod outputs;
mod sample_path;

pub use outputs::{PatientSummary, SimOutputs, Summary};
pub use sample_path::PrevalenceSamplePath;

use crate::entities::{Patient, Stage};

/// Receives one notification per state transition of the clinic.
///
/// Every method has an empty default body, so an observer only needs to implement the hooks it cares about, and `()`
/// serves as an observer that ignores everything. Times are simulated hours.
#[allow(unused_variables)]
pub trait ClinicObserver {
    /// A patient was admitted. Rejected arrivals after closure are never reported.
    fn patient_arrived(&mut self, time: f64, patient: &Patient) {}

    /// A patient sat down in a waiting room. `waiting` includes the patient.
    fn joined_waiting_room(&mut self, stage: Stage, time: f64, patient: &Patient, waiting: usize) {}

    /// A patient was called out of a waiting room. `waiting` excludes the patient.
    fn left_waiting_room(&mut self, stage: Stage, time: f64, patient: &Patient, waiting: usize) {}

    /// A physician of the given stage became busy.
    fn service_started(&mut self, stage: Stage, time: f64, patient: &Patient) {}

    /// A physician of the given stage became idle.
    fn service_ended(&mut self, stage: Stage, time: f64, patient: &Patient) {}

    /// A patient left the clinic for good.
    fn patient_departed(&mut self, time: f64, patient: &Patient) {}

    /// The run is over; `time` is the final clock value.
    fn simulation_ended(&mut self, time: f64) {}
}

impl ClinicObserver for () {}
