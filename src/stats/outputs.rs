use super::{ClinicObserver, PrevalenceSamplePath};
use crate::entities::{Patient, Stage};

use serde::Serialize;
use std::io;

/// One row of the per-patient report kept while tracing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSummary {
    pub patient: u64,
    pub time_arrived: f64,
    pub time_left: f64,
    pub time_waited: f64,
    pub time_in_system: f64,
}

/// Headline figures of a replication, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub patients_arrived: usize,
    pub patients_served: usize,
    pub patients_received_mh_consult: usize,
    pub ave_time_in_system: Option<f64>,
    pub ave_pcp_waiting_time: Option<f64>,
    pub ave_mh_waiting_time: Option<f64>,
    pub ave_patients_in_system: Option<f64>,
    pub ave_patients_waiting_pcp: Option<f64>,
    pub ave_patients_waiting_mh: Option<f64>,
    pub ave_pcps_busy: Option<f64>,
    pub ave_mhp_busy: Option<f64>,
}

/// Statistics collected over one replication.
///
/// Waiting times are derived from the timestamps the waiting rooms leave on each patient, so they are only read
/// once the patient departs.
#[derive(Debug, Clone)]
pub struct SimOutputs {
    patients_arrived: usize,
    patients_served: usize,
    patients_received_mh_consult: usize,
    time_in_system: Vec<f64>,
    pcp_waiting_time: Vec<f64>,
    mh_waiting_time: Vec<f64>,
    patient_summary: Option<Vec<PatientSummary>>,
    patients_in_system: PrevalenceSamplePath,
    patients_waiting_pcp: PrevalenceSamplePath,
    patients_waiting_mh: PrevalenceSamplePath,
    pcps_busy: PrevalenceSamplePath,
    mhp_busy: PrevalenceSamplePath,
}

impl SimOutputs {
    /// Create an empty collector. With `keep_patient_summary` set, one [`PatientSummary`] row is kept per departure.
    pub fn new(keep_patient_summary: bool) -> Self {
        Self {
            patients_arrived: 0,
            patients_served: 0,
            patients_received_mh_consult: 0,
            time_in_system: Vec::new(),
            pcp_waiting_time: Vec::new(),
            mh_waiting_time: Vec::new(),
            patient_summary: keep_patient_summary.then(Vec::new),
            patients_in_system: PrevalenceSamplePath::new("Number of patients in the urgent care", 0),
            patients_waiting_pcp: PrevalenceSamplePath::new("Number of patients waiting for PCP", 0),
            patients_waiting_mh: PrevalenceSamplePath::new("Number of patients waiting for MHS", 0),
            pcps_busy: PrevalenceSamplePath::new("Utilization of PCP", 0),
            mhp_busy: PrevalenceSamplePath::new("Utilization of Mental Health Specialist", 0),
        }
    }

    /// Patients admitted; arrivals turned away after closing are not counted.
    pub fn patients_arrived(&self) -> usize {
        self.patients_arrived
    }

    /// Patients who have left the clinic.
    pub fn patients_served(&self) -> usize {
        self.patients_served
    }

    /// Departed patients who saw the mental-health physician.
    pub fn patients_received_mh_consult(&self) -> usize {
        self.patients_received_mh_consult
    }

    /// Time in system of every departed patient, in order of departure.
    pub fn time_in_system(&self) -> &[f64] {
        &self.time_in_system
    }

    /// PCP waiting-room time of every departed patient, zero for those seen immediately.
    pub fn pcp_waiting_time(&self) -> &[f64] {
        &self.pcp_waiting_time
    }

    /// MH waiting-room time of every patient who completed a consultation.
    pub fn mh_waiting_time(&self) -> &[f64] {
        &self.mh_waiting_time
    }

    /// Mean of [`time_in_system()`](SimOutputs::time_in_system); `None` before the first departure.
    pub fn ave_time_in_system(&self) -> Option<f64> {
        mean(&self.time_in_system)
    }

    /// Mean PCP waiting-room time over departed patients.
    pub fn ave_pcp_waiting_time(&self) -> Option<f64> {
        mean(&self.pcp_waiting_time)
    }

    /// Mean MH waiting-room time over patients who completed a consultation.
    pub fn ave_mh_waiting_time(&self) -> Option<f64> {
        mean(&self.mh_waiting_time)
    }

    /// Number of patients inside the clinic over time.
    pub fn patients_in_system(&self) -> &PrevalenceSamplePath {
        &self.patients_in_system
    }

    /// Number of patients in the given waiting room over time.
    pub fn patients_waiting(&self, stage: Stage) -> &PrevalenceSamplePath {
        match stage {
            Stage::Primary => &self.patients_waiting_pcp,
            Stage::MentalHealth => &self.patients_waiting_mh,
        }
    }

    /// Number of busy physicians of the given stage over time.
    pub fn physicians_busy(&self, stage: Stage) -> &PrevalenceSamplePath {
        match stage {
            Stage::Primary => &self.pcps_busy,
            Stage::MentalHealth => &self.mhp_busy,
        }
    }

    /// Per-patient rows, if the collector was asked to keep them.
    pub fn patient_summary(&self) -> Option<&[PatientSummary]> {
        self.patient_summary.as_deref()
    }

    /// Snapshot of the headline figures.
    pub fn summary(&self) -> Summary {
        Summary {
            patients_arrived: self.patients_arrived,
            patients_served: self.patients_served,
            patients_received_mh_consult: self.patients_received_mh_consult,
            ave_time_in_system: self.ave_time_in_system(),
            ave_pcp_waiting_time: self.ave_pcp_waiting_time(),
            ave_mh_waiting_time: self.ave_mh_waiting_time(),
            ave_patients_in_system: self.patients_in_system.time_average(),
            ave_patients_waiting_pcp: self.patients_waiting_pcp.time_average(),
            ave_patients_waiting_mh: self.patients_waiting_mh.time_average(),
            ave_pcps_busy: self.pcps_busy.time_average(),
            ave_mhp_busy: self.mhp_busy.time_average(),
        }
    }

    /// Write the per-patient report as CSV. Writes only the header when the report was not kept.
    ///
    /// # Errors
    ///
    /// Fails if the underlying writer does.
    pub fn write_patient_summary<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        match &self.patient_summary {
            Some(rows) if !rows.is_empty() => {
                for row in rows {
                    writer.serialize(row)?;
                }
            },
            _ => writer.write_record(["patient", "time_arrived", "time_left", "time_waited", "time_in_system"])?,
        }
        writer.flush()?;
        Ok(())
    }

    fn waiting_path_mut(&mut self, stage: Stage) -> &mut PrevalenceSamplePath {
        match stage {
            Stage::Primary => &mut self.patients_waiting_pcp,
            Stage::MentalHealth => &mut self.patients_waiting_mh,
        }
    }

    fn busy_path_mut(&mut self, stage: Stage) -> &mut PrevalenceSamplePath {
        match stage {
            Stage::Primary => &mut self.pcps_busy,
            Stage::MentalHealth => &mut self.mhp_busy,
        }
    }
}

impl Default for SimOutputs {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ClinicObserver for SimOutputs {
    fn patient_arrived(&mut self, time: f64, _: &Patient) {
        self.patients_arrived += 1;
        self.patients_in_system.record_increment(time, 1);
    }

    fn joined_waiting_room(&mut self, stage: Stage, time: f64, _: &Patient, _: usize) {
        self.waiting_path_mut(stage).record_increment(time, 1);
    }

    fn left_waiting_room(&mut self, stage: Stage, time: f64, _: &Patient, _: usize) {
        self.waiting_path_mut(stage).record_increment(time, -1);
    }

    fn service_started(&mut self, stage: Stage, time: f64, _: &Patient) {
        self.busy_path_mut(stage).record_increment(time, 1);
    }

    fn service_ended(&mut self, stage: Stage, time: f64, _: &Patient) {
        self.busy_path_mut(stage).record_increment(time, -1);
    }

    fn patient_departed(&mut self, time: f64, patient: &Patient) {
        self.patients_served += 1;
        self.patients_in_system.record_increment(time, -1);

        let time_in_system = patient.time_in_system(time);
        let time_waited = patient.waiting_time(Stage::Primary, time);
        self.time_in_system.push(time_in_system);
        self.pcp_waiting_time.push(time_waited);

        if patient.has_depression() {
            self.patients_received_mh_consult += 1;
            self.mh_waiting_time.push(patient.waiting_time(Stage::MentalHealth, time));
        }

        if let Some(rows) = &mut self.patient_summary {
            rows.push(PatientSummary {
                patient: patient.id(),
                time_arrived: patient.arrival_time(),
                time_left: time,
                time_waited,
                time_in_system,
            });
        }
    }

    fn simulation_ended(&mut self, time: f64) {
        self.patients_in_system.close(time);
        self.patients_waiting_pcp.close(time);
        self.patients_waiting_mh.close(time);
        self.pcps_busy.close(time);
        self.mhp_busy.close(time);
    }
}

fn mean(observations: &[f64]) -> Option<f64> {
    if observations.is_empty() {
        None
    } else {
        Some(observations.iter().sum::<f64>() / observations.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_are_absent_without_observations() {
        let outputs = SimOutputs::default();
        let summary = outputs.summary();
        assert_eq!(0, summary.patients_served);
        assert_eq!(None, summary.ave_time_in_system);
        assert_eq!(None, summary.ave_mh_waiting_time);
        assert!(outputs.patient_summary().is_none());
    }

    #[test]
    fn departure_records_waits_and_summary_row() {
        let mut outputs = SimOutputs::new(true);
        let patient = Patient::new(7, false, 1.0);
        outputs.patient_arrived(1.0, &patient);
        outputs.service_started(Stage::Primary, 1.0, &patient);
        outputs.service_ended(Stage::Primary, 3.0, &patient);
        outputs.patient_departed(3.0, &patient);
        outputs.simulation_ended(4.0);

        assert_eq!(1, outputs.patients_arrived());
        assert_eq!(1, outputs.patients_served());
        assert_eq!(0, outputs.patients_received_mh_consult());
        assert_eq!(&[2.0], outputs.time_in_system());
        assert_eq!(&[0.0], outputs.pcp_waiting_time());
        assert!(outputs.mh_waiting_time().is_empty());
        assert_eq!(Some(0.5), outputs.physicians_busy(Stage::Primary).time_average());
        assert_eq!(
            Some(
                &[PatientSummary {
                    patient: 7,
                    time_arrived: 1.0,
                    time_left: 3.0,
                    time_waited: 0.0,
                    time_in_system: 2.0,
                }][..]
            ),
            outputs.patient_summary()
        );
    }

    #[test]
    fn patient_summary_writes_as_csv() {
        let mut outputs = SimOutputs::new(true);
        outputs.patient_departed(2.5, &Patient::new(1, false, 0.5));

        let mut buffer = Vec::new();
        outputs.write_patient_summary(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            "patient,time_arrived,time_left,time_waited,time_in_system\n1,0.5,2.5,0.0,2.0\n",
            text
        );
    }
}
