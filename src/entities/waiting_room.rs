use super::{Patient, Stage};
use crate::stats::ClinicObserver;
use crate::trace::TraceSink;

use std::collections::VecDeque;

/// First-in, first-out queue of patients waiting for one stage.
#[derive(Debug, Clone)]
pub struct WaitingRoom {
    stage: Stage,
    patients: VecDeque<Patient>,
}

impl WaitingRoom {
    /// An empty waiting room in front of `stage`.
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            patients: VecDeque::new(),
        }
    }

    /// The stage this room feeds.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Seat `patient` at the back of the line, stamping the time the patient joined.
    pub fn enqueue(
        &mut self,
        mut patient: Patient,
        now: f64,
        observer: &mut dyn ClinicObserver,
        trace: &mut dyn TraceSink,
    ) {
        patient.record_joined(self.stage, now);
        observer.joined_waiting_room(self.stage, now, &patient, self.patients.len() + 1);
        trace.message(
            now,
            format_args!(
                "{patient} joins the {} waiting room. Number waiting = {}.",
                self.stage,
                self.patients.len() + 1
            ),
        );
        self.patients.push_back(patient);
    }

    /// Call the patient at the front of the line, stamping the time the patient left.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyWaitingRoom`] if nobody is waiting; the clinic only calls this after checking.
    ///
    /// [`Error::EmptyWaitingRoom`]: crate::Error::EmptyWaitingRoom
    pub fn dequeue_front(
        &mut self,
        now: f64,
        observer: &mut dyn ClinicObserver,
        trace: &mut dyn TraceSink,
    ) -> crate::Result<Patient> {
        let mut patient = self
            .patients
            .pop_front()
            .ok_or(crate::Error::EmptyWaitingRoom(self.stage))?;
        patient.record_left(self.stage, now);
        observer.left_waiting_room(self.stage, now, &patient, self.patients.len());
        trace.message(
            now,
            format_args!(
                "{patient} leaves the {} waiting room. Number waiting = {}.",
                self.stage,
                self.patients.len()
            ),
        );
        Ok(patient)
    }

    /// Number of patients waiting.
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    /// Reports whether nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Waiting patients, front of the line first.
    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.patients.iter()
    }
}
