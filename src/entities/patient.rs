use super::Stage;

use std::fmt::{Display, Formatter};

/// A single visit to the clinic.
///
/// Patients are plain owned values: the clinic moves each one from the arrival event into a waiting room or onto a
/// physician and back out again, so a patient can never be in two places at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    id: u64,
    has_depression: bool,
    arrival_time: f64,
    joined_pcp_room: Option<f64>,
    left_pcp_room: Option<f64>,
    joined_mh_room: Option<f64>,
    left_mh_room: Option<f64>,
}

impl Patient {
    /// A patient who has not yet been in any waiting room.
    pub fn new(id: u64, has_depression: bool, arrival_time: f64) -> Self {
        Self {
            id,
            has_depression,
            arrival_time,
            joined_pcp_room: None,
            left_pcp_room: None,
            joined_mh_room: None,
            left_mh_room: None,
        }
    }

    /// Identifier, unique within a replication and increasing with arrival order.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the exam will end in a referral to the mental-health physician.
    pub fn has_depression(&self) -> bool {
        self.has_depression
    }

    /// Time the patient walked in.
    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    /// Time the patient sat down in the given waiting room, if ever.
    pub fn joined_room(&self, stage: Stage) -> Option<f64> {
        match stage {
            Stage::Primary => self.joined_pcp_room,
            Stage::MentalHealth => self.joined_mh_room,
        }
    }

    /// Time the patient was called out of the given waiting room, if ever.
    pub fn left_room(&self, stage: Stage) -> Option<f64> {
        match stage {
            Stage::Primary => self.left_pcp_room,
            Stage::MentalHealth => self.left_mh_room,
        }
    }

    pub(super) fn record_joined(&mut self, stage: Stage, time: f64) {
        match stage {
            Stage::Primary => self.joined_pcp_room = Some(time),
            Stage::MentalHealth => self.joined_mh_room = Some(time),
        }
    }

    pub(super) fn record_left(&mut self, stage: Stage, time: f64) {
        match stage {
            Stage::Primary => self.left_pcp_room = Some(time),
            Stage::MentalHealth => self.left_mh_room = Some(time),
        }
    }

    /// Time spent in the given stage's waiting room, zero if the patient never sat there. A patient still waiting
    /// is counted up to `now`.
    pub fn waiting_time(&self, stage: Stage, now: f64) -> f64 {
        match self.joined_room(stage) {
            None => 0.0,
            Some(joined) => self.left_room(stage).unwrap_or(now) - joined,
        }
    }

    /// Time between arrival and `departure`.
    pub fn time_in_system(&self, departure: f64) -> f64 {
        departure - self.arrival_time
    }
}

impl Display for Patient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Patient {}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_time_defaults_to_zero() {
        let patient = Patient::new(3, false, 1.5);
        assert_eq!(0.0, patient.waiting_time(Stage::Primary, 10.0));
        assert_eq!(0.0, patient.waiting_time(Stage::MentalHealth, 10.0));
        assert_eq!(8.5, patient.time_in_system(10.0));
        assert_eq!("Patient 3", patient.to_string());
    }

    #[test]
    fn waiting_time_spans_join_to_leave() {
        let mut patient = Patient::new(1, true, 0.0);
        patient.record_joined(Stage::MentalHealth, 2.0);
        assert_eq!(3.0, patient.waiting_time(Stage::MentalHealth, 5.0), "open stay should run to now");

        patient.record_left(Stage::MentalHealth, 4.5);
        assert_eq!(2.5, patient.waiting_time(Stage::MentalHealth, 9.0));
        assert_eq!(None, patient.joined_room(Stage::Primary));
    }
}
