use super::{Patient, Stage};
use crate::calendar::EventCalendar;
use crate::events::ClinicEvent;
use crate::sampler::{checked_delay, DurationSampler};
use crate::stats::ClinicObserver;
use crate::trace::TraceSink;
use crate::Hours;

use rand::RngCore;
use std::fmt::{Display, Formatter};

/// Which physician, for messages and errors: the stage served and the index within that stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicianId {
    pub stage: Stage,
    pub index: usize,
}

impl Display for PhysicianId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.stage {
            Stage::Primary => write!(f, "PCP {}", self.index),
            Stage::MentalHealth => write!(f, "MHP {}", self.index),
        }
    }
}

/// Where a patient goes once a physician is done.
#[derive(Debug, Clone, PartialEq)]
pub enum Discharge {
    /// The patient left the clinic. Departure statistics have already been recorded.
    Departed(Patient),
    /// The exam found depression; the patient still needs a mental-health consultation.
    Referred(Patient),
}

/// A server that examines one patient at a time.
///
/// The physician is busy exactly when it holds a patient. It knows nothing about the clinic around it: starting a
/// service schedules its own completion event on the calendar it is handed, and ending one returns a [`Discharge`]
/// for the clinic to route.
#[derive(Debug, Clone)]
pub struct Physician {
    id: PhysicianId,
    patient: Option<Patient>,
}

impl Physician {
    /// A primary-care physician; `index` is its position in the clinic's pool.
    pub fn primary_care(index: usize) -> Self {
        Self {
            id: PhysicianId {
                stage: Stage::Primary,
                index,
            },
            patient: None,
        }
    }

    /// A mental-health physician; the clinic has exactly one, at index 0.
    pub fn mental_health(index: usize) -> Self {
        Self {
            id: PhysicianId {
                stage: Stage::MentalHealth,
                index,
            },
            patient: None,
        }
    }

    /// Stage and index of this physician.
    pub fn id(&self) -> PhysicianId {
        self.id
    }

    /// Whether a patient is being served.
    pub fn is_busy(&self) -> bool {
        self.patient.is_some()
    }

    /// The patient currently being served, if any.
    pub fn patient(&self) -> Option<&Patient> {
        self.patient.as_ref()
    }

    fn completion_event(&self) -> ClinicEvent {
        match self.id.stage {
            Stage::Primary => ClinicEvent::EndOfExam { pcp: self.id.index },
            Stage::MentalHealth => ClinicEvent::EndOfMentalHealthConsult,
        }
    }

    /// Start serving `patient` now and schedule the end of the service after a duration drawn from `service_time`.
    ///
    /// # Errors
    ///
    /// * [`Error::ServerBusy`] if a patient is already being served; nothing changes.
    /// * [`Error::InvalidDuration`] if the sampler returns a negative or NaN duration.
    /// * [`Error::BackInTime`] if the calendar rejects the completion event.
    ///
    /// [`Error::ServerBusy`]: crate::Error::ServerBusy
    /// [`Error::InvalidDuration`]: crate::Error::InvalidDuration
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn begin_service(
        &mut self,
        patient: Patient,
        service_time: &dyn DurationSampler,
        rng: &mut dyn RngCore,
        calendar: &mut EventCalendar<ClinicEvent, Hours>,
        observer: &mut dyn ClinicObserver,
        trace: &mut dyn TraceSink,
    ) -> crate::Result {
        if let Some(current) = &self.patient {
            return Err(crate::Error::ServerBusy {
                physician: self.id,
                patient: current.id(),
            });
        }

        let what = match self.id.stage {
            Stage::Primary => "exam",
            Stage::MentalHealth => "mental health consult",
        };
        let delay = checked_delay(what, service_time.sample(rng))?;

        let now = calendar.current_time().into_inner();
        trace.message(now, format_args!("{patient} starts service in {}.", self.id));
        observer.service_started(self.id.stage, now, &patient);
        self.patient = Some(patient);

        calendar.schedule_with_delay(self.completion_event(), delay)
    }

    /// Release the patient being served.
    ///
    /// A primary-care patient without depression, and every mental-health patient, leaves the clinic here and is
    /// reported as departed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServerIdle`] if nobody is being served.
    ///
    /// [`Error::ServerIdle`]: crate::Error::ServerIdle
    pub fn end_service(
        &mut self,
        now: f64,
        observer: &mut dyn ClinicObserver,
        trace: &mut dyn TraceSink,
    ) -> crate::Result<Discharge> {
        let patient = self.patient.take().ok_or(crate::Error::ServerIdle(self.id))?;
        observer.service_ended(self.id.stage, now, &patient);

        if self.id.stage == Stage::Primary && patient.has_depression() {
            trace.message(now, format_args!("{patient} is referred from {} to mental health.", self.id));
            return Ok(Discharge::Referred(patient));
        }

        observer.patient_departed(now, &patient);
        trace.message(now, format_args!("{patient} leaves {}.", self.id));
        Ok(Discharge::Departed(patient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{Constant, Pcg64};
    use crate::Error;
    use ordered_float::NotNan;
    use rand::SeedableRng;

    fn hours(value: f64) -> Hours {
        NotNan::new(value).unwrap()
    }

    fn calendar_at(time: f64) -> EventCalendar<ClinicEvent, Hours> {
        let mut calendar = EventCalendar::new(hours(0.0));
        calendar.schedule(ClinicEvent::Close, hours(time)).unwrap();
        calendar.advance();
        calendar
    }

    #[test]
    fn service_schedules_its_own_completion() {
        let mut pcp = Physician::primary_care(2);
        let mut calendar = calendar_at(1.0);
        let mut rng = Pcg64::seed_from_u64(0);

        pcp.begin_service(Patient::new(1, false, 1.0), &Constant(3.0), &mut rng, &mut calendar, &mut (), &mut ())
            .unwrap();

        assert!(pcp.is_busy());
        assert_eq!(Some(1), pcp.patient().map(Patient::id));
        assert_eq!(Some(&hours(4.0)), calendar.peek_time());
        assert_eq!(Some(ClinicEvent::EndOfExam { pcp: 2 }), calendar.advance());
    }

    #[test]
    fn busy_physician_refuses_a_second_patient() {
        let mut mhp = Physician::mental_health(0);
        let mut calendar = calendar_at(0.0);
        let mut rng = Pcg64::seed_from_u64(0);
        mhp.begin_service(Patient::new(1, true, 0.0), &Constant(1.0), &mut rng, &mut calendar, &mut (), &mut ())
            .unwrap();

        let result =
            mhp.begin_service(Patient::new(2, true, 0.0), &Constant(1.0), &mut rng, &mut calendar, &mut (), &mut ());
        assert!(matches!(result, Err(Error::ServerBusy { patient: 1, .. })));
        assert_eq!(Some(1), mhp.patient().map(Patient::id), "first patient should still be served");
        assert_eq!(1, calendar.len());
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut pcp = Physician::primary_care(0);
        let mut calendar = calendar_at(0.0);
        let mut rng = Pcg64::seed_from_u64(0);
        let result =
            pcp.begin_service(Patient::new(1, false, 0.0), &Constant(-0.5), &mut rng, &mut calendar, &mut (), &mut ());
        assert!(matches!(result, Err(Error::InvalidDuration { what: "exam", .. })));
    }

    #[test]
    fn idle_physician_has_nobody_to_release() {
        let mut pcp = Physician::primary_care(1);
        assert!(matches!(pcp.end_service(0.0, &mut (), &mut ()), Err(Error::ServerIdle(id)) if id.index == 1));
    }

    #[test]
    fn depressed_patients_are_referred_by_primary_care_only() {
        let mut calendar = calendar_at(0.0);
        let mut rng = Pcg64::seed_from_u64(0);

        let mut pcp = Physician::primary_care(0);
        pcp.begin_service(Patient::new(1, true, 0.0), &Constant(1.0), &mut rng, &mut calendar, &mut (), &mut ())
            .unwrap();
        assert!(matches!(pcp.end_service(1.0, &mut (), &mut ()), Ok(Discharge::Referred(_))));
        assert!(!pcp.is_busy());

        pcp.begin_service(Patient::new(2, false, 0.0), &Constant(1.0), &mut rng, &mut calendar, &mut (), &mut ())
            .unwrap();
        assert!(matches!(pcp.end_service(1.0, &mut (), &mut ()), Ok(Discharge::Departed(_))));

        let mut mhp = Physician::mental_health(0);
        mhp.begin_service(Patient::new(1, true, 0.0), &Constant(1.0), &mut rng, &mut calendar, &mut (), &mut ())
            .unwrap();
        assert!(matches!(mhp.end_service(1.0, &mut (), &mut ()), Ok(Discharge::Departed(_))));
        assert_eq!("MHP 0", mhp.id().to_string());
    }
}
