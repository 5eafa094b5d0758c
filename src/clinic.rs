use crate::calendar::EventCalendar;
use crate::entities::{Discharge, Patient, Physician, PhysicianId, Stage, WaitingRoom};
use crate::events::ClinicEvent;
use crate::sampler::{checked_delay, Distributions, Pcg64};
use crate::stats::{ClinicObserver, SimOutputs};
use crate::trace::{TraceLog, TraceSink};
use crate::{Hours, SimState};

/// The urgent-care clinic: two waiting rooms, a pool of primary-care physicians and one mental-health physician.
///
/// The clinic owns every resource a patient can occupy, together with the random source and the collaborators that
/// record what happens. It is the only place where routing decisions are made; rooms and physicians just report back.
///
/// While open, every arrival is admitted. After the [`ClinicEvent::Close`] event, arrivals keep coming (each one
/// still schedules the next) but are turned away, and everybody already inside is seen to the end.
#[derive(Debug)]
pub struct Clinic<Observer = SimOutputs, Trace = TraceLog> {
    open: bool,
    pcp_room: WaitingRoom,
    mh_room: WaitingRoom,
    pcps: Vec<Physician>,
    mhp: Physician,
    distributions: Distributions,
    rng: Pcg64,
    observer: Observer,
    trace: Trace,
    admitted: usize,
    departed: usize,
    turned_away: usize,
    stop_when_drained: bool,
}

impl<Observer, Trace> Clinic<Observer, Trace>
where
    Observer: ClinicObserver,
    Trace: TraceSink,
{
    /// An open, empty clinic with `n_pcp` primary-care physicians.
    pub fn new(n_pcp: usize, distributions: Distributions, rng: Pcg64, observer: Observer, trace: Trace) -> Self {
        Self {
            open: true,
            pcp_room: WaitingRoom::new(Stage::Primary),
            mh_room: WaitingRoom::new(Stage::MentalHealth),
            pcps: (0..n_pcp).map(Physician::primary_care).collect(),
            mhp: Physician::mental_health(0),
            distributions,
            rng,
            observer,
            trace,
            admitted: 0,
            departed: 0,
            turned_away: 0,
            stop_when_drained: false,
        }
    }

    /// Report the simulation complete once the clinic is closed and nobody is left inside. Without this the run
    /// goes on turning arrivals away until the calendar's horizon.
    #[must_use]
    pub fn with_stop_when_drained(mut self, stop_when_drained: bool) -> Self {
        self.stop_when_drained = stop_when_drained;
        self
    }

    /// Schedule the arrival of the first patient at `time`, drawing the patient's depression flag. Every later
    /// arrival is scheduled by the one before it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackInTime`] if `time` is before the calendar's clock.
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn schedule_first_arrival(
        &mut self,
        calendar: &mut EventCalendar<ClinicEvent, Hours>,
        id: u64,
        time: Hours,
    ) -> crate::Result {
        let has_depression = self.distributions.depression.sample(&mut self.rng);
        let patient = Patient::new(id, has_depression, time.into_inner());
        calendar.schedule(ClinicEvent::Arrival(patient), time)
    }

    /// Whether new arrivals are still admitted.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The waiting room in front of the given stage.
    pub fn waiting_room(&self, stage: Stage) -> &WaitingRoom {
        match stage {
            Stage::Primary => &self.pcp_room,
            Stage::MentalHealth => &self.mh_room,
        }
    }

    /// The PCP pool, in the order arrivals try them.
    pub fn primary_care_physicians(&self) -> &[Physician] {
        &self.pcps
    }

    /// The single mental-health physician.
    pub fn mental_health_physician(&self) -> &Physician {
        &self.mhp
    }

    /// Get a shared reference to the statistics collaborator.
    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Get a shared reference to the trace collaborator.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Hand back the collaborators once the run is over.
    pub fn into_parts(self) -> (Observer, Trace) {
        (self.observer, self.trace)
    }

    /// Patients let in so far.
    pub fn admitted(&self) -> usize {
        self.admitted
    }

    /// Patients who have left after finishing their last service.
    pub fn departed(&self) -> usize {
        self.departed
    }

    /// Arrivals rejected because the clinic was closed.
    pub fn turned_away(&self) -> usize {
        self.turned_away
    }

    /// Patients currently inside: waiting in either room or with a physician.
    pub fn patients_present(&self) -> usize {
        let busy = self.pcps.iter().filter(|pcp| pcp.is_busy()).count() + usize::from(self.mhp.is_busy());
        self.pcp_room.len() + self.mh_room.len() + busy
    }

    /// Whether the head count matches the admissions and departures recorded so far.
    pub fn census_balances(&self) -> bool {
        self.admitted.checked_sub(self.departed) == Some(self.patients_present())
    }

    /// Tell the observer the run ended at `time`.
    pub fn finish(&mut self, time: f64) {
        self.trace.message(time, format_args!("Simulation ended."));
        self.observer.simulation_ended(time);
    }

    fn process_new_patient(
        &mut self,
        patient: Patient,
        calendar: &mut EventCalendar<ClinicEvent, Hours>,
    ) -> crate::Result {
        let now = calendar.current_time().into_inner();
        self.trace.message(now, format_args!("Processing arrival of {patient}."));
        let next_id = patient.id() + 1;

        if self.open {
            self.admitted += 1;
            self.observer.patient_arrived(now, &patient);

            if !self.pcp_room.is_empty() {
                self.pcp_room.enqueue(patient, now, &mut self.observer, &mut self.trace);
            } else if let Some(pcp) = self.pcps.iter_mut().find(|pcp| !pcp.is_busy()) {
                pcp.begin_service(
                    patient,
                    self.distributions.exam.as_ref(),
                    &mut self.rng,
                    calendar,
                    &mut self.observer,
                    &mut self.trace,
                )?;
            } else {
                self.pcp_room.enqueue(patient, now, &mut self.observer, &mut self.trace);
            }
        } else {
            self.turned_away += 1;
            tracing::debug!(patient = patient.id(), time = now, "clinic is closed, arrival turned away");
            self.trace.message(
                now,
                format_args!("Urgent care is closed. {patient} does not get admitted."),
            );
        }

        let delay = checked_delay("inter-arrival", self.distributions.inter_arrival.sample(&mut self.rng))?;
        let has_depression = self.distributions.depression.sample(&mut self.rng);
        let next_arrival_time = *calendar.current_time() + delay;
        let next_patient = Patient::new(next_id, has_depression, next_arrival_time.into_inner());
        calendar.schedule(ClinicEvent::Arrival(next_patient), next_arrival_time)
    }

    fn process_end_of_exam(&mut self, pcp: usize, calendar: &mut EventCalendar<ClinicEvent, Hours>) -> crate::Result {
        let now = calendar.current_time().into_inner();
        let physician = self.pcps.get_mut(pcp).ok_or(crate::Error::ServerIdle(PhysicianId {
            stage: Stage::Primary,
            index: pcp,
        }))?;
        self.trace.message(now, format_args!("Processing end of exam in {}.", physician.id()));

        match physician.end_service(now, &mut self.observer, &mut self.trace)? {
            Discharge::Departed(_) => self.departed += 1,
            Discharge::Referred(patient) => self.refer_to_mental_health(patient, calendar)?,
        }

        if !self.pcp_room.is_empty() {
            let next = self.pcp_room.dequeue_front(now, &mut self.observer, &mut self.trace)?;
            self.pcps[pcp].begin_service(
                next,
                self.distributions.exam.as_ref(),
                &mut self.rng,
                calendar,
                &mut self.observer,
                &mut self.trace,
            )?;
        }
        Ok(())
    }

    fn refer_to_mental_health(
        &mut self,
        patient: Patient,
        calendar: &mut EventCalendar<ClinicEvent, Hours>,
    ) -> crate::Result {
        if self.mhp.is_busy() {
            let now = calendar.current_time().into_inner();
            self.mh_room.enqueue(patient, now, &mut self.observer, &mut self.trace);
            Ok(())
        } else {
            self.mhp.begin_service(
                patient,
                self.distributions.mh_consult.as_ref(),
                &mut self.rng,
                calendar,
                &mut self.observer,
                &mut self.trace,
            )
        }
    }

    fn process_end_of_consultation(&mut self, calendar: &mut EventCalendar<ClinicEvent, Hours>) -> crate::Result {
        let now = calendar.current_time().into_inner();
        self.trace.message(
            now,
            format_args!("Processing end of mental health consult in {}.", self.mhp.id()),
        );

        let discharge = self.mhp.end_service(now, &mut self.observer, &mut self.trace)?;
        debug_assert!(matches!(discharge, Discharge::Departed(_)));
        self.departed += 1;

        if !self.mh_room.is_empty() {
            let next = self.mh_room.dequeue_front(now, &mut self.observer, &mut self.trace)?;
            self.mhp.begin_service(
                next,
                self.distributions.mh_consult.as_ref(),
                &mut self.rng,
                calendar,
                &mut self.observer,
                &mut self.trace,
            )?;
        }
        Ok(())
    }

    fn process_close(&mut self, now: f64) {
        if !self.open {
            return;
        }
        self.trace.message(now, format_args!("Processing the closing of the urgent care."));
        self.open = false;
        tracing::debug!(
            time = now,
            admitted = self.admitted,
            still_inside = self.patients_present(),
            "clinic closed to new arrivals"
        );
    }
}

impl<Observer, Trace> SimState<Hours> for Clinic<Observer, Trace>
where
    Observer: ClinicObserver,
    Trace: TraceSink,
{
    type Event = ClinicEvent;

    fn handle(&mut self, event: ClinicEvent, calendar: &mut EventCalendar<ClinicEvent, Hours>) -> crate::Result {
        match event {
            ClinicEvent::Arrival(patient) => self.process_new_patient(patient, calendar),
            ClinicEvent::EndOfExam { pcp } => self.process_end_of_exam(pcp, calendar),
            ClinicEvent::EndOfMentalHealthConsult => self.process_end_of_consultation(calendar),
            ClinicEvent::Close => {
                self.process_close(calendar.current_time().into_inner());
                Ok(())
            },
        }
    }

    fn is_complete(&self, _: &Hours) -> bool {
        self.stop_when_drained && !self.open && self.patients_present() == 0
    }
}
