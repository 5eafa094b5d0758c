use crate::clinic::Clinic;
use crate::config::ClinicConfig;
use crate::events::ClinicEvent;
use crate::sampler::{checked_delay, Distributions, Pcg64};
use crate::stats::SimOutputs;
use crate::trace::TraceLog;
use crate::{Hours, Simulation};

use rand::SeedableRng;

/// Identifier given to the first patient of every replication.
pub const FIRST_PATIENT_ID: u64 = 1;

/// Everything a finished replication leaves behind.
#[derive(Debug)]
pub struct Replication {
    pub outputs: SimOutputs,
    pub trace: TraceLog,
    /// Clock value of the last processed event.
    pub end_time: f64,
    pub events_processed: usize,
    /// Arrivals generated after closing and turned away.
    pub turned_away: usize,
}

/// Runs replications of the urgent-care clinic described by a [`ClinicConfig`].
#[derive(Debug, Clone, Default)]
pub struct UrgentCareModel {
    config: ClinicConfig,
}

impl UrgentCareModel {
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration does not validate.
    ///
    /// [`Error::Config`]: crate::Error::Config
    pub fn new(config: ClinicConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration every replication is built from.
    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    /// Simulate one replication with exponential inter-arrival, exam and consultation times.
    ///
    /// The clinic closes after `hours_open`; the first patient walks in at time zero. The run stops once the
    /// next event lies beyond `sim_duration`, or earlier if `stop_when_drained` is set and the closed clinic is
    /// empty.
    ///
    /// # Errors
    ///
    /// Any error from the event loop is returned as-is; see [`Error`](crate::Error).
    pub fn simulate(&self, seed: u64) -> crate::Result<Replication> {
        let distributions = Distributions::from_parameters(&self.config.clinic)?;
        self.simulate_with(distributions, seed)
    }

    /// Simulate one replication drawing from the given samplers instead of the exponential ones.
    ///
    /// # Errors
    ///
    /// Any error from the event loop is returned as-is; see [`Error`](crate::Error).
    pub fn simulate_with(&self, distributions: Distributions, seed: u64) -> crate::Result<Replication> {
        let clinic_params = &self.config.clinic;
        let settings = &self.config.simulation;
        tracing::info!(
            seed,
            n_pcp = clinic_params.n_pcp,
            hours_open = clinic_params.hours_open,
            "starting replication"
        );

        let clinic = Clinic::new(
            clinic_params.n_pcp,
            distributions,
            Pcg64::seed_from_u64(seed),
            SimOutputs::new(settings.trace_on || settings.patient_summary),
            TraceLog::new(settings.trace_on, settings.trace_decimals),
        )
        .with_stop_when_drained(settings.stop_when_drained);
        let start = Hours::default();
        let horizon = checked_delay("simulation", settings.sim_duration)?;
        let mut sim = Simulation::new(clinic, start).with_horizon(horizon);

        let (clinic, calendar) = sim.parts_mut();
        calendar.schedule(ClinicEvent::Close, start + checked_delay("opening", clinic_params.hours_open)?)?;
        clinic.schedule_first_arrival(calendar, FIRST_PATIENT_ID, start)?;

        sim.run()?;

        let end_time = sim.current_time().into_inner();
        let events_processed = sim.events_processed();
        let mut clinic = sim.into_state();
        clinic.finish(end_time);
        let turned_away = clinic.turned_away();
        let (outputs, trace) = clinic.into_parts();

        tracing::info!(
            end_time,
            events_processed,
            arrived = outputs.patients_arrived(),
            served = outputs.patients_served(),
            "replication finished"
        );
        Ok(Replication {
            outputs,
            trace,
            end_time,
            events_processed,
            turned_away,
        })
    }
}

