use crate::config::ConfigError;
use crate::entities::{PhysicianId, Stage};

/// Errors that may be encountered while executing
/// a simulation.
///
/// Every variant except [`Config`] describes a broken
/// contract somewhere inside the event loop: the
/// simulation is closed-world and deterministic, so
/// none of these conditions is expected at runtime and
/// none of them is retried. [`Simulation::run()`]
/// stops at the first one and hands it back unchanged.
///
/// The [`BackInTime`] variant originates from the
/// [`EventCalendar`] to indicate that an event's
/// scheduled execution time is prior to the calendar's
/// current time. This error likely corresponds to a
/// logical bug, e.g. forgetting to add an offset to
/// the current time when scheduling a new event.
///
/// [`EventCalendar`]: crate::calendar::EventCalendar
/// [`Simulation::run()`]: crate::Simulation::run
/// [`BackInTime`]: Error::BackInTime
/// [`Config`]: Error::Config
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The event calendar rejected an event that would
    /// have been scheduled for a time that has
    /// already passed.
    #[error("event execution time is less than current simulation time")]
    BackInTime,
    /// A patient was requested from a waiting room that
    /// holds nobody.
    #[error("cannot take the next patient from the empty {0} waiting room")]
    EmptyWaitingRoom(Stage),
    /// Service was started on a physician who is still
    /// examining somebody else.
    #[error("{physician} is already serving patient {patient}")]
    ServerBusy { physician: PhysicianId, patient: u64 },
    /// Service was ended on a physician with nobody in
    /// the room.
    #[error("{0} has no patient to release")]
    ServerIdle(PhysicianId),
    /// A sampler produced a duration that cannot be
    /// added to the clock.
    #[error("sampled {what} duration {value} is not a non-negative number")]
    InvalidDuration { what: &'static str, value: f64 },
    /// The configuration was rejected before the run
    /// started.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// [`std::result::Result`]`<T, `[`clinic_des::Error`]`>`
///
/// A type alias that simplifies the signatures of
/// various functions in this crate. Most event-loop
/// operations return nothing on success, hence the
/// default.
///
/// [`clinic_des::Error`]: Error
pub type Result<T = ()> = std::result::Result<T, Error>;
