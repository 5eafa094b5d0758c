//! # Overview
//!
//! clinic-des simulates patient flow through an urgent-care clinic as a discrete-event simulation. Patients arrive
//! at random, wait for and receive an exam from one of several primary-care physicians (PCPs), and those diagnosed
//! with depression go on to a single mental-health physician (MHP) before leaving. After a fixed number of open
//! hours the clinic stops admitting new arrivals but keeps serving everybody already inside.
//!
//! The crate is built from three layers:
//!
//! * A small simulation engine. The [`EventCalendar`] orders pending events by execution time, then by a fixed
//!   per-kind priority rank, then by insertion order, and refuses to schedule anything in the past. The
//!   [`Simulation`] runner pairs a calendar with a [`SimState`] and feeds it events one at a time until the calendar
//!   empties, the state reports completion, or the next event lies beyond the time horizon.
//! * The clinic model. [`Clinic`] implements [`SimState`] over the [`ClinicEvent`] enum and owns the two
//!   [`WaitingRoom`]s and all [`Physician`]s; it is the only place where patients are routed.
//! * Pluggable collaborators. Durations and the depression flag come from [`sampler`] traits, every transition is
//!   reported to a [`ClinicObserver`] (such as [`SimOutputs`]) and narrated to a [`TraceSink`] (such as
//!   [`TraceLog`]), and the whole model is parameterized by an immutable [`ClinicConfig`].
//!
//! Execution is single-threaded. Events that share an execution time are processed one after another in rank order:
//! end of mental-health consult, end of exam, arrival, closure. Any broken contract inside the event loop surfaces
//! as an [`Error`] from [`Simulation::run()`], which stops at once.
//!
//! # Example
//!
//! ```no_run
//! use clinic_des::{ClinicConfig, UrgentCareModel};
//!
//! let model = UrgentCareModel::new(ClinicConfig::default())?;
//! let replication = model.simulate(42)?;
//! println!("served {}", replication.outputs.patients_served());
//! # Ok::<(), clinic_des::Error>(())
//! ```
//!
//! [`EventCalendar`]: calendar::EventCalendar
//! [`WaitingRoom`]: entities::WaitingRoom
//! [`Physician`]: entities::Physician
//! [`ClinicObserver`]: stats::ClinicObserver
//! [`SimOutputs`]: stats::SimOutputs
//! [`TraceSink`]: trace::TraceSink
//! [`TraceLog`]: trace::TraceLog

#![forbid(unsafe_code)]

pub mod calendar;
mod clinic;
pub mod config;
pub mod entities;
mod error;
mod events;
mod generic_parameters;
mod model;
pub mod sampler;
mod simulation;
pub mod stats;
pub mod trace;

pub use clinic::Clinic;
pub use config::{load_config, ClinicConfig};
pub use error::{Error, Result};
pub use events::{ClinicEvent, ARRIVAL, CLOSE, END_OF_EXAM, END_OF_MH_CONSULT};
pub use generic_parameters::{Prioritized, SimState, SimTime};
pub use model::{Replication, UrgentCareModel, FIRST_PATIENT_ID};
pub use simulation::Simulation;

/// Simulated clock of the clinic, in hours.
pub type Hours = ordered_float::NotNan<f64>;
