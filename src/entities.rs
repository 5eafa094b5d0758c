//! The things that move and the things that hold them: patients, the two waiting rooms, and the physicians.
//!
//! None of these types knows about the clinic. Each one exposes the handful of operations the clinic needs, reports
//! every transition to the statistics and trace collaborators it is handed, and returns results for the clinic to
//! route.

mod patient;
mod physician;
mod waiting_room;

pub use patient::Patient;
pub use physician::{Discharge, Physician, PhysicianId};
pub use waiting_room::WaitingRoom;

use std::fmt::{Display, Formatter};

/// One of the two queueing stages a patient can pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Examination by a primary-care physician. Every admitted patient goes through it.
    Primary,
    /// Consultation with the mental-health physician, for patients diagnosed with depression.
    MentalHealth,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Primary => write!(f, "PCP"),
            Stage::MentalHealth => write!(f, "MH"),
        }
    }
}
