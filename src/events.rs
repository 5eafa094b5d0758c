use crate::entities::Patient;
use crate::Prioritized;

/// Priority rank of an end-of-mental-health-consult event. Completions go first so that servers are freed before
/// anything else happening at the same instant is considered.
pub const END_OF_MH_CONSULT: u8 = 0;
/// Priority rank of an end-of-exam event.
pub const END_OF_EXAM: u8 = 1;
/// Priority rank of an arrival event.
pub const ARRIVAL: u8 = 2;
/// Priority rank of the closing event. Last, so that completions and arrivals due at the closing instant are still
/// processed as if the clinic were open.
pub const CLOSE: u8 = 3;

/// Everything that can happen in the clinic.
#[derive(Debug, Clone, PartialEq)]
pub enum ClinicEvent {
    /// A patient walks in. The patient is created when the previous arrival is processed.
    Arrival(Patient),
    /// The primary-care physician at index `pcp` finishes an exam.
    EndOfExam { pcp: usize },
    /// The mental-health physician finishes a consultation.
    EndOfMentalHealthConsult,
    /// The clinic stops admitting new patients.
    Close,
}

impl Prioritized for ClinicEvent {
    fn priority(&self) -> u8 {
        match self {
            ClinicEvent::EndOfMentalHealthConsult => END_OF_MH_CONSULT,
            ClinicEvent::EndOfExam { .. } => END_OF_EXAM,
            ClinicEvent::Arrival(_) => ARRIVAL,
            ClinicEvent::Close => CLOSE,
        }
    }
}
