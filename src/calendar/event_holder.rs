use crate::SimTime;
use std::cmp::Ordering;

/// Helper struct for the event calendar. This struct holds the event itself alongside the data necessary to sort
/// events within the priority queue, namely the execution time, the event kind's priority rank and a record of the
/// event's insertion sequence.
///
/// The implementation of [`Ord`] on this struct compares execution times first, then priority ranks, and only
/// compares insertion sequences to break whatever ties remain.
#[derive(Debug)]
pub(super) struct EventHolder<Event, Time>
where
    Time: SimTime,
{
    pub execution_time: Time,
    pub priority: u8,
    pub insertion_sequence: usize,
    pub event: Event,
}

impl<Event, Time> PartialEq<Self> for EventHolder<Event, Time>
where
    Time: SimTime,
{
    fn eq(&self, other: &Self) -> bool {
        self.insertion_sequence == other.insertion_sequence
            && self.priority == other.priority
            && self.execution_time == other.execution_time
    }
}

impl<Event, Time> Eq for EventHolder<Event, Time> where Time: SimTime {}

impl<Event, Time> PartialOrd<Self> for EventHolder<Event, Time>
where
    Time: SimTime,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Event, Time> Ord for EventHolder<Event, Time>
where
    Time: SimTime,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.execution_time
            .cmp(&other.execution_time)
            .then_with(|| self.priority.cmp(&other.priority))
            .then_with(|| self.insertion_sequence.cmp(&other.insertion_sequence))
    }
}
