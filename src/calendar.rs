mod event_holder;

use crate::{Prioritized, SimTime};
use event_holder::EventHolder;

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::Add;

/// Priority queue of scheduled events, and owner of the simulation clock.
///
/// Events will execute in ascending order of execution time. Events sharing an execution time execute in ascending
/// order of their [`Prioritized::priority()`] rank, and events sharing both execute in the order in which they were
/// scheduled. The third tiebreaker keeps the observed order of execution stable for a fixed seed.
///
/// This struct is generic over the type used to represent clock time for the sake of tracking the current time, as
/// well as over the event type so that it can hold a plain enum by value rather than boxed trait objects.
///
/// Every scheduling method compares the desired execution time against the current clock time. Attempting to
/// schedule an event for a time that is already past will result in an [`Error::BackInTime`] without modifying the
/// calendar. There is no way around this check: rewinding the clock is always a defect in this model.
///
/// [`Error::BackInTime`]: crate::Error::BackInTime
#[derive(Debug, Default)]
pub struct EventCalendar<Event, Time>
where
    Time: SimTime,
{
    events: BinaryHeap<Reverse<EventHolder<Event, Time>>>,
    last_execution_time: Time,
    events_added: usize,
}

impl<Event, Time> EventCalendar<Event, Time>
where
    Event: Prioritized,
    Time: SimTime,
{
    /// Construct a new [`EventCalendar`] with no scheduled events and a clock initialized to the provided time.
    pub fn new(start_time: Time) -> Self {
        Self {
            events: BinaryHeap::default(),
            last_execution_time: start_time,
            events_added: 0,
        }
    }

    /// Schedule the provided event at the specified time.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time on `self`, returns an [`Error::BackInTime`] to indicate the
    /// presence of a logical bug at the call site, with no modifications to the calendar.
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn schedule(&mut self, event: Event, time: Time) -> crate::Result {
        if time < self.last_execution_time {
            tracing::error!(
                scheduled = ?time,
                now = ?self.last_execution_time,
                "refusing to schedule an event in the past"
            );
            return Err(crate::Error::BackInTime);
        }

        let insertion_sequence = self.increment_event_count();
        self.events.push(Reverse(EventHolder {
            execution_time: time,
            priority: event.priority(),
            insertion_sequence,
            event,
        }));
        Ok(())
    }

    /// Helper function to make sure incrementing the internal count of added events occurs the same way across all
    /// scheduling methods.
    fn increment_event_count(&mut self) -> usize {
        let count = self.events_added;
        self.events_added += 1;
        count
    }

    /// Reports whether any event remains to be processed.
    pub fn has_next(&self) -> bool {
        !self.events.is_empty()
    }

    /// Remove the earliest-ordered event from the calendar, updating the current clock time to match its execution
    /// time. Returns `None` without touching the clock when the calendar is empty.
    pub fn advance(&mut self) -> Option<Event> {
        let Reverse(holder) = self.events.pop()?;
        self.last_execution_time = holder.execution_time;
        Some(holder.event)
    }

    /// Get a shared reference to the execution time of the next event, if any, without removing it.
    pub fn peek_time(&self) -> Option<&Time> {
        self.events.peek().map(|Reverse(holder)| &holder.execution_time)
    }

    /// Get a shared reference to the simulation's current clock time.
    pub fn current_time(&self) -> &Time {
        &self.last_execution_time
    }

    /// Number of events still waiting to execute.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Reports whether no event remains; the negation of [`has_next()`](EventCalendar::has_next).
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total number of events ever scheduled on this calendar.
    pub fn events_scheduled(&self) -> usize {
        self.events_added
    }
}

impl<Event, Time> EventCalendar<Event, Time>
where
    Event: Prioritized,
    Time: SimTime + Clone,
{
    /// Schedule the provided event to execute at the current sim time. Events previously scheduled for "now" with
    /// the same priority rank will still execute before this event does.
    ///
    /// # Errors
    ///
    /// If the result of calling [`Clone::clone`] on the current sim time results in a new value that is somehow less
    /// than the current sim time, this method will return an [`Error::BackInTime`].
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn schedule_now(&mut self, event: Event) -> crate::Result {
        let event_time = self.last_execution_time.clone();
        self.schedule(event, event_time)
    }
}

impl<Event, Time> EventCalendar<Event, Time>
where
    Event: Prioritized,
    Time: SimTime + Clone + Add<Output = Time>,
{
    /// Schedule the provided event after the specified delay. The event's execution time will be equal to the
    /// result of `self.current_time().clone() + delay`.
    ///
    /// # Errors
    ///
    /// If the calculated execution time is less than the current clock time on `self`, returns an
    /// [`Error::BackInTime`] with no modifications to the calendar.
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn schedule_with_delay(&mut self, event: Event, delay: Time) -> crate::Result {
        let event_time = self.last_execution_time.clone() + delay;
        self.schedule(event, event_time)
    }
}

impl<Event, Time> std::fmt::Display for EventCalendar<Event, Time>
where
    Time: SimTime,
{
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventCalendar with {} scheduled events at current time {:?}",
            self.events.len(),
            self.last_execution_time
        )
    }
}
