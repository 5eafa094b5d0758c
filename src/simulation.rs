use crate::calendar::EventCalendar;
use crate::{SimState, SimTime};

use std::fmt::{Debug, Formatter};

/// Contains the event calendar and other state belonging to a simulation.
///
/// A [`Simulation`] owns both its state and its calendar, providing both shared and mutable access to each so
/// clients can set up and tear down instances as needed - for example, scheduling initial events or reading the
/// final statistics.
///
/// The expected workflow for a Simulation is:
///
/// 1. Initialize a struct that implements [`SimState`].
/// 2. Pass this struct and the start time to [`new()`], optionally bounding the run with [`with_horizon()`].
/// 3. Schedule at least one initial event.
/// 4. Call [`run()`]. Handle any error it might return.
/// 5. Use the [`state()`] or [`into_state()`] accessors to finish processing the results.
///
/// [`new()`]: Simulation::new
/// [`with_horizon()`]: Simulation::with_horizon
/// [`run()`]: Simulation::run
/// [`state()`]: Simulation::state
/// [`into_state()`]: Simulation::into_state
pub struct Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// Events that have been scheduled to execute, ordered by execution time then priority rank.
    calendar: EventCalendar<State::Event, Time>,
    /// The current shared state of the Simulation. Exclusive access will be granted for each event that executes.
    state: State,
    /// Events scheduled strictly after this time are never executed.
    horizon: Option<Time>,
    events_processed: usize,
}

impl<State, Time> Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// Initialize a Simulation instance with the provided starting state and a calendar with clock set to the
    /// provided starting time. The run is unbounded until [`with_horizon()`] says otherwise.
    ///
    /// [`with_horizon()`]: Simulation::with_horizon
    pub fn new(initial_state: State, start_time: Time) -> Self {
        Self {
            calendar: EventCalendar::new(start_time),
            state: initial_state,
            horizon: None,
            events_processed: 0,
        }
    }

    /// Stop the run before executing any event scheduled later than `horizon`. This guarantees termination for
    /// models whose event stream never dries up on its own.
    #[must_use]
    pub fn with_horizon(mut self, horizon: Time) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Execute a single event, if one is due.
    ///
    /// Returns `Ok(false)` without touching the clock when the state reports completion, the calendar is empty, or
    /// the next event lies beyond the horizon. Otherwise pops the next event, passes it to [`SimState::handle()`]
    /// and returns `Ok(true)`.
    ///
    /// # Errors
    ///
    /// Any error returned by [`SimState::handle()`] is passed back unchanged. The state is left exactly as the
    /// failing handler left it, so it should not be run any further.
    pub fn step(&mut self) -> crate::Result<bool> {
        if self.state.is_complete(self.calendar.current_time()) {
            return Ok(false);
        }

        if let (Some(next_time), Some(horizon)) = (self.calendar.peek_time(), &self.horizon) {
            if next_time > horizon {
                tracing::debug!(?next_time, ?horizon, "next event lies beyond the horizon");
                return Ok(false);
            }
        }

        let Some(event) = self.calendar.advance() else {
            return Ok(false);
        };
        tracing::trace!(time = ?self.calendar.current_time(), ?event, "dispatching event");
        self.state.handle(event, &mut self.calendar)?;
        self.events_processed += 1;
        Ok(true)
    }

    /// Execute events from the calendar, one at a time, until [`step()`] reports that nothing more is due.
    ///
    /// # Errors
    ///
    /// Errors may occur during execution of events, and if encountered here they will be passed back to the caller
    /// unchanged. All of them indicate a broken contract inside the model rather than a recoverable condition; see
    /// [`Error`] for the variants.
    ///
    /// [`step()`]: Simulation::step
    /// [`Error`]: crate::Error
    pub fn run(&mut self) -> crate::Result {
        while self.step()? {}
        Ok(())
    }

    /// Get a shared reference to the simulation state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Get an exclusive reference to the simulation state.
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Give up the calendar and keep the state.
    pub fn into_state(self) -> State {
        self.state
    }

    /// Get a shared reference to the event calendar.
    pub fn calendar(&self) -> &EventCalendar<State::Event, Time> {
        &self.calendar
    }

    /// Get an exclusive reference to the event calendar.
    pub fn calendar_mut(&mut self) -> &mut EventCalendar<State::Event, Time> {
        &mut self.calendar
    }

    /// Get exclusive references to the state and the calendar at the same time, e.g. to let the state schedule its
    /// own initial events.
    pub fn parts_mut(&mut self) -> (&mut State, &mut EventCalendar<State::Event, Time>) {
        (&mut self.state, &mut self.calendar)
    }

    /// Get a shared reference to the simulation's current clock time.
    pub fn current_time(&self) -> &Time {
        self.calendar.current_time()
    }

    /// Number of events handled so far.
    pub fn events_processed(&self) -> usize {
        self.events_processed
    }
}

impl<State, Time> Debug for Simulation<State, Time>
where
    State: SimState<Time> + Debug,
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("calendar", &self.calendar)
            .field("state", &self.state)
            .field("horizon", &self.horizon)
            .field("events_processed", &self.events_processed)
            .finish()
    }
}

impl<State, Time> std::fmt::Display for Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Simulation at time {:?}", self.calendar.current_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Prioritized};

    #[derive(Debug)]
    struct State {
        executed_event_values: Vec<u32>,
        complete: bool,
    }

    impl SimState<u32> for State {
        type Event = TestEvent;

        fn handle(&mut self, event: TestEvent, calendar: &mut EventCalendar<TestEvent, u32>) -> crate::Result {
            match event {
                TestEvent::Value(value) => self.executed_event_values.push(value),
                TestEvent::Completion => self.complete = true,
                TestEvent::Rewind => calendar.schedule(TestEvent::Value(0), 0)?,
            }
            Ok(())
        }

        fn is_complete(&self, _: &u32) -> bool {
            self.complete
        }
    }

    #[derive(Debug)]
    enum TestEvent {
        Value(u32),
        Completion,
        Rewind,
    }

    impl Prioritized for TestEvent {
        fn priority(&self) -> u8 {
            0
        }
    }

    fn setup() -> Simulation<State, u32> {
        let mut sim = Simulation::new(
            State {
                executed_event_values: Vec::with_capacity(3),
                complete: false,
            },
            0,
        );

        let values: [u32; 3] = [1, 3, 2];
        for (i, value) in values.into_iter().enumerate() {
            sim.calendar_mut().schedule(TestEvent::Value(value), 2 * i as u32).unwrap();
        }
        sim
    }

    #[test]
    fn simulation_executes_events() {
        let mut sim = setup();
        sim.run().unwrap();

        assert_eq!(
            vec![1, 3, 2],
            sim.state().executed_event_values,
            "events did not execute in correct order"
        );
        assert_eq!(3, sim.events_processed());
        assert_eq!(4, *sim.current_time());
    }

    #[test]
    fn simulation_stops_with_events_still_in_queue() {
        let mut sim = setup();
        sim.calendar_mut().schedule(TestEvent::Completion, 3).unwrap();
        sim.run().unwrap();

        assert_eq!(
            vec![1, 3],
            sim.state().executed_event_values,
            "simulation did not terminate with completion event"
        );
        assert!(sim.calendar().has_next());
    }

    #[test]
    fn horizon_leaves_later_events_unprocessed() {
        let mut sim = setup().with_horizon(2);
        sim.run().unwrap();

        assert_eq!(vec![1, 3], sim.state().executed_event_values);
        assert_eq!(2, *sim.current_time(), "clock should stay at the last processed event");
        assert_eq!(1, sim.calendar().len());
    }

    #[test]
    fn handler_errors_stop_the_run() {
        let mut sim = setup();
        sim.calendar_mut().schedule(TestEvent::Rewind, 1).unwrap();

        assert!(matches!(sim.run(), Err(Error::BackInTime)));
        assert_eq!(vec![1], sim.state().executed_event_values);
    }
}
