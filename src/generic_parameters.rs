use crate::calendar::EventCalendar;

use std::fmt::Debug;

/// The generic type used for a simulation's clock.
///
/// Kept generic so the calendar and the runner can be exercised with plain integers in tests while the clinic
/// itself runs on [`NotNan<f64>`] hours. This trait is a superset of [`Ord`] and [`Debug`] with no additional
/// requirements or functionality.
///
/// Events execute in ascending order of execution time. Ties on time are broken first by the event's
/// [`Prioritized::priority()`] rank and only then by the order in which the events were scheduled, which keeps a
/// replication fully deterministic for a fixed seed.
///
/// Implementations are provided for integral builtin types and for the [`OrderedFloat`] and [`NotNan`] wrappers,
/// but not for the floating-point builtin types as the latter do not implement [`Ord`].
///
/// [`OrderedFloat`]: ordered_float::OrderedFloat
/// [`NotNan`]: ordered_float::NotNan
/// [`NotNan<f64>`]: ordered_float::NotNan
pub trait SimTime: Ord + Debug {}

impl SimTime for u8 {}
impl SimTime for u16 {}
impl SimTime for u32 {}
impl SimTime for u64 {}
impl SimTime for u128 {}
impl SimTime for usize {}
impl SimTime for i8 {}
impl SimTime for i16 {}
impl SimTime for i32 {}
impl SimTime for i64 {}
impl SimTime for i128 {}
impl SimTime for isize {}

impl<Float> SimTime for ordered_float::OrderedFloat<Float> where Float: ordered_float::FloatCore + Debug {}

impl<Float> SimTime for ordered_float::NotNan<Float> where Float: ordered_float::FloatCore + Debug {}

/// An event kind that carries a fixed tie-break rank.
///
/// Lower ranks are processed first when two events share an execution time. The rank must depend only on the kind
/// of event, never on its payload, so that simultaneous events always resolve the same way.
pub trait Prioritized {
    fn priority(&self) -> u8;
}

/// The generic type used for a simulation's overall state.
///
/// Unlike a framework in which every event executes itself, the state owns the single dispatch point for all of its
/// event kinds: [`handle()`] receives each event by value, together with exclusive access to the calendar so that
/// follow-up events can be scheduled. Keeping dispatch in one `match` lets the compiler check that every kind is
/// handled.
///
/// [`handle()`]: SimState::handle
pub trait SimState<Time>
where
    Time: SimTime,
{
    /// The events this state knows how to react to.
    type Event: Prioritized + Debug;

    /// Update the state in response to `event`. The calendar's clock has already been moved to the event's
    /// execution time when this is called.
    ///
    /// # Errors
    ///
    /// Any [`Error`] returned here stops [`Simulation::run()`] immediately and is passed back to the caller
    /// unchanged.
    ///
    /// [`Error`]: crate::Error
    /// [`Simulation::run()`]: crate::Simulation::run
    fn handle(&mut self, event: Self::Event, calendar: &mut EventCalendar<Self::Event, Time>) -> crate::Result;

    /// Reports whether the simulation has run to completion. This method will be invoked in
    /// [`Simulation::run()`] before popping each event off the calendar: `true` indicates that the simulation is
    /// finished and that `run()` should break out of its loop.
    ///
    /// The default implementation always returns false, which results in the simulation continuing until the
    /// calendar empties out or the time horizon is reached.
    ///
    /// [`Simulation::run()`]: crate::Simulation::run
    // expect that other implementations will make use of the
    // argument even though this one doesn't
    #[allow(unused_variables)]
    fn is_complete(&self, current_time: &Time) -> bool {
        false
    }
}
