/// A step function of a count over simulated time, such as the number of patients waiting.
///
/// The path starts at `initial_size` at time zero and changes only through [`record_increment()`]. Once closed at
/// the end of a run it reports the time-weighted average of the count, which is what utilization and mean queue
/// length are made of.
///
/// [`record_increment()`]: PrevalenceSamplePath::record_increment
#[derive(Debug, Clone, PartialEq)]
pub struct PrevalenceSamplePath {
    name: String,
    current: i64,
    max: i64,
    last_time: f64,
    area: f64,
    points: Vec<(f64, i64)>,
    closed_at: Option<f64>,
}

impl PrevalenceSamplePath {
    /// A path named `name` that holds `initial_size` at time zero.
    pub fn new(name: impl Into<String>, initial_size: i64) -> Self {
        Self {
            name: name.into(),
            current: initial_size,
            max: initial_size,
            last_time: 0.0,
            area: 0.0,
            points: vec![(0.0, initial_size)],
            closed_at: None,
        }
    }

    /// Label of the tracked quantity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the count by `increment` at `time`. Several changes at one instant collapse into a single step.
    pub fn record_increment(&mut self, time: f64, increment: i64) {
        self.accumulate(time);
        self.current += increment;
        self.max = self.max.max(self.current);

        match self.points.last_mut() {
            Some((last, value)) if *last == time => *value = self.current,
            _ => self.points.push((time, self.current)),
        }
    }

    /// Extend the path to `time` without changing it, making the average available.
    pub fn close(&mut self, time: f64) {
        self.accumulate(time);
        self.closed_at = Some(time);
    }

    fn accumulate(&mut self, time: f64) {
        if time > self.last_time {
            self.area += self.current as f64 * (time - self.last_time);
            self.last_time = time;
        }
    }

    /// Value after the latest step.
    pub fn current(&self) -> i64 {
        self.current
    }

    /// Largest value reached so far.
    pub fn max(&self) -> i64 {
        self.max
    }

    /// The recorded steps as `(time, value after the step)` pairs, starting with the initial value at time zero.
    pub fn points(&self) -> &[(f64, i64)] {
        &self.points
    }

    /// Time-weighted average of the count between time zero and the close. `None` until the path has been closed
    /// at a positive time.
    pub fn time_average(&self) -> Option<f64> {
        match self.closed_at {
            Some(end) if end > 0.0 => Some(self.area / self.last_time),
            _ => None,
        }
    }
}
