mod util;

use clinic_des::entities::{Patient, Stage};
use clinic_des::sampler::{Distributions, Pcg64};
use clinic_des::stats::ClinicObserver;
use clinic_des::{Clinic, ClinicConfig, ClinicEvent, Hours, Simulation, UrgentCareModel, FIRST_PATIENT_ID};
use ordered_float::NotNan;
use rand::SeedableRng;

fn drained_config() -> ClinicConfig {
    let mut config = ClinicConfig::default();
    config.clinic.hours_open = 8.0;
    config.clinic.n_pcp = 4;
    config.clinic.mean_arrival_time = 0.05;
    config.clinic.prob_depression = 0.1;
    config.simulation.stop_when_drained = true;
    config
}

/// Remembers the clock of every notification and the order exams begin in.
#[derive(Default)]
struct Recorder {
    times: Vec<f64>,
    exams_started: Vec<u64>,
    ended: Option<f64>,
}

impl ClinicObserver for Recorder {
    fn patient_arrived(&mut self, time: f64, _: &Patient) {
        self.times.push(time);
    }

    fn joined_waiting_room(&mut self, _: Stage, time: f64, _: &Patient, _: usize) {
        self.times.push(time);
    }

    fn left_waiting_room(&mut self, _: Stage, time: f64, _: &Patient, _: usize) {
        self.times.push(time);
    }

    fn service_started(&mut self, stage: Stage, time: f64, patient: &Patient) {
        self.times.push(time);
        if stage == Stage::Primary {
            self.exams_started.push(patient.id());
        }
    }

    fn patient_departed(&mut self, time: f64, _: &Patient) {
        self.times.push(time);
    }

    fn simulation_ended(&mut self, time: f64) {
        self.ended = Some(time);
    }
}

fn hand_built_simulation(config: &ClinicConfig, seed: u64) -> Simulation<Clinic<Recorder, ()>, Hours> {
    let distributions = Distributions::from_parameters(&config.clinic).unwrap();
    let clinic = Clinic::new(
        config.clinic.n_pcp,
        distributions,
        Pcg64::seed_from_u64(seed),
        Recorder::default(),
        (),
    )
    .with_stop_when_drained(true);

    let start = Hours::default();
    let mut sim = Simulation::new(clinic, start).with_horizon(NotNan::new(config.simulation.sim_duration).unwrap());
    let (clinic, calendar) = sim.parts_mut();
    calendar
        .schedule(ClinicEvent::Close, NotNan::new(config.clinic.hours_open).unwrap())
        .unwrap();
    clinic.schedule_first_arrival(calendar, FIRST_PATIENT_ID, start).unwrap();
    sim
}

#[test]
fn same_seed_same_replication() {
    let model = UrgentCareModel::new(drained_config()).unwrap();

    let first = model.simulate(2024).unwrap();
    let second = model.simulate(2024).unwrap();
    assert_eq!(first.outputs.summary(), second.outputs.summary());
    assert_eq!(first.outputs.time_in_system(), second.outputs.time_in_system());
    assert_eq!(first.events_processed, second.events_processed);

    let other = model.simulate(2025).unwrap();
    assert_ne!(first.outputs.time_in_system(), other.outputs.time_in_system());
}

#[test]
fn drained_run_serves_every_admitted_patient() {
    let replication = UrgentCareModel::new(drained_config()).unwrap().simulate(11).unwrap();
    let outputs = &replication.outputs;

    assert!(outputs.patients_arrived() > 100);
    assert_eq!(outputs.patients_arrived(), outputs.patients_served());
    assert!(outputs.patients_received_mh_consult() <= outputs.patients_served());
    assert_eq!(outputs.patients_received_mh_consult(), outputs.mh_waiting_time().len());
    assert!(replication.end_time >= 8.0);

    let summary = outputs.summary();
    let ave_in_system = summary.ave_time_in_system.unwrap();
    assert_floats_near_equal!(
        ave_in_system,
        outputs.time_in_system().iter().sum::<f64>() / outputs.patients_served() as f64,
        "summary average should match the raw observations"
    );
    assert!(outputs.pcp_waiting_time().iter().all(|wait| *wait >= 0.0));
    assert!(summary.ave_pcps_busy.unwrap() <= 4.0);
    assert!(summary.ave_mhp_busy.unwrap() <= 1.0);
}

#[test]
fn head_count_balances_after_every_event() {
    let config = drained_config();
    let mut sim = hand_built_simulation(&config, 7);

    while sim.step().unwrap() {
        let clinic = sim.state();
        assert!(
            clinic.census_balances(),
            "admitted {} departed {} present {} at {}",
            clinic.admitted(),
            clinic.departed(),
            clinic.patients_present(),
            sim.current_time()
        );
    }

    let clinic = sim.state();
    assert!(!clinic.is_open());
    assert_eq!(0, clinic.patients_present());
    assert_eq!(clinic.admitted(), clinic.departed());
    assert!(clinic.waiting_room(Stage::Primary).is_empty());
    assert!(clinic.waiting_room(Stage::MentalHealth).is_empty());
    assert!(!clinic.mental_health_physician().is_busy());
}

#[test]
fn notifications_never_go_back_in_time_and_exams_start_in_arrival_order() {
    let config = drained_config();
    let mut sim = hand_built_simulation(&config, 99);
    sim.run().unwrap();

    let end = sim.current_time().into_inner();
    let mut clinic = sim.into_state();
    clinic.finish(end);
    let (recorder, ()) = clinic.into_parts();

    assert!(recorder.times.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(recorder.exams_started.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(Some(end), recorder.ended);
}

#[test]
fn without_draining_the_run_goes_on_to_the_horizon() {
    let mut config = drained_config();
    config.simulation.stop_when_drained = false;
    config.simulation.sim_duration = 40.0;
    let open_ended = UrgentCareModel::new(config).unwrap().simulate(3).unwrap();

    let drained = UrgentCareModel::new(drained_config()).unwrap().simulate(3).unwrap();

    // the same patients are seen; only the closing time of the sample paths differs
    assert_eq!(drained.outputs.patients_arrived(), open_ended.outputs.patients_arrived());
    assert_eq!(drained.outputs.time_in_system(), open_ended.outputs.time_in_system());
    assert!(open_ended.turned_away > drained.turned_away);
    assert!(open_ended.end_time > 39.0 && open_ended.end_time <= 40.0);
}

#[test]
fn patient_report_is_written_as_csv_without_tracing() {
    let mut config = drained_config();
    config.simulation.patient_summary = true;
    let replication = UrgentCareModel::new(config).unwrap().simulate(5).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    replication.outputs.write_patient_summary(file.as_file_mut()).unwrap();
    let text = std::fs::read_to_string(file.path()).unwrap();

    let mut lines = text.lines();
    assert_eq!(Some("patient,time_arrived,time_left,time_waited,time_in_system"), lines.next());
    assert_eq!(replication.outputs.patients_served(), lines.count());
    assert!(replication.trace.lines().is_empty());
}

#[test]
fn trace_keeps_the_patient_report_too() {
    let mut config = drained_config();
    config.simulation.trace_on = true;
    let replication = UrgentCareModel::new(config).unwrap().simulate(5).unwrap();

    assert!(!replication.trace.lines().is_empty());
    assert_eq!(
        Some(replication.outputs.patients_served()),
        replication.outputs.patient_summary().map(<[_]>::len)
    );
}

#[test]
fn unbounded_horizon_is_refused() {
    let mut config = ClinicConfig::default();
    config.simulation.sim_duration = f64::INFINITY;
    assert!(matches!(UrgentCareModel::new(config), Err(clinic_des::Error::Config(_))));
}

#[test]
fn invalid_configuration_is_refused() {
    let mut config = ClinicConfig::default();
    config.clinic.prob_depression = 1.5;
    assert!(matches!(UrgentCareModel::new(config), Err(clinic_des::Error::Config(_))));
}
