use adaptive_cruise_control::threaded_impl::simulation_thread::TickSettings;
use adaptive_cruise_control::{
    AccConfig, AccError, PidGains, PolicyInput, Simulation, VehicleController,
};

#[test]
fn zero_and_negative_timesteps_fail_without_side_effects() {
    let mut car = VehicleController::new(50.0, 80.0, PidGains::new(0.8, 0.1, 0.05));
    car.step(0.1).unwrap();
    let speed = car.current_speed();
    let target = car.previous_target_speed();

    assert!(matches!(car.step(0.0), Err(AccError::InvalidTimestep(dt)) if dt == 0.0));
    assert!(matches!(car.step(-1.0), Err(AccError::InvalidTimestep(dt)) if dt == -1.0));

    assert_eq!(car.current_speed(), speed);
    assert_eq!(car.previous_target_speed(), target);

    // A rejected call does not disturb the next valid one.
    let mut twin = car.clone();
    assert_eq!(car.step(0.1).unwrap(), twin.step(0.1).unwrap());
}

#[test]
fn garbage_driver_input_is_discarded() {
    let car = VehicleController::new(50.0, 50.0, PidGains::default());
    let mut sim = Simulation::new(car, 0.1).unwrap();
    let garbage = [
        "set-speed",
        "set-speed 8o",
        "lead-distance inf",
        "accelerate 10",
        "object-ahead 2",
    ];
    for line in garbage {
        assert!(sim.submit(line).is_err(), "{:?} should be rejected", line);
    }

    assert_eq!(sim.controller().set_speed(), 50.0);
    assert_eq!(sim.controller().sensor().lead_distance, 30.0);
    assert_eq!(sim.log().len(), 5);
    assert!(sim.tick().is_ok());
}

#[test]
fn invalid_configuration_is_rejected() {
    assert!(matches!(AccConfig::from_toml_str("time_step = 0"), Err(AccError::Config(_))));
    assert!(matches!(AccConfig::from_toml_str("time_step = \"fast\""), Err(AccError::Config(_))));
    assert!(matches!(
        AccConfig::from_toml_str("max_target_change = -2.0"),
        Err(AccError::Config(_))
    ));
}

#[test]
fn oversized_timestep_is_rejected_before_realtime_run() {
    assert!(matches!(AccConfig::from_toml_str("time_step = 1e20"), Err(AccError::Config(_))));
    assert!(matches!(TickSettings::realtime(1e20), Err(AccError::InvalidTimestep(_))));
}

#[test]
fn negative_reaction_time_is_rejected() {
    assert!(matches!(
        AccConfig::from_toml_str("reaction_time = -5.0"),
        Err(AccError::Config(_))
    ));

    // A valid reaction time still yields a positive gap at city speeds.
    let policy = AccConfig::from_toml_str("reaction_time = 0.5")
        .unwrap()
        .safe_distance_policy();
    for speed in [10.0, 20.0, 50.0] {
        let gap = policy.safe_distance(&PolicyInput {
            ego_speed: speed,
            lead_speed: 0.0,
            lead_distance: 30.0,
        });
        assert!(gap > 0.0, "no gap at {} kph", speed);
    }
}
