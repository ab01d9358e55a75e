use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::command::DriverCommand;

/// A command scheduled at a simulation time (seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioEvent {
    pub at: f64,
    pub command: DriverCommand,
}

/// Timeline of lead-object and driver commands, consumed in time order.
#[derive(Debug, Clone, Default)]
pub struct LeadScenario {
    events: VecDeque<ScenarioEvent>,
}

impl LeadScenario {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Events are reordered by time; ties keep their given order.
    pub fn scripted(mut events: Vec<ScenarioEvent>) -> Self {
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self {
            events: events.into(),
        }
    }

    /// Reproducible lead behaviour: speed changes, cut-ins and the lead
    /// leaving and re-entering the lane. Same seed, same timeline.
    pub fn random(seed: u64, duration_secs: f64, mean_interval_secs: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut events = Vec::new();
        let mut at = 0.0;
        let mut ahead = true;
        let max_gap = (mean_interval_secs * 2.0).max(0.2);

        loop {
            at += rng.gen_range(0.1..max_gap);
            if at >= duration_secs {
                break;
            }

            let roll: f64 = rng.gen();
            let command = if !ahead || roll < 0.1 {
                ahead = !ahead;
                DriverCommand::ObjectAhead(ahead)
            } else if roll < 0.3 {
                DriverCommand::LeadDistance(rng.gen_range(15.0..60.0))
            } else {
                DriverCommand::LeadSpeed(rng.gen_range(20.0..120.0))
            };
            events.push(ScenarioEvent { at, command });
        }

        Self::scripted(events)
    }

    /// Removes and returns every event due at or before `elapsed`.
    pub fn due(&mut self, elapsed: f64) -> Vec<DriverCommand> {
        let mut ready = Vec::new();
        while let Some(event) = self.events.front() {
            if event.at > elapsed {
                break;
            }
            ready.push(event.command);
            self.events.pop_front();
        }
        ready
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn is_finished(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &ScenarioEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_events_fire_in_time_order() {
        let mut scenario = LeadScenario::scripted(vec![
            ScenarioEvent { at: 2.0, command: DriverCommand::LeadSpeed(10.0) },
            ScenarioEvent { at: 0.5, command: DriverCommand::SetSpeed(90.0) },
            ScenarioEvent { at: 2.0, command: DriverCommand::LeadDistance(40.0) },
        ]);

        assert!(scenario.due(0.4).is_empty());
        assert_eq!(scenario.due(0.5), vec![DriverCommand::SetSpeed(90.0)]);
        assert_eq!(
            scenario.due(5.0),
            vec![DriverCommand::LeadSpeed(10.0), DriverCommand::LeadDistance(40.0)]
        );
        assert!(scenario.is_finished());
    }

    #[test]
    fn random_scenario_is_reproducible() {
        let a: Vec<_> = LeadScenario::random(7, 60.0, 3.0).events().copied().collect();
        let b: Vec<_> = LeadScenario::random(7, 60.0, 3.0).events().copied().collect();
        let c: Vec<_> = LeadScenario::random(8, 60.0, 3.0).events().copied().collect();

        assert!(!a.is_empty());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn random_scenario_stays_within_duration_and_ranges() {
        let scenario = LeadScenario::random(42, 30.0, 2.0);
        let mut last = 0.0;
        for event in scenario.events() {
            assert!(event.at >= last && event.at < 30.0);
            last = event.at;
            match event.command {
                DriverCommand::LeadSpeed(v) => assert!((20.0..120.0).contains(&v)),
                DriverCommand::LeadDistance(d) => assert!((15.0..60.0).contains(&d)),
                DriverCommand::ObjectAhead(_) => {}
                other => panic!("unexpected command {:?}", other),
            }
        }
    }
}
