use crate::error::PanelError;
use chrono::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FREQUENCY_SECS: u32 = 27;
pub const DEFAULT_DURATION_MINS: u32 = 60;
pub const MIN_FREQUENCY_SECS: u32 = 1;
pub const MAX_FREQUENCY_SECS: u32 = 60;

/// Run lengths offered by the panel's duration dropdown, in minutes.
pub const DURATION_CHOICES: [u32; 10] = [60, 90, 120, 150, 180, 240, 300, 360, 420, 480];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// The panel control that caused an event.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Start,
    Stop,
    Frequency,
    Duration,
    Refresh,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PanelEvent {
    #[serde(default)]
    pub trigger: Option<Trigger>,
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    #[serde(default = "default_duration")]
    pub duration: u32,
}

fn default_frequency() -> u32 {
    DEFAULT_FREQUENCY_SECS
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINS
}

#[cfg(test)]
impl PanelEvent {
    pub fn new(trigger: Option<Trigger>, frequency: u32, duration: u32) -> Self {
        Self {
            trigger,
            frequency,
            duration,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub status: String,
    pub current_time: String,
    pub runtime: String,
}

/// What a single jiggler run does: how often to nudge and for how long.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plan {
    pub frequency_secs: u32,
    pub duration: Duration,
}

impl Plan {
    /// Builds a plan from the panel's slider and dropdown values.
    pub fn new(frequency_secs: u32, duration_mins: u32) -> Result<Self, PanelError> {
        if !DURATION_CHOICES.contains(&duration_mins) {
            return Err(PanelError::InvalidDuration(duration_mins));
        }
        Self::custom(frequency_secs, Duration::minutes(i64::from(duration_mins)))
    }

    /// Any positive run length; used by the headless `run` command.
    pub fn custom(frequency_secs: u32, duration: Duration) -> Result<Self, PanelError> {
        if !(MIN_FREQUENCY_SECS..=MAX_FREQUENCY_SECS).contains(&frequency_secs) {
            return Err(PanelError::InvalidFrequency(frequency_secs));
        }
        if duration <= Duration::zero() {
            return Err(PanelError::InvalidRunLength(duration.num_seconds()));
        }
        Ok(Self {
            frequency_secs,
            duration,
        })
    }
}

/// Dropdown label for a duration choice, e.g. "1 Hour" or "2.5 Hours".
pub fn duration_label(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (1, 0) => "1 Hour".to_string(),
        (hours, 0) => format!("{} Hours", hours),
        (hours, 30) => format!("{}.5 Hours", hours),
        _ => format!("{} Minutes", minutes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_accepts_panel_choices() {
        for minutes in DURATION_CHOICES {
            let plan = Plan::new(DEFAULT_FREQUENCY_SECS, minutes).unwrap();
            assert_eq!(plan.duration, Duration::minutes(minutes as i64));
        }
    }

    #[test]
    fn test_plan_rejects_out_of_range_frequency() {
        assert!(matches!(
            Plan::new(0, 60),
            Err(PanelError::InvalidFrequency(0))
        ));
        assert!(matches!(
            Plan::new(61, 60),
            Err(PanelError::InvalidFrequency(61))
        ));
        assert!(Plan::new(1, 60).is_ok());
        assert!(Plan::new(60, 60).is_ok());
    }

    #[test]
    fn test_plan_rejects_unknown_duration() {
        assert!(matches!(
            Plan::new(27, 45),
            Err(PanelError::InvalidDuration(45))
        ));
    }

    #[test]
    fn test_custom_plan_requires_positive_length() {
        assert!(Plan::custom(5, Duration::seconds(1)).is_ok());
        assert!(matches!(
            Plan::custom(5, Duration::zero()),
            Err(PanelError::InvalidRunLength(0))
        ));
    }

    #[test]
    fn test_duration_label() {
        assert_eq!(duration_label(60), "1 Hour");
        assert_eq!(duration_label(90), "1.5 Hours");
        assert_eq!(duration_label(150), "2.5 Hours");
        assert_eq!(duration_label(480), "8 Hours");
    }

    #[test]
    fn test_panel_event_defaults() {
        let event: PanelEvent = serde_json::from_str(r#"{"trigger":"start"}"#).unwrap();
        assert_eq!(event.trigger, Some(Trigger::Start));
        assert_eq!(event.frequency, DEFAULT_FREQUENCY_SECS);
        assert_eq!(event.duration, DEFAULT_DURATION_MINS);

        let event: PanelEvent = serde_json::from_str(r#"{"trigger":null}"#).unwrap();
        assert_eq!(event.trigger, None);
    }
}
