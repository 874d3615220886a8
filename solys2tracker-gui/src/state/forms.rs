//! Editable form values backing the tabs.

use std::time::Duration;

use solys2tracker_core::{
    Body, ConnectionParams, Error as CoreError, Offset, Result as CoreResult, SessionStatus,
    SweepPlan, TrackPlan,
};
use solys2tracker_control::MAX_ADJUSTMENT_STEP;
use solys2tracker_io::Settings;

use super::OperationKind;

fn seconds(value: f64, what: &str) -> CoreResult<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        CoreError::InvalidSweep(format!("{what} must be a non-negative number of seconds"))
    })
}

/// Operation parameters of one body tab.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyForm {
    pub kind: OperationKind,
    /// Tracking interval in seconds.
    pub interval: f64,
    pub range: f64,
    pub step: f64,
    /// Measurement window in seconds.
    pub countdown: f64,
    /// Pause after each measurement, in seconds.
    pub rest: f64,
    pub drift_azimuth: f64,
    pub drift_zenith: f64,
}

impl Default for BodyForm {
    fn default() -> Self {
        Self {
            kind: OperationKind::Track,
            interval: 15.0,
            range: 0.8,
            step: 0.1,
            countdown: 5.0,
            rest: 1.0,
            drift_azimuth: 0.0,
            drift_zenith: 0.0,
        }
    }
}

impl BodyForm {
    pub fn drift(&self) -> Offset {
        Offset::new(self.drift_azimuth, self.drift_zenith)
    }

    pub fn set_drift(&mut self, drift: Offset) {
        self.drift_azimuth = drift.azimuth;
        self.drift_zenith = drift.zenith;
    }

    pub fn track_plan(&self, body: Body) -> CoreResult<TrackPlan> {
        let plan = TrackPlan {
            body,
            interval: seconds(self.interval, "interval")?,
            drift: self.drift(),
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn sweep_plan(&self, body: Body) -> CoreResult<SweepPlan> {
        let plan = SweepPlan {
            body,
            range: self.range,
            step: self.step,
            countdown: seconds(self.countdown, "countdown")?,
            rest: seconds(self.rest, "rest")?,
            drift: self.drift(),
        };
        plan.validate()?;
        Ok(plan)
    }
}

/// Values of the configuration tab.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfForm {
    pub ip: String,
    pub port: u16,
    pub password: String,
    pub logfolder: String,
    pub kernels_path: String,
    /// Observer height in metres.
    pub height: f64,
    /// Adjustment last reported by the instrument; `None` until read.
    pub current_adjustment: Option<Offset>,
    /// Increment added on the next send, bounded by [`MAX_ADJUSTMENT_STEP`].
    pub add_azimuth: f64,
    pub add_zenith: f64,
}

impl ConfForm {
    pub fn from_status(status: &SessionStatus, settings: &Settings) -> Self {
        let params = status.params();
        Self {
            ip: params.ip.clone(),
            port: params.port,
            password: params.password.clone(),
            logfolder: status.logfolder.display().to_string(),
            kernels_path: status.kernels_path.display().to_string(),
            height: settings.height().unwrap_or(0.0),
            current_adjustment: None,
            add_azimuth: 0.0,
            add_zenith: 0.0,
        }
    }

    pub fn params(&self) -> ConnectionParams {
        ConnectionParams::new(self.ip.trim(), self.port, self.password.as_str())
    }

    /// Increment to send, clamped to the per-send bound.
    pub fn adjustment_step(&self) -> Offset {
        let clamp = |v: f64| v.clamp(-MAX_ADJUSTMENT_STEP, MAX_ADJUSTMENT_STEP);
        Offset::new(clamp(self.add_azimuth), clamp(self.add_zenith))
    }

    /// Stores the adjustment reported by the instrument and clears the
    /// pending increment so it is not applied twice.
    pub fn adjustment_reported(&mut self, current: Offset, after_send: bool) {
        self.current_adjustment = Some(current);
        if after_send {
            self.add_azimuth = 0.0;
            self.add_zenith = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solys2tracker_core::SweepKind;

    #[test]
    fn test_default_sweep_plan() {
        let plan = BodyForm::default().sweep_plan(Body::Moon).unwrap();
        assert_eq!(plan.total_points(SweepKind::Cross), 34);
        assert_eq!(plan.countdown, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut form = BodyForm {
            interval: 0.0,
            ..BodyForm::default()
        };
        assert!(form.track_plan(Body::Sun).is_err());
        form.interval = 10.0;
        form.rest = -1.0;
        assert!(form.sweep_plan(Body::Sun).is_err());
        form.rest = 1.0;
        form.step = 0.0;
        assert!(form.sweep_plan(Body::Sun).is_err());
        form.range = 1.0;
        form.step = 0.3;
        assert!(form.sweep_plan(Body::Sun).is_err());
        form.step = 0.25;
        assert!(form.sweep_plan(Body::Sun).is_ok());
    }

    #[test]
    fn test_params_trim_ip() {
        let status = SessionStatus::default();
        let mut form = ConfForm::from_status(&status, &Settings::default());
        form.ip = " 10.0.0.5 ".into();
        assert_eq!(form.params().ip, "10.0.0.5");
        assert_eq!(form.params().port, 15000);
    }

    #[test]
    fn test_read_keeps_increment_separate() {
        let mut form = ConfForm::from_status(&SessionStatus::default(), &Settings::default());
        form.add_azimuth = 0.05;
        form.adjustment_reported(Offset::new(1.5, -0.7), false);
        assert_eq!(form.current_adjustment, Some(Offset::new(1.5, -0.7)));
        // reading never turns the current value into the increment
        assert_eq!(form.adjustment_step(), Offset::new(0.05, 0.0));

        form.adjustment_reported(Offset::new(1.55, -0.7), true);
        assert_eq!(form.adjustment_step(), Offset::ZERO);
    }

    #[test]
    fn test_adjustment_step_clamped() {
        let mut form = ConfForm::from_status(&SessionStatus::default(), &Settings::default());
        form.add_azimuth = 3.0;
        form.add_zenith = -0.5;
        let step = form.adjustment_step();
        assert_eq!(step.azimuth, MAX_ADJUSTMENT_STEP);
        assert_eq!(step.zenith, -MAX_ADJUSTMENT_STEP);
    }
}
