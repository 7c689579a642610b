//! Timed replay of host actions and platform callbacks against a controller.

use std::{
    fs,
    io::Write,
    path::Path,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    clock::{Clock, ManualClock},
    model::SessionSnapshot,
    recognizer::{PlatformEvent, ScriptedRecognizer},
    state_machine::DictationController,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReplayAction {
    Toggle,
    Stop,
    Submit,
    FailNextStart { reason: String },
    Platform { event: PlatformEvent },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayStep {
    pub at_ms: u64,
    pub action: ReplayAction,
}

pub fn load_script(path: &Path) -> Result<Vec<ReplayStep>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading replay script {}", path.display()))?;
    let steps: Vec<ReplayStep> =
        serde_json::from_str(&raw).context("failed parsing replay script json")?;
    if let Some(pair) = steps.windows(2).find(|pair| pair[1].at_ms < pair[0].at_ms) {
        anyhow::bail!(
            "replay steps must be ordered by atMs ({} after {})",
            pair[1].at_ms,
            pair[0].at_ms
        );
    }
    Ok(steps)
}

pub struct Replay<'a> {
    pub controller: &'a mut DictationController,
    pub recognizer: &'a ScriptedRecognizer,
    pub clock: &'a ManualClock,
}

impl Replay<'_> {
    /// Applies each step at its offset and prints one snapshot line per step,
    /// then lets the silence window elapse and prints the settled snapshot.
    pub fn run(&mut self, steps: &[ReplayStep], out: &mut dyn Write) -> Result<SessionSnapshot> {
        let origin = self.clock.now();
        for step in steps {
            let target = origin + Duration::from_millis(step.at_ms);
            self.settle_until(target);
            self.clock.advance_to(target);
            self.apply(&step.action);
            let handled = self.controller.pump();
            debug!(at_ms = step.at_ms, handled, "replay step applied");
            write_snapshot(out, &self.controller.snapshot())?;
        }

        if let Some(deadline) = self.controller.watchdog().deadline() {
            self.clock.advance_to(deadline);
        }
        self.controller.pump();
        let settled = self.controller.snapshot();
        write_snapshot(out, &settled)?;
        info!(status = settled.status, "replay finished");
        Ok(settled)
    }

    /// Lets a silence deadline that falls before `target` expire on time, so
    /// the next step sees the session as the host would at that moment.
    fn settle_until(&mut self, target: Instant) {
        if let Some(deadline) = self.controller.watchdog().deadline() {
            if deadline <= target {
                self.clock.advance_to(deadline);
                self.controller.pump();
                debug!("silence deadline passed between steps");
            }
        }
    }

    fn apply(&mut self, action: &ReplayAction) {
        match action {
            ReplayAction::Toggle => {
                // Failures surface through the snapshot's error field.
                let _ = self.controller.toggle();
            }
            ReplayAction::Stop => self.controller.stop(),
            ReplayAction::Submit => {
                let text = self.controller.take_committed_text();
                info!(chars = text.len(), "input submitted");
            }
            ReplayAction::FailNextStart { reason } => self.recognizer.fail_next_start(reason.clone()),
            ReplayAction::Platform { event } => {
                if !self.recognizer.emit(event.clone()) {
                    debug!("no recognizer attached; platform event dropped");
                }
            }
        }
    }
}

fn write_snapshot(out: &mut dyn Write, snapshot: &SessionSnapshot) -> Result<()> {
    let line = serde_json::to_string(snapshot)?;
    writeln!(out, "{line}")?;
    Ok(())
}
