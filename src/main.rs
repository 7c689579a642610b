use std::{io, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hr_dictation::{
    replay::{load_script, Replay},
    DictationController, HostProfile, KeywordRouter, LoggingNavigator, ManualClock,
    ScriptedCapabilities, ScriptedRecognizer, SettingsStore, CAPABILITY_NAMES,
};

/// Section ids present on the HR helper dashboard.
const DASHBOARD_SECTIONS: [&str; 6] = ["email", "resume", "boolean", "notes", "matcher", "dashboard"];

#[derive(Debug, Parser)]
#[command(name = "hr-dictation-replay", about = "Replay a scripted dictation session")]
struct Args {
    /// JSON list of timed steps.
    #[arg(long)]
    script: PathBuf,

    /// Settings file; defaults apply when missing.
    #[arg(long, env = "HR_DICTATION_SETTINGS")]
    settings: Option<PathBuf>,

    /// Overrides the profile from the settings file.
    #[arg(long, value_enum)]
    profile: Option<HostProfile>,

    /// Simulate an environment without speech recognition.
    #[arg(long)]
    unsupported: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => SettingsStore::new(path.clone()).load()?,
        None => Default::default(),
    };
    if let Some(profile) = args.profile {
        settings.profile = profile;
    }
    info!(profile = ?settings.profile, timeout_ms = settings.silence_timeout_ms, "settings loaded");

    let steps = load_script(&args.script)?;

    let recognizer = ScriptedRecognizer::new();
    let registry = if args.unsupported {
        ScriptedCapabilities::none()
    } else {
        ScriptedCapabilities::new(recognizer.clone(), &CAPABILITY_NAMES)
    };
    let clock = ManualClock::new();
    let mut controller = DictationController::mount(&registry, &settings, Arc::new(clock.clone()));
    if settings.profile.routes_keywords() {
        controller = controller.with_router(
            KeywordRouter::new(settings.routes.clone()),
            Box::new(LoggingNavigator::new(DASHBOARD_SECTIONS)),
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    Replay {
        controller: &mut controller,
        recognizer: &recognizer,
        clock: &clock,
    }
    .run(&steps, &mut out)
    .context("replay failed")?;

    controller.teardown();
    Ok(())
}
