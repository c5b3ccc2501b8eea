//! Session controller
//!
//! Owns the single `SessionState`, turns variable frame time into fixed
//! simulation substeps, acts on restart/exit requests and, when a run ends,
//! grades it and appends it to the run history.

use std::path::{Path, PathBuf};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::grading::{self, Grade, Tier};
use crate::map::MapDefinition;
use crate::records::{RunHistory, RunRecord};
use crate::settings::Settings;
use crate::sim::{RunResult, SessionRequest, SessionState, TickInput, tick};
use crate::tuning::Tuning;

/// Where the game keeps its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePaths {
    pub config: PathBuf,
    pub records: PathBuf,
    pub maps_dir: PathBuf,
}

impl GamePaths {
    /// Standard layout below `root`: `data/config.json`, `data/record.json`, `data/maps/`
    pub fn under(root: &Path) -> Self {
        let data = root.join("data");
        Self {
            config: data.join("config.json"),
            records: data.join("record.json"),
            maps_dir: data.join("maps"),
        }
    }

    pub fn stage(&self, name: &str) -> PathBuf {
        self.maps_dir.join(format!("{name}.json"))
    }

    /// Map a stage's pipe leads to, if the stage has one
    pub fn shortcut_for(&self, stage: &Path) -> PathBuf {
        let stem = stage
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.maps_dir.join(format!("{stem}_pipe.json"))
    }
}

impl Default for GamePaths {
    fn default() -> Self {
        Self::under(Path::new("."))
    }
}

/// A graded, finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub result: RunResult,
    pub grade: Grade,
    pub tier: Option<Tier>,
    pub message: String,
    /// Whether the run was appended to the history
    pub recorded: bool,
}

pub struct Game {
    state: SessionState,
    map: MapDefinition,
    shortcut: Option<MapDefinition>,
    tuning: Tuning,
    viewport_width: f32,
    history: RunHistory,
    /// History file; `None` keeps the history in memory only
    records_path: Option<PathBuf>,
    input: TickInput,
    accumulator: f32,
    outcome: Option<RunOutcome>,
    exit_requested: bool,
}

impl Game {
    pub fn new(map: MapDefinition, settings: &Settings, history: RunHistory) -> Self {
        let tuning = Tuning::from_settings(settings);
        let viewport_width = settings.viewport_width();
        let state = SessionState::new(&map, tuning.clone(), viewport_width);
        Self {
            state,
            map,
            shortcut: None,
            tuning,
            viewport_width,
            history,
            records_path: None,
            input: TickInput::default(),
            accumulator: 0.0,
            outcome: None,
            exit_requested: false,
        }
    }

    /// Load the stage, its optional pipe map and the run history from disk
    pub fn from_paths(paths: &GamePaths, stage: &Path, settings: &Settings) -> Self {
        let map = MapDefinition::load_or_default(stage);
        let history = RunHistory::load(&paths.records);

        let shortcut_path = paths.shortcut_for(stage);
        let mut game = Self::new(map, settings, history).with_records_path(paths.records.clone());
        if shortcut_path.exists() {
            match MapDefinition::load(&shortcut_path) {
                Ok(shortcut) => game = game.with_shortcut(shortcut),
                Err(e) => log::warn!("Ignoring pipe map {}: {e}", shortcut_path.display()),
            }
        }
        game
    }

    pub fn with_shortcut(mut self, shortcut: MapDefinition) -> Self {
        self.shortcut = Some(shortcut);
        self.state = self.fresh_session();
        self
    }

    pub fn with_records_path(mut self, path: PathBuf) -> Self {
        self.records_path = Some(path);
        self
    }

    fn fresh_session(&self) -> SessionState {
        let state = SessionState::new(&self.map, self.tuning.clone(), self.viewport_width);
        match &self.shortcut {
            Some(shortcut) => state.with_shortcut(shortcut.clone()),
            None => state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Input for the coming frame; one-shot fields are consumed by the first substep
    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    /// Advance by a frame of `dt` seconds
    pub fn update(&mut self, dt: f32) {
        let dt = dt.min(MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input;
            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.jump_pressed = false;
            self.input.jump_released = false;
            self.input.pause = false;
            self.input.menu = None;

            if self.handle_request() {
                break;
            }
            if self.state.phase.is_terminal() && self.outcome.is_none() {
                self.finish_run();
            }
        }
    }

    /// Start the same stage over
    pub fn restart(&mut self) {
        log::info!("Restarting run");
        self.state = self.fresh_session();
        self.input = TickInput::default();
        self.accumulator = 0.0;
        self.outcome = None;
    }

    /// Returns true when the frame should stop stepping
    fn handle_request(&mut self) -> bool {
        match self.state.request.take() {
            Some(SessionRequest::Restart) => {
                self.restart();
                true
            }
            Some(SessionRequest::ExitToMenu) => {
                log::info!("Exit to menu requested");
                self.exit_requested = true;
                true
            }
            None => false,
        }
    }

    fn finish_run(&mut self) {
        let Some(result) = self.state.result else {
            return;
        };

        let elapsed = result.elapsed as f64;
        let grade = grading::grade(elapsed, &self.history.completion_times());
        let tier = grade.tier();

        // Victories are always kept so an empty history can bootstrap
        let recorded = result.victory || grade != Grade::Unavailable;
        if recorded {
            self.history.record(RunRecord {
                victory: result.victory,
                time: elapsed,
                lives: result.lives,
                grade: grade.value(),
                outcome: tier.map(|t| t.label().to_string()),
                seq: 0,
            });
            if let Some(path) = &self.records_path {
                if let Err(e) = self.history.save(path) {
                    log::warn!("Could not save run records: {e}");
                }
            }
        }

        match grade {
            Grade::Percentile(p) => log::info!("Graded {elapsed:.2}s at {p:.1}"),
            Grade::Unavailable => log::info!("No history to grade {elapsed:.2}s against"),
        }

        self.outcome = Some(RunOutcome {
            result,
            grade,
            tier,
            message: grading::result_message(result.victory, tier),
            recorded,
        });
    }
}
