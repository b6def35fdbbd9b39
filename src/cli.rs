//! Command-line front ends: script replay, interactive REPL, layout dump

use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use rustyline::DefaultEditor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{AppConfig, ConfigWatcher};
use crate::engine::{ConsoleEngine, Engine, JoypadEngine, RecordingEngine};
use crate::input::touchpad::{
    LogicalButton, MouseEvent, RegionHandles, TouchController, TouchEvent, Transition,
};
use crate::script::{Script, Step};

/// Which engine receives the pad's button calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Keep an ordered call log and print it at the end
    Recording,
    /// Log every call through tracing
    Console,
    /// Feed an emulated NES controller port
    Joypad,
}

enum SessionEngine {
    Recording(Arc<RecordingEngine>),
    Console(Arc<ConsoleEngine>),
    Joypad(Arc<JoypadEngine>),
}

impl SessionEngine {
    fn new(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Recording => Self::Recording(Arc::new(RecordingEngine::new())),
            EngineKind::Console => Self::Console(Arc::new(ConsoleEngine::new("console"))),
            EngineKind::Joypad => Self::Joypad(Arc::new(JoypadEngine::new())),
        }
    }

    fn as_engine(&self) -> Arc<dyn Engine> {
        match self {
            Self::Recording(e) => e.clone() as Arc<dyn Engine>,
            Self::Console(e) => e.clone() as Arc<dyn Engine>,
            Self::Joypad(e) => e.clone() as Arc<dyn Engine>,
        }
    }

    fn summary(&self) -> String {
        match self {
            Self::Recording(e) => {
                let calls: Vec<String> = e.calls().iter().map(|c| c.to_string()).collect();
                format!("{} engine call(s): {}", calls.len(), calls.join(", "))
            }
            Self::Console(e) => format!("{} engine call(s)", e.call_count()),
            Self::Joypad(e) => format!("joypad latch {:08b} (held: {})", e.poll(), e.held()),
        }
    }
}

/// A pad wired to an engine, driven by scripted or typed steps
///
/// Time is simulated: every step advances the clock by `step_gap`, plus any
/// explicit `wait`.
pub struct Session {
    controller: TouchController,
    handles: RegionHandles,
    engine: SessionEngine,
    clock: Instant,
    step_gap: Duration,
}

impl Session {
    pub fn new(config: &AppConfig, engine: EngineKind, step_ms: u64) -> Self {
        let mut controller = TouchController::new(&config.controller);
        let handles = RegionHandles::new();
        handles.apply_layout(&config.layout);
        controller.register_handles(&handles);

        Self {
            controller,
            handles,
            engine: SessionEngine::new(engine),
            clock: Instant::now(),
            step_gap: Duration::from_millis(step_ms),
        }
    }

    pub fn controller(&self) -> &TouchController {
        &self.controller
    }

    /// Swap in an edited config without dropping the session
    ///
    /// Moved or unmounted regions take effect on the next pointer event,
    /// like a viewport resize.
    pub fn reload(&mut self, config: &AppConfig) {
        self.handles.apply_layout(&config.layout);
        self.controller.set_debounce(&config.controller);
    }

    /// Run one step; returns the tracker pass it caused, if any
    pub fn apply(&mut self, step: &Step) -> Option<Transition> {
        self.clock += self.step_gap;

        match step {
            Step::Touch { phase, touches } => {
                let event = TouchEvent::new(*phase, touches.clone());
                Some(self.controller.handle_touch_at(&event, self.clock))
            }
            Step::Mouse { kind, x, y, buttons } => {
                let event = MouseEvent::new(*kind, *x, *y, *buttons);
                Some(self.controller.handle_mouse_at(&event, self.clock))
            }
            Step::EngineReady => {
                self.controller.attach_engine(self.engine.as_engine());
                None
            }
            Step::EngineLost => {
                self.controller.detach_engine();
                None
            }
            Step::Region { button, rect } => {
                let handle = self.handles.handle(*button);
                match rect {
                    Some(rect) => handle.set(*rect),
                    None => handle.unmount(),
                }
                None
            }
            Step::Wait { ms } => {
                self.clock += Duration::from_millis(*ms);
                None
            }
        }
    }

    pub fn summary(&self) -> String {
        self.engine.summary()
    }
}

fn print_step(index: usize, step: &Step, transition: Option<&Transition>, session: &Session) {
    let mut line = format!("{:>3}  {:<40}", index, step.to_string());

    if let Some(t) = transition {
        if !t.pressed.is_empty() {
            line.push_str(&format!(" {}", format!("+[{}]", t.pressed).green()));
        }
        if !t.released.is_empty() {
            line.push_str(&format!(" {}", format!("-[{}]", t.released).red()));
        }
    }

    let engine = if session.controller().engine_ready() {
        "engine".green()
    } else {
        "no engine".yellow()
    };
    line.push_str(&format!(
        "  active: {} ({})",
        session.controller().active_buttons().to_string().bold(),
        engine
    ));
    println!("{}", line);
}

fn replay_once(config: &AppConfig, script: &Script, engine: EngineKind) {
    let mut session = Session::new(config, engine, script.step_ms);

    println!("\n{}", "=== Replaying input script ===".bold().cyan());
    for (i, step) in script.steps.iter().enumerate() {
        let transition = session.apply(step);
        print_step(i + 1, step, transition.as_ref(), &session);
    }

    let stuck = session.controller().active_buttons();
    println!("\n{}", session.summary());
    if stuck.is_empty() {
        println!("{}", "✅ Script ended with no buttons held".green());
    } else {
        println!("{} {}", "⚠️  Script ended with buttons held:".yellow(), stuck);
    }
}

/// Replay a script, optionally again after every config change
pub async fn run_replay(
    config_path: &str,
    script_path: &str,
    engine: EngineKind,
    watch: bool,
) -> Result<()> {
    let script = Script::load(script_path).await?;
    info!("Loaded {} step(s) from {}", script.steps.len(), script_path);

    if !watch {
        let config = AppConfig::load(config_path).await?;
        replay_once(&config, &script, engine);
        return Ok(());
    }

    let (mut watcher, initial) = ConfigWatcher::new(config_path.to_string()).await?;
    replay_once(&initial, &script, engine);
    info!("Watching {} for layout changes (Ctrl+C to stop)", config_path);

    loop {
        tokio::select! {
            Some(config) = watcher.next_config() => {
                info!("📝 Layout changed, replaying...");
                replay_once(&config, &script, engine);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

const REPL_HELP: &str = "\
commands:
  touch <start|move|end|cancel> [id:x,y ...]
  mouse <down|move|up|leave> [x y [buttons]]
  region <button> <x> <y> <w> <h> | region <button> off
  ready | lost | wait <ms>
  state | help | exit";

pub async fn run_repl(config_path: &str, engine: EngineKind) -> Result<()> {
    let (mut watcher, config) = ConfigWatcher::new(config_path.to_string()).await?;
    // Typed commands are human-paced: one debounce window apart
    let mut session = Session::new(&config, engine, config.controller.debounce_ms);
    let mut rl = DefaultEditor::new()?;
    let mut index = 0;

    println!("{}", REPL_HELP.dimmed());

    loop {
        let readline = rl.readline("pad> ");
        match readline {
            Ok(line) => {
                if let Some(config) = watcher.try_next_config() {
                    session.reload(&config);
                    println!("{}", "layout reloaded".dimmed());
                }

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(line) {
                    debug!("Failed to record history: {}", e);
                }

                match line {
                    "exit" | "quit" => break,
                    "help" => println!("{}", REPL_HELP),
                    "state" => println!("{}", session.summary()),
                    command => match command.parse::<Step>() {
                        Ok(step) => {
                            index += 1;
                            let transition = session.apply(&step);
                            print_step(index, &step, transition.as_ref(), &session);
                        }
                        Err(e) => warn!("{:#}", e),
                    },
                }
            }
            Err(_) => break,
        }
    }

    // Never leave the engine holding anything
    session.controller.clear();
    Ok(())
}

pub async fn print_layout(config_path: &str, json: bool) -> Result<()> {
    let config = AppConfig::load(config_path).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.layout)?);
        return Ok(());
    }

    println!("\n{}", "=== Pad layout ===".bold().cyan());
    println!("  debounce: {} ms", config.controller.debounce_ms);
    for button in LogicalButton::ALL {
        match config.layout.get(&button) {
            Some(rect) => println!("  {:<7} {}", button.to_string().green(), rect),
            None => println!("  {:<7} {}", button.to_string().dimmed(), "not mounted".dimmed()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::from_yaml(
            r#"
controller:
  debounce_ms: 10
layout:
  b: { x: 220, y: 480, width: 50, height: 50 }
  a: { x: 280, y: 480, width: 50, height: 50 }
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_session_replays_engine_late_start() {
        let script = Script::from_yaml(
            r#"
steps:
  - { type: touch, phase: start, touches: [{ id: 1, x: 300, y: 500 }] }
  - { type: engine_ready }
  - { type: touch, phase: move, touches: [{ id: 1, x: 300, y: 500 }] }
  - { type: touch, phase: end }
"#,
        )
        .unwrap();

        let mut session = Session::new(&config(), EngineKind::Recording, script.step_ms);
        for step in &script.steps {
            session.apply(step);
        }

        assert!(session.controller().active_buttons().is_empty());
        assert_eq!(session.summary(), "2 engine call(s): press A, release A");
    }

    #[test]
    fn test_session_region_moves_are_live() {
        let mut session = Session::new(&config(), EngineKind::Joypad, 16);
        session.apply(&Step::EngineReady);

        // Move A far away, then touch where it used to be
        session.apply(&"region a 900 900 50 50".parse().unwrap());
        let t = session
            .apply(&"touch start 1:300,500".parse().unwrap())
            .unwrap();
        assert!(t.set.is_empty());

        let t = session
            .apply(&"touch move 1:920,920".parse().unwrap())
            .unwrap();
        assert_eq!(t.pressed.to_vec(), vec![LogicalButton::A]);
    }

    #[test]
    fn test_session_reload_remounts_live_regions() {
        let mut session = Session::new(&config(), EngineKind::Recording, 16);
        session.apply(&"ready".parse().unwrap());
        let t = session
            .apply(&"touch start 1:300,500".parse().unwrap())
            .unwrap();
        assert_eq!(t.pressed.to_vec(), vec![LogicalButton::A]);

        // A moves away and B is dropped from the layout
        let edited = AppConfig::from_yaml(
            "layout:\n  a: { x: 600, y: 480, width: 50, height: 50 }\n",
        )
        .unwrap();
        session.reload(&edited);

        let t = session
            .apply(&"touch move 1:300,500".parse().unwrap())
            .unwrap();
        assert_eq!(t.released.to_vec(), vec![LogicalButton::A]);

        let t = session
            .apply(&"touch move 1:240,500".parse().unwrap())
            .unwrap();
        assert!(t.set.is_empty());

        let t = session
            .apply(&"touch move 1:620,500".parse().unwrap())
            .unwrap();
        assert_eq!(t.pressed.to_vec(), vec![LogicalButton::A]);
        assert_eq!(
            session.summary(),
            "3 engine call(s): press A, release A, press A"
        );
    }

    #[test]
    fn test_session_steps_respect_debounce() {
        // 2ms between steps is inside the 10ms window
        let mut session = Session::new(&config(), EngineKind::Recording, 2);
        session.apply(&"touch start 1:240,500".parse().unwrap());
        let t = session
            .apply(&"touch move 1:300,500".parse().unwrap())
            .unwrap();
        assert!(t.is_empty());

        session.apply(&Step::Wait { ms: 20 });
        let t = session
            .apply(&"touch move 1:300,500".parse().unwrap())
            .unwrap();
        assert_eq!(t.pressed.to_vec(), vec![LogicalButton::A]);
    }
}
