//! Input scripts for replaying pointer sessions against a pad layout
//!
//! A script is a YAML list of steps. Each step is one UI event (or an engine
//! lifecycle change) and is separated from the previous one by `step_ms`,
//! so debouncing behaves as it would with real input.
//!
//! ```yaml
//! step_ms: 16
//! steps:
//!   - type: touch
//!     phase: start
//!     touches: [{ id: 1, x: 305, y: 505 }]
//!   - type: engine_ready
//!   - type: mouse
//!     kind: up
//! ```
//!
//! The same steps can be typed at the REPL in a compact form, see
//! [`Step::from_str`].

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tokio::fs;

use crate::input::touchpad::{LogicalButton, MouseKind, Rect, TouchPhase, TouchPoint};

/// A recorded or hand-written pointer session
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Simulated time between consecutive steps
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One scripted event
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Touch event; `touches` lists every contact still down afterwards
    Touch {
        phase: TouchPhase,
        #[serde(default)]
        touches: Vec<TouchPoint>,
    },
    Mouse {
        kind: MouseKind,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default = "default_mouse_buttons")]
        buttons: u16,
    },
    /// The emulator finished loading
    EngineReady,
    /// The emulator went away (e.g. ROM reload)
    EngineLost,
    /// Move/resize a button's element, or unmount it when `rect` is absent
    Region {
        button: LogicalButton,
        #[serde(default)]
        rect: Option<Rect>,
    },
    /// Let simulated time pass
    Wait { ms: u64 },
}

impl Script {
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read script: {}", path))?;
        Self::from_yaml(&contents).with_context(|| format!("Invalid script: {}", path))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).context("Failed to parse YAML script")
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Touch { phase, touches } => {
                write!(f, "touch {:?}", phase)?;
                for t in touches {
                    write!(f, " {}:{},{}", t.id, t.x, t.y)?;
                }
                Ok(())
            }
            Step::Mouse { kind, x, y, buttons } => {
                write!(f, "mouse {:?} {},{} (buttons={})", kind, x, y, buttons)
            }
            Step::EngineReady => f.write_str("engine ready"),
            Step::EngineLost => f.write_str("engine lost"),
            Step::Region { button, rect: Some(rect) } => write!(f, "region {} -> {}", button, rect),
            Step::Region { button, rect: None } => write!(f, "region {} unmounted", button),
            Step::Wait { ms } => write!(f, "wait {}ms", ms),
        }
    }
}

/// Compact one-line form used by the REPL
///
/// ```text
/// touch start 1:305,505 2:245,505
/// touch end
/// mouse down 305 505
/// region a 280 480 50 50
/// region a off
/// ready | lost | wait 20
/// ```
impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let args: Vec<&str> = words.collect();

        match command {
            "touch" => {
                let (phase, points) = args
                    .split_first()
                    .ok_or_else(|| anyhow!("usage: touch <start|move|end|cancel> [id:x,y ...]"))?;
                let phase = parse_phase(phase)?;
                let touches = points
                    .iter()
                    .map(|p| parse_touch_point(p))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Step::Touch { phase, touches })
            }
            "mouse" => {
                let usage = "usage: mouse <down|move|up|leave> [x y [buttons]]";
                let kind = parse_mouse_kind(args.first().ok_or_else(|| anyhow!(usage))?)?;
                let x = args.get(1).map(|v| parse_f64(v)).transpose()?.unwrap_or(0.0);
                let y = args.get(2).map(|v| parse_f64(v)).transpose()?.unwrap_or(0.0);
                let buttons = match args.get(3) {
                    Some(v) => v.parse().with_context(|| format!("bad button mask '{}'", v))?,
                    None => default_mouse_buttons(),
                };
                Ok(Step::Mouse { kind, x, y, buttons })
            }
            "ready" => Ok(Step::EngineReady),
            "lost" => Ok(Step::EngineLost),
            "region" => match args.as_slice() {
                [button, "off"] => Ok(Step::Region {
                    button: button.parse()?,
                    rect: None,
                }),
                [button, x, y, w, h] => Ok(Step::Region {
                    button: button.parse()?,
                    rect: Some(Rect::new(parse_f64(x)?, parse_f64(y)?, parse_f64(w)?, parse_f64(h)?)),
                }),
                _ => bail!("usage: region <button> <x> <y> <width> <height> | region <button> off"),
            },
            "wait" => {
                let ms = args
                    .first()
                    .ok_or_else(|| anyhow!("usage: wait <ms>"))?
                    .parse()
                    .context("bad wait duration")?;
                Ok(Step::Wait { ms })
            }
            other => bail!("unknown command '{}'", other),
        }
    }
}

fn parse_phase(s: &str) -> Result<TouchPhase> {
    match s {
        "start" => Ok(TouchPhase::Start),
        "move" => Ok(TouchPhase::Move),
        "end" => Ok(TouchPhase::End),
        "cancel" => Ok(TouchPhase::Cancel),
        other => bail!("unknown touch phase '{}'", other),
    }
}

fn parse_mouse_kind(s: &str) -> Result<MouseKind> {
    match s {
        "down" => Ok(MouseKind::Down),
        "move" => Ok(MouseKind::Move),
        "up" => Ok(MouseKind::Up),
        "leave" => Ok(MouseKind::Leave),
        other => bail!("unknown mouse event '{}'", other),
    }
}

/// `id:x,y`
fn parse_touch_point(s: &str) -> Result<TouchPoint> {
    let (id, coords) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("touch point '{}' must look like id:x,y", s))?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| anyhow!("touch point '{}' must look like id:x,y", s))?;
    Ok(TouchPoint {
        id: id.parse().with_context(|| format!("bad touch id '{}'", id))?,
        x: parse_f64(x)?,
        y: parse_f64(y)?,
    })
}

fn parse_f64(s: &str) -> Result<f64> {
    s.parse().with_context(|| format!("bad coordinate '{}'", s))
}

// Default value functions
fn default_step_ms() -> u64 { 16 }
fn default_mouse_buttons() -> u16 { 1 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_script() {
        let script = Script::from_yaml(
            r#"
steps:
  - type: touch
    phase: start
    touches: [{ id: 1, x: 305, y: 505 }]
  - type: engine_ready
  - type: mouse
    kind: up
  - type: region
    button: a
  - type: wait
    ms: 50
"#,
        )
        .unwrap();

        assert_eq!(script.step_ms, 16);
        assert_eq!(script.steps.len(), 5);
        assert_eq!(
            script.steps[0],
            Step::Touch {
                phase: TouchPhase::Start,
                touches: vec![TouchPoint { id: 1, x: 305.0, y: 505.0 }],
            }
        );
        assert_eq!(script.steps[1], Step::EngineReady);
        assert_eq!(
            script.steps[2],
            Step::Mouse { kind: MouseKind::Up, x: 0.0, y: 0.0, buttons: 1 }
        );
        assert_eq!(script.steps[3], Step::Region { button: LogicalButton::A, rect: None });
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "touch move 1:10,20 2:30.5,40".parse::<Step>().unwrap(),
            Step::Touch {
                phase: TouchPhase::Move,
                touches: vec![
                    TouchPoint { id: 1, x: 10.0, y: 20.0 },
                    TouchPoint { id: 2, x: 30.5, y: 40.0 },
                ],
            }
        );
        assert_eq!(
            "touch end".parse::<Step>().unwrap(),
            Step::Touch { phase: TouchPhase::End, touches: vec![] }
        );
        assert_eq!(
            "mouse down 5 6".parse::<Step>().unwrap(),
            Step::Mouse { kind: MouseKind::Down, x: 5.0, y: 6.0, buttons: 1 }
        );
        assert_eq!(
            "region start 1 2 3 4".parse::<Step>().unwrap(),
            Step::Region {
                button: LogicalButton::Start,
                rect: Some(Rect::new(1.0, 2.0, 3.0, 4.0)),
            }
        );
        assert_eq!(
            "region b off".parse::<Step>().unwrap(),
            Step::Region { button: LogicalButton::B, rect: None }
        );
        assert_eq!("ready".parse::<Step>().unwrap(), Step::EngineReady);
        assert_eq!("wait 20".parse::<Step>().unwrap(), Step::Wait { ms: 20 });
    }

    #[test]
    fn test_reject_bad_commands() {
        assert!("".parse::<Step>().is_err());
        assert!("jump".parse::<Step>().is_err());
        assert!("touch sideways".parse::<Step>().is_err());
        assert!("touch start 1-10-20".parse::<Step>().is_err());
        assert!("region turbo off".parse::<Step>().is_err());
        assert!("mouse".parse::<Step>().is_err());
    }
}
