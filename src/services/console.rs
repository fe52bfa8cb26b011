//! # Operator Console
//!
//! Line-oriented commands that drive the simulated door panels from stdin:
//!
//! ```text
//! [door] open | close | stop
//! [door] obstacle on|off
//! [door] fault [reason...]
//! status
//! quit
//! ```
//!
//! When the door name is omitted the first configured door is used.

use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use crate::errors::{DoorSupervisorError, DoorSupervisorResult};
use crate::services::gpio::SimulatedDoorPanel;
use crate::state_management::state_manager_lifecycle::StateManagerLifecycle;
use crate::state_management::DoorStateRepository;

const DEFAULT_FAULT_REASON: &str = "operator request";

/// The three momentary buttons of a door
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Open,
    Close,
    Stop,
}

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Press { door: Option<String>, button: Button },
    Obstacle { door: Option<String>, present: bool },
    Fault { door: Option<String>, reason: String },
    Status,
    Quit,
}

fn is_verb(word: &str) -> bool {
    matches!(word, "open" | "close" | "stop" | "obstacle" | "fault" | "status" | "quit" | "exit")
}

fn parse_switch(word: Option<&str>) -> Result<bool, DoorSupervisorError> {
    match word.map(str::to_lowercase).as_deref() {
        Some("on") | Some("1") | Some("true") | Some("blocked") => Ok(true),
        Some("off") | Some("0") | Some("false") | Some("clear") => Ok(false),
        other => Err(DoorSupervisorError::InvalidCommand(
            format!("obstacle expects on|off, got {:?}", other.unwrap_or(""))
        )),
    }
}

impl FromStr for OperatorCommand {
    type Err = DoorSupervisorError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let first = words.next()
            .ok_or_else(|| DoorSupervisorError::InvalidCommand("empty command".into()))?;

        let (door, verb) = if is_verb(&first.to_lowercase()) {
            (None, first.to_lowercase())
        } else {
            let verb = words.next()
                .ok_or_else(|| DoorSupervisorError::InvalidCommand(format!("missing command after door '{}'", first)))?;
            (Some(first.to_string()), verb.to_lowercase())
        };

        let command = match verb.as_str() {
            "open" => OperatorCommand::Press { door, button: Button::Open },
            "close" => OperatorCommand::Press { door, button: Button::Close },
            "stop" => OperatorCommand::Press { door, button: Button::Stop },
            "obstacle" => OperatorCommand::Obstacle { door, present: parse_switch(words.next())? },
            "fault" => {
                let reason = words.by_ref().collect::<Vec<_>>().join(" ");
                let reason = if reason.is_empty() { DEFAULT_FAULT_REASON.to_string() } else { reason };
                OperatorCommand::Fault { door, reason }
            }
            "status" => OperatorCommand::Status,
            "quit" | "exit" => OperatorCommand::Quit,
            other => return Err(DoorSupervisorError::InvalidCommand(format!("unknown command '{}'", other))),
        };

        if words.next().is_some() && !matches!(command, OperatorCommand::Fault { .. }) {
            return Err(DoorSupervisorError::InvalidCommand(format!("unexpected arguments in '{}'", line.trim())));
        }
        Ok(command)
    }
}

/// Reads stdin on its own thread and forwards parsed commands; the channel closes at end of input.
///
/// The thread is detached from the runtime, so a read still blocked on stdin does not hold up
/// shutdown once the tick loop has returned.
pub fn spawn_stdin_reader(sender: mpsc::Sender<OperatorCommand>) -> DoorSupervisorResult<thread::JoinHandle<()>> {
    spawn_line_reader(io::BufReader::new(io::stdin()), sender)
}

/// Forwards every parsed line of `reader` to `sender` until end of input or until the receiver is gone
pub fn spawn_line_reader<R>(reader: R, sender: mpsc::Sender<OperatorCommand>) -> DoorSupervisorResult<thread::JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("operator-console".into())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        error!("Failed to read console input: {}", e);
                        return;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<OperatorCommand>() {
                    Ok(command) => {
                        if sender.blocking_send(command).is_err() {
                            return;
                        }
                    }
                    Err(e) => warn!("{}", e),
                }
            }
            info!("Console input closed");
        })?;
    Ok(handle)
}

/// Applies operator commands to the simulated panels and the supervisors
pub struct OperatorConsole {
    panels: Vec<(String, Arc<SimulatedDoorPanel>)>,
    door_repository: Arc<DoorStateRepository>,
    lifecycle: Arc<StateManagerLifecycle>,
}

impl OperatorConsole {
    pub fn new(
        panels: Vec<(String, Arc<SimulatedDoorPanel>)>,
        door_repository: Arc<DoorStateRepository>,
        lifecycle: Arc<StateManagerLifecycle>,
    ) -> Self {
        Self { panels, door_repository, lifecycle }
    }

    /// Carries out one command
    ///
    /// # Errors
    ///
    /// * `DoorNotFound` when the named door has no simulated panel
    /// * pin errors from the simulated backend
    pub async fn apply(&self, command: OperatorCommand) -> DoorSupervisorResult<()> {
        match command {
            OperatorCommand::Press { door, button } => {
                let (_, panel) = self.resolve(door.as_deref())?;
                match button {
                    Button::Open => panel.press_open(),
                    Button::Close => panel.press_close(),
                    Button::Stop => panel.press_stop(),
                }
            }
            OperatorCommand::Obstacle { door, present } => {
                let (_, panel) = self.resolve(door.as_deref())?;
                panel.set_obstacle(present)
            }
            OperatorCommand::Fault { door, reason } => {
                let (name, _) = self.resolve(door.as_deref())?;
                self.door_repository.raise_fault(name, &reason).await
            }
            OperatorCommand::Status => {
                for (name, state) in self.door_repository.get_all_states().await {
                    info!("{}: {}", name, state);
                }
                Ok(())
            }
            OperatorCommand::Quit => {
                self.lifecycle.trigger_shutdown();
                Ok(())
            }
        }
    }

    fn resolve(&self, door: Option<&str>) -> DoorSupervisorResult<(&str, &SimulatedDoorPanel)> {
        let found = match door {
            None => self.panels.first(),
            Some(name) => self.panels.iter().find(|(panel_name, _)| panel_name.eq_ignore_ascii_case(name)),
        };
        found
            .map(|(name, panel)| (name.as_str(), panel.as_ref()))
            .ok_or_else(|| DoorSupervisorError::DoorNotFound(door.unwrap_or("<default>").to_string()))
    }
}
