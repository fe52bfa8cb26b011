use std::time::Duration;
use anyhow::Result;
use tracing::{error, info, warn};
use tokio::signal::ctrl_c;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, MissedTickBehavior};
use door_supervisor::errors::DoorSupervisorError;
use door_supervisor::init::initialize;
use door_supervisor::services::console::spawn_stdin_reader;

const EVENT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// The main entry point of the door supervisor
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}


/// The core logic of the door supervisor
///
/// 1. Loads settings, initializes logging and builds the doors, the controller and the event pipeline
/// 2. Spawns the event handler and, when enabled, the stdin operator console
/// 3. Ticks every door at the configured interval until Ctrl-C or the `quit` command
/// 4. Clears the indicators, lets the event handler drain and logs the activity summary
async fn run() -> Result<()> {
    let ctx = initialize().await?;
    info!("Supervising {} door(s) every {} ms", ctx.settings.doors.len(), ctx.settings.supervisor.tick_interval_ms);

    let event_handler = ctx.event_handler.clone();
    let handler_task = tokio::spawn(async move {
        if let Err(e) = event_handler.run().await {
            error!("EventHandler error: {:?}", e);
        }
    });

    let (command_sender, mut command_receiver) = mpsc::channel(32);
    let mut console_open = ctx.console.is_some();
    if console_open {
        info!("Operator console ready: [door] open|close|stop|obstacle on|off|fault <reason>, status, quit");
        spawn_stdin_reader(command_sender)?;
    } else {
        drop(command_sender);
    }

    let mut tick_interval = interval(Duration::from_millis(ctx.settings.supervisor.tick_interval_ms));
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                if let Err(e) = ctx.door_controller.run_tick_cycle().await {
                    error!("Error during tick cycle: {}", e);
                }
            }
            command = command_receiver.recv(), if console_open => {
                match (command, ctx.console.as_ref()) {
                    (Some(command), Some(console)) => {
                        if let Err(e) = console.apply(command).await {
                            warn!("{}", e);
                        }
                    }
                    _ => console_open = false,
                }
            }
            _ = ctx.lifecycle.wait_for_shutdown() => {
                info!("Shutdown requested from the console");
                break;
            }
            _ = ctrl_c() => {
                info!("Received shutdown signal. Shutting down gracefully...");
                break;
            }
        }
    }

    ctx.door_controller.shutdown_outputs();
    drop(ctx.door_controller);
    match timeout(EVENT_DRAIN_TIMEOUT, handler_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("{}", DoorSupervisorError::TaskJoinError(e.to_string())),
        Err(_) => warn!("Event handler did not drain in time"),
    }
    ctx.event_handler.log_summary();
    Ok(())
}
