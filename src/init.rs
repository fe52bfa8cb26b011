use std::sync::Arc;
use anyhow::Result;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use crate::config::Settings;
use crate::controllers::DoorController;
use crate::event_handling::EventHandler;
use crate::services::console::OperatorConsole;
use crate::services::{DigitalIo, InputSampler, SimulatedDoorPanel, TokioClock};
use crate::state_management::event_dispatcher::EventDispatcher;
use crate::state_management::state_manager_lifecycle::StateManagerLifecycle;
use crate::state_management::DoorStateRepository;
use crate::utils::logging;

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct AppContext {
    pub settings: Arc<Settings>,
    pub door_repository: Arc<DoorStateRepository>,
    pub door_controller: DoorController,
    pub event_handler: Arc<EventHandler>,
    pub lifecycle: Arc<StateManagerLifecycle>,
    pub console: Option<OperatorConsole>,
    /// Keeps the file appender flushing until the context is dropped
    pub log_guard: Option<WorkerGuard>,
}

pub async fn initialize() -> Result<AppContext> {
    let settings = Arc::new(Settings::new()?);
    let log_guard = logging::init_logger(settings.logging.path.clone(), &settings.logging.level)?;

    let door_repository = Arc::new(DoorStateRepository::new());
    door_repository.initialize_from_settings(&settings).await?;

    let (event_sender, event_receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let event_dispatcher = Arc::new(EventDispatcher::new(event_sender));
    let event_handler = Arc::new(EventHandler::new(event_receiver));

    let mut samplers = Vec::new();
    let mut panels = Vec::new();
    for door in &settings.doors {
        let panel = Arc::new(SimulatedDoorPanel::new(door.pins, door.active_low_inputs));
        let io: Arc<dyn DigitalIo> = panel.gpio();
        samplers.push((door.door_name.clone(), InputSampler::from_settings(door, io)));
        panels.push((door.door_name.clone(), panel));
    }

    let door_controller = DoorController::new(
        samplers,
        Arc::clone(&door_repository),
        Arc::new(TokioClock::new()),
        event_dispatcher,
    );

    let lifecycle = Arc::new(StateManagerLifecycle::new());

    let console = settings.console.enabled.then(|| OperatorConsole::new(
        panels,
        Arc::clone(&door_repository),
        Arc::clone(&lifecycle),
    ));

    Ok(AppContext {
        settings,
        door_repository,
        door_controller,
        event_handler,
        lifecycle,
        console,
        log_guard,
    })
}
