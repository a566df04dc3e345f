//! Event loop and timer scheduling.
//!
//! The runtime owns the controller and is the only place it is touched.
//! Player inputs, service replies and timer fires all arrive through one
//! inbox and are handled one at a time; service calls and timers run as
//! spawned tasks that post their results back to the inbox.

use crate::config::ClientConfig;
use crate::service::GameService;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uno_core::{
    Color, Command, Controller, GameSnapshot, Request, ServiceError, SessionView, StackChoice,
    Ticket, TimerSlot,
};
use uuid::Uuid;

/// Everything the event loop reacts to
#[derive(Debug)]
pub enum Input {
    Start,
    Refresh,
    Click(usize),
    ChooseStack(StackChoice),
    ChooseColor(Color),
    CancelSelection,
    Draw,
    Declare,
    /// Reply to `start` + `getState`
    Started(Result<(Uuid, GameSnapshot), ServiceError>),
    /// Reply to any other service request
    Reply {
        game: Uuid,
        request: Request,
        result: Result<GameSnapshot, ServiceError>,
    },
    Timer(Ticket),
    Shutdown,
}

/// Cloneable access to a running event loop
#[derive(Clone)]
pub struct RuntimeHandle {
    sender: mpsc::UnboundedSender<Input>,
    views: watch::Receiver<SessionView>,
}

impl RuntimeHandle {
    /// Queue an input. Returns false once the loop has stopped.
    pub fn send(&self, input: Input) -> bool {
        self.sender.send(input).is_ok()
    }

    pub fn views(&self) -> watch::Receiver<SessionView> {
        self.views.clone()
    }
}

/// At most one timer task per slot.
///
/// Scheduling into an occupied slot aborts the previous task first.
struct Scheduler {
    tasks: HashMap<TimerSlot, JoinHandle<()>>,
    inbox: mpsc::UnboundedSender<Input>,
}

impl Scheduler {
    fn new(inbox: mpsc::UnboundedSender<Input>) -> Self {
        Self {
            tasks: HashMap::new(),
            inbox,
        }
    }

    fn schedule(&mut self, ticket: Ticket, delay: Duration) {
        self.cancel(ticket.slot);
        let inbox = self.inbox.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = inbox.send(Input::Timer(ticket));
        });
        self.tasks.insert(ticket.slot, handle);
    }

    fn cancel(&mut self, slot: TimerSlot) {
        if let Some(handle) = self.tasks.remove(&slot) {
            handle.abort();
        }
    }

    fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

pub struct Runtime<S> {
    controller: Controller,
    service: Arc<S>,
    game: Option<Uuid>,
    scheduler: Scheduler,
    sender: mpsc::UnboundedSender<Input>,
    inbox: mpsc::UnboundedReceiver<Input>,
    views: watch::Sender<SessionView>,
    poll_interval: Option<Duration>,
}

impl<S: GameService + 'static> Runtime<S> {
    pub fn new(service: Arc<S>, config: &ClientConfig) -> (Self, RuntimeHandle) {
        let controller = Controller::new(config.timings.clone());
        Self::with_controller(service, controller, config.poll_interval)
    }

    pub fn with_controller(
        service: Arc<S>,
        controller: Controller,
        poll_interval: Option<Duration>,
    ) -> (Self, RuntimeHandle) {
        let (sender, inbox) = mpsc::unbounded_channel();
        let (views, view_rx) = watch::channel(controller.view());

        let runtime = Self {
            controller,
            service,
            game: None,
            scheduler: Scheduler::new(sender.clone()),
            sender: sender.clone(),
            inbox,
            views,
            poll_interval,
        };
        let handle = RuntimeHandle {
            sender,
            views: view_rx,
        };
        (runtime, handle)
    }

    /// Run until [`Input::Shutdown`]
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut poll = self.poll_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        loop {
            let input = tokio::select! {
                input = self.inbox.recv() => match input {
                    Some(input) => input,
                    None => break,
                },
                _ = next_poll(&mut poll) => Input::Refresh,
            };

            if matches!(input, Input::Shutdown) {
                info!("Shutting down");
                break;
            }
            self.dispatch(input);
        }

        self.scheduler.cancel_all();
        Ok(())
    }

    fn dispatch(&mut self, input: Input) {
        let commands = match input {
            Input::Start => self.controller.start(),
            Input::Refresh => self.controller.refresh(),
            Input::Click(index) => self.controller.click(index),
            Input::ChooseStack(choice) => self.controller.choose_stack(choice),
            Input::ChooseColor(color) => self.controller.choose_color(color),
            Input::CancelSelection => {
                self.controller.cancel_selection();
                Vec::new()
            }
            Input::Draw => self.controller.draw(),
            Input::Declare => self.controller.declare(),
            Input::Started(result) => {
                let result = result.map(|(game, snapshot)| {
                    info!(%game, "Session started");
                    self.game = Some(game);
                    snapshot
                });
                self.controller.on_reply(Request::Start, result)
            }
            Input::Reply {
                game,
                request,
                result,
            } => {
                if self.game != Some(game) {
                    debug!(%game, ?request, "Dropping reply for a previous game");
                    return;
                }
                self.controller.on_reply(request, result)
            }
            Input::Timer(ticket) => self.controller.on_timer(ticket),
            Input::Shutdown => Vec::new(),
        };

        self.execute(commands);
        self.publish();
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Schedule { ticket, delay } => self.scheduler.schedule(ticket, delay),
                Command::Cancel { slot } => self.scheduler.cancel(slot),
                Command::StartSession => self.spawn_start(),
                other => self.spawn_request(other),
            }
        }
    }

    fn spawn_start(&self) {
        let service = Arc::clone(&self.service);
        let inbox = self.sender.clone();
        tokio::spawn(async move {
            let result = match service.start().await {
                Ok(game) => service
                    .get_state(game)
                    .await
                    .map(|snapshot| (game, snapshot)),
                Err(err) => Err(err),
            };
            let _ = inbox.send(Input::Started(result));
        });
    }

    fn spawn_request(&self, command: Command) {
        let Some(request) = command.request() else {
            return;
        };
        let Some(game) = self.game else {
            warn!(?request, "No game in progress");
            return;
        };
        debug!(?request, "Submitting to game service");

        let service = Arc::clone(&self.service);
        let inbox = self.sender.clone();
        tokio::spawn(async move {
            let result = match command {
                Command::FetchState => service.get_state(game).await,
                Command::Play {
                    indices,
                    declared_color,
                } => service.play(game, indices, declared_color).await,
                Command::Draw { .. } => service.draw(game).await,
                Command::AutomatedTurn => service.process_automated_turn(game).await,
                _ => return,
            };
            let _ = inbox.send(Input::Reply {
                game,
                request,
                result,
            });
        });
    }

    fn publish(&self) {
        let view = self.controller.view();
        self.views.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}

async fn next_poll(poll: &mut Option<Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
