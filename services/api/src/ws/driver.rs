//! Runs the simulation engine for one WebSocket session.
//!
//! The engine itself is a synchronous state machine; this driver owns the
//! asynchronous edges around it. Client messages, countdown ticks and pacing
//! expiries all funnel into one `select!` loop, so engine transitions are
//! strictly serialized and a submission can never interleave with a timer
//! expiry.

use super::protocol::{ClientMessage, ServerMessage};
use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use wardsim_core::engine::{Effect, SimulationEngine};
use wardsim_core::repository::{ResultSink, ScenarioRepository, load_scenario};
use wardsim_core::timer::{CountdownTimer, TimerEvent};

use std::sync::Arc;

pub struct SessionDriver<R, S> {
    repo: Arc<R>,
    sink: Arc<S>,
    out: mpsc::Sender<ServerMessage>,
    engine: SimulationEngine,
    timer: CountdownTimer,
    timer_rx: mpsc::Receiver<TimerEvent>,
    pacing_tx: mpsc::Sender<()>,
    pacing_rx: mpsc::Receiver<()>,
    scenario_id: Option<String>,
}

impl<R, S> SessionDriver<R, S>
where
    R: ScenarioRepository + 'static,
    S: ResultSink + 'static,
{
    pub fn new(repo: Arc<R>, sink: Arc<S>, out: mpsc::Sender<ServerMessage>) -> Self {
        let (timer_tx, timer_rx) = mpsc::channel(32);
        let (pacing_tx, pacing_rx) = mpsc::channel(8);
        Self {
            repo,
            sink,
            out,
            engine: SimulationEngine::new(),
            timer: CountdownTimer::new(timer_tx),
            timer_rx,
            pacing_tx,
            pacing_rx,
            scenario_id: None,
        }
    }

    /// The session event loop. Runs until the client channel closes or the
    /// outbound channel is dropped (client disconnected).
    pub async fn run(mut self, mut client_rx: mpsc::Receiver<ClientMessage>) -> Result<()> {
        loop {
            tokio::select! {
                msg = client_rx.recv() => {
                    let Some(msg) = msg else { break };
                    self.handle_client(msg).await?;
                }
                Some(event) = self.timer_rx.recv() => {
                    let effects = match event {
                        TimerEvent::Tick { remaining } => self.engine.on_tick(remaining),
                        TimerEvent::Expired => self.engine.on_time_expired(),
                    };
                    self.apply(effects).await?;
                }
                Some(()) = self.pacing_rx.recv() => {
                    let effects = self.engine.resume();
                    self.apply(effects).await?;
                }
            }
        }
        self.timer.stop();
        Ok(())
    }

    async fn handle_client(&mut self, msg: ClientMessage) -> Result<()> {
        match msg {
            ClientMessage::Start { scenario_id } => {
                // A restart abandons the previous run outright.
                self.timer.stop();

                match load_scenario(self.repo.as_ref(), &scenario_id).await {
                    Ok(scenario) => {
                        info!(%scenario_id, "starting session");
                        self.send(ServerMessage::Started {
                            scenario: scenario.clone(),
                        })
                        .await?;
                        self.scenario_id = Some(scenario_id);
                        let effects = self.engine.start(scenario);
                        self.apply(effects).await?;
                    }
                    Err(e) => {
                        warn!(%scenario_id, error = %e, "scenario lookup failed");
                        self.send(ServerMessage::Error {
                            message: e.to_string(),
                        })
                        .await?;
                    }
                }
            }
            ClientMessage::Submit { text } => {
                let effects = self.engine.submit(&text);
                self.apply(effects).await?;
            }
        }
        Ok(())
    }

    /// Executes the engine's requested side effects in order.
    async fn apply(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::ShowMessage { kind, text } => {
                    self.send(ServerMessage::Message { kind, text }).await?;
                }
                Effect::AwaitInput => {
                    self.send(ServerMessage::AwaitingInput).await?;
                }
                Effect::LockInput => {
                    self.send(ServerMessage::InputLocked).await?;
                }
                Effect::ScheduleAdvance { delay } => {
                    let pacing_tx = self.pacing_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = pacing_tx.send(()).await;
                    });
                }
                Effect::TimerVisible { visible } => {
                    self.send(ServerMessage::TimerVisibility { visible }).await?;
                }
                Effect::StartTimer { seconds } => {
                    self.timer.arm(seconds);
                    self.timer.start();
                }
                Effect::StopTimer => {
                    self.timer.stop();
                }
                Effect::TimerTick { remaining } => {
                    self.send(ServerMessage::TimerTick {
                        remaining_seconds: remaining,
                    })
                    .await?;
                }
                Effect::Complete(result) => {
                    // Persistence failures are logged, never surfaced to the
                    // learner; the on-screen result still appears.
                    if let Some(scenario_id) = &self.scenario_id {
                        if let Err(e) = self.sink.record(scenario_id, &result).await {
                            error!(%scenario_id, error = ?e, "failed to record session result");
                        }
                    }
                    self.send(ServerMessage::SessionComplete { result }).await?;
                }
            }
        }
        Ok(())
    }

    async fn send(&self, msg: ServerMessage) -> Result<()> {
        self.out
            .send(msg)
            .await
            .context("client outbound channel closed")
    }
}
