// src/controllers/engine.rs
//
// Engine session: Stopped --start--> Running --stop / send error--> Stopped.
// A session owns the queue, the listener thread, the drainer and the outbound
// sender; all of them are created on start and dropped on stop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use super::dispatcher::Dispatcher;
use super::drainer::{Diagnostics, MainTurnDrainer};
use super::queue::CoalescingQueue;
use crate::config::Config;
use crate::error::{BindingResolutionError, EngineError};
use crate::host::Host;
use crate::models::BindingTable;
use crate::services::{ListenerStats, NetworkListener, OscSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Stopped,
    Running,
}

#[derive(Debug, PartialEq)]
pub enum StartOutcome {
    /// Running; the listed bindings could not be compiled and are ignored.
    Started { skipped: Vec<BindingResolutionError> },
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub applied: usize,
    pub discarded: usize,
    pub failed: usize,
    pub sent: usize,
}

struct Session {
    queue: Arc<CoalescingQueue>,
    listener: NetworkListener,
    drainer: MainTurnDrainer,
    sender: OscSender,
}

pub struct Engine {
    config: Config,
    session: Option<Session>,
    last_diagnostics: Diagnostics,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session: None,
            last_diagnostics: Diagnostics::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> Status {
        if self.session.is_some() {
            Status::Running
        } else {
            Status::Stopped
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval()
    }

    /// Compile bindings, open the outbound socket, bind the listener. Any
    /// socket failure leaves the engine stopped.
    pub fn start<H: Host>(&mut self, table: &BindingTable, host: &H) -> Result<StartOutcome, EngineError> {
        if self.session.is_some() {
            log::info!("OSC engine already running");
            return Ok(StartOutcome::AlreadyRunning);
        }
        self.config.validate()?;
        let network = &self.config.network;

        let (dispatcher, skipped) = Dispatcher::compile(table, host);
        for e in &skipped {
            log::warn!("improper setup, binding skipped: {}", e);
        }

        let sender = OscSender::new(
            &network.destination_address,
            network.destination_port,
            dispatcher.bound_fields(),
        )?;
        sender.send_greeting()?;

        let bound = dispatcher.len();
        let queue = Arc::new(CoalescingQueue::new());
        let listener = NetworkListener::start(
            &network.listen_address,
            network.listen_port,
            Arc::new(dispatcher),
            queue.clone(),
            self.config.receive_timeout(),
        )?;

        self.session = Some(Session {
            queue,
            listener,
            drainer: MainTurnDrainer::new(self.config.tick_interval(), self.config.engine.monitor),
            sender,
        });
        log::info!(
            "OSC engine running with {} of {} bindings",
            bound,
            table.len()
        );
        Ok(StartOutcome::Started { skipped })
    }

    /// Start only when autorun is enabled. Used after loading a project.
    pub fn on_load<H: Host>(
        &mut self,
        table: &BindingTable,
        host: &H,
    ) -> Result<Option<StartOutcome>, EngineError> {
        if !self.config.engine.autorun {
            return Ok(None);
        }
        self.start(table, host).map(Some)
    }

    /// Stop the listener and wait for its thread before reporting stopped.
    pub fn stop(&mut self) -> StopOutcome {
        let Some(mut session) = self.session.take() else {
            return StopOutcome::AlreadyStopped;
        };
        session.listener.stop();
        self.last_diagnostics = session.drainer.diagnostics().clone();
        log::info!("OSC engine stopped");
        StopOutcome::Stopped
    }

    /// Recompile after the binding table changed.
    pub fn reload<H: Host>(&mut self, table: &BindingTable, host: &H) -> Result<StartOutcome, EngineError> {
        self.stop();
        self.start(table, host)
    }

    /// One main-turn slice: drain inbound messages, then send changed values.
    /// Does nothing while stopped. A send failure stops the engine.
    pub fn tick<H: Host>(&mut self, host: &mut H) -> Result<TickReport, EngineError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(TickReport::default());
        };

        let drained = session.drainer.tick(&session.queue, host);
        let polled = session.sender.poll(host);

        let sent = match polled {
            Ok(sent) => sent,
            Err(e) => {
                log::error!("output error, stopping: {}", e);
                self.stop();
                return Err(e.into());
            }
        };

        Ok(TickReport {
            applied: drained.applied,
            discarded: drained.discarded,
            failed: drained.failures.len(),
            sent,
        })
    }

    /// Last received unmatched address and payload.
    pub fn diagnostics(&self) -> &Diagnostics {
        match &self.session {
            Some(session) => session.drainer.diagnostics(),
            None => &self.last_diagnostics,
        }
    }

    pub fn listen_addr(&self) -> Option<SocketAddr> {
        self.session.as_ref().map(|s| s.listener.local_addr())
    }

    pub fn listener_stats(&self) -> Option<ListenerStats> {
        self.session.as_ref().map(|s| s.listener.stats())
    }

    /// Callbacks waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.queue.len())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}
