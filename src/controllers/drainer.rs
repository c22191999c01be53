// src/controllers/drainer.rs
//
// Runs on the host's main turn: one drain of the coalescing queue per tick,
// applying each surviving callback through the host's write interface.

use nannou_osc as osc;
use std::time::Duration;

use super::queue::{CoalescingQueue, DrainReport};
use crate::error::WriteError;
use crate::host::Host;
use crate::models::{Callback, Value};

pub const DEFAULT_TICK: Duration = Duration::from_millis(10);
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// Session-visible state updated by unmatched messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub last_address: String,
    pub last_payload: String,
    pub unmatched: u64,
}

impl Diagnostics {
    fn record(&mut self, address: String, args: &[osc::Type]) {
        self.last_address = address;
        self.last_payload = format!("{:?}", args);
        self.unmatched += 1;
    }
}

pub struct MainTurnDrainer {
    period: Duration,
    monitor: bool,
    diagnostics: Diagnostics,
}

impl MainTurnDrainer {
    pub fn new(period: Duration, monitor: bool) -> Self {
        Self {
            period: period.max(MIN_TICK),
            monitor,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Exactly one drain cycle. Write failures are logged when monitoring and
    /// never abort the rest of the batch.
    pub fn tick<H: Host>(&mut self, queue: &CoalescingQueue, host: &mut H) -> DrainReport<WriteError> {
        let diagnostics = &mut self.diagnostics;
        let report = queue.drain_and_apply(|callback| apply_callback(callback, host, diagnostics));

        if self.monitor {
            for (address, e) in &report.failures {
                log::warn!("improper content received on {}: {}", address, e);
            }
        }
        if report.discarded > 0 {
            log::trace!("coalesced {} stale messages", report.discarded);
        }
        report
    }
}

fn argument(args: &[osc::Type], selector: usize) -> Result<Value, WriteError> {
    let arg = args.get(selector).ok_or(WriteError::MissingArgument {
        selector,
        available: args.len(),
    })?;
    Value::from_osc(arg).ok_or(WriteError::UnsupportedArgument { selector })
}

fn component(args: &[osc::Type], selector: usize) -> Result<f32, WriteError> {
    argument(args, selector)?
        .as_f32()
        .ok_or(WriteError::UnsupportedArgument { selector })
}

/// Apply one callback to the host.
pub fn apply_callback<H: Host>(
    callback: Callback,
    host: &mut H,
    diagnostics: &mut Diagnostics,
) -> Result<(), WriteError> {
    match callback {
        Callback::Unmatched { address, args } => {
            diagnostics.record(address, &args);
            Ok(())
        }
        Callback::ScalarWrite {
            target,
            field,
            custom,
            selectors,
            args,
            ..
        } => {
            let value = argument(&args, selectors.first().copied().unwrap_or(0))?;
            if custom {
                host.write_custom(target, &field, value)
            } else {
                host.write_field(target, &field, None, value)
            }
        }
        Callback::ComponentWrite {
            target,
            field,
            component: index,
            selectors,
            args,
            ..
        } => {
            let value = argument(&args, selectors.first().copied().unwrap_or(0))?;
            host.write_field(target, &field, Some(index), value)
        }
        Callback::VectorWrite {
            target,
            field,
            selectors,
            args,
            ..
        } => {
            let components = selectors
                .iter()
                .map(|selector| component(&args, *selector))
                .collect::<Result<Vec<f32>, _>>()?;
            host.write_field(target, &field, None, Value::Vector(components))
        }
    }
}
