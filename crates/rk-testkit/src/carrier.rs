//! Scripted carrier-quote client for drift scenarios.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use rk_drift::{CarrierError, CarrierQuoteClient, ExternalQuote, Probe, ProbeRequest};

#[derive(Clone, Debug)]
pub enum Scripted {
    Quote(ExternalQuote),
    Fail(CarrierError),
    /// Answer with the quote after the delay (tokio time).
    Delayed(Duration, ExternalQuote),
}

/// Answers each probe from a script. Unscripted probes get `NoQuote`.
#[derive(Default)]
pub struct ScriptedCarrier {
    script: HashMap<Probe, Scripted>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Probe>>,
}

impl ScriptedCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, probe: Probe, reply: Scripted) -> Self {
        self.script.insert(canonical(&probe), reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Probes in the order the carrier was asked for them.
    pub fn seen(&self) -> Vec<Probe> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl CarrierQuoteClient for ScriptedCarrier {
    async fn quote(&self, request: &ProbeRequest) -> Result<ExternalQuote, CarrierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.probe.clone());
        }
        match self.script.get(&canonical(&request.probe)).cloned() {
            Some(Scripted::Quote(q)) => Ok(q),
            Some(Scripted::Fail(e)) => Err(e),
            Some(Scripted::Delayed(d, q)) => {
                tokio::time::sleep(d).await;
                Ok(q)
            }
            None => Err(CarrierError::NoQuote),
        }
    }
}

fn canonical(probe: &Probe) -> Probe {
    Probe {
        key: probe.key.canonical(),
        ..probe.clone()
    }
}
