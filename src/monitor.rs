//! The keep-alive cycle: poll the link, reconnect on failure, tell the user.

use crate::notify::Notifier;
use crate::wifi::NetworkControl;
use secrecy::SecretString;
use std::time::Duration;

/// What a single monitor iteration observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    StillConnected,
    Recovered,
    Failed,
}

/// Background polling/reconnect cycle for one network.
///
/// Purely sequential: every step of an iteration, including the connect
/// attempt's own polling, blocks the worker it runs on. Iterations never
/// overlap and there is at most one outstanding connect attempt.
pub struct Monitor<N, T> {
    adapter: N,
    notifier: T,
    interval: Duration,
}

impl<N: NetworkControl, T: Notifier> Monitor<N, T> {
    pub fn new(adapter: N, notifier: T, interval: Duration) -> Self {
        Self {
            adapter,
            notifier,
            interval,
        }
    }

    /// One iteration: check the link, reconnect and notify when it is down.
    /// Never errors; a failed attempt is retried on the next interval.
    pub fn tick(&self, ssid: &str, secret: &SecretString) -> TickOutcome {
        if self.adapter.is_connected(ssid) {
            log::info!("still connected to {ssid}");
            return TickOutcome::StillConnected;
        }

        log::info!("not connected to {ssid}, trying to reconnect");
        let joined = self.adapter.connect(ssid, secret);
        if joined && self.adapter.is_connected(ssid) {
            log::info!("reconnected to {ssid}");
            self.notifier
                .notify("Network recovered", &format!("Connected to {ssid}"));
            TickOutcome::Recovered
        } else {
            log::warn!("could not connect to {ssid}");
            self.notifier
                .notify("Connection failed", &format!("Could not connect to {ssid}"));
            TickOutcome::Failed
        }
    }

    /// Poll forever at the configured interval. There is no internal exit
    /// condition; only process teardown stops the loop.
    pub fn run(&self, ssid: &str, secret: &SecretString) {
        loop {
            self.tick(ssid, secret);
            std::thread::sleep(self.interval);
        }
    }
}

/// One-shot mode: make sure the network is up right now, then report.
/// Returns whether the host ended up connected.
pub fn connect_once<N: NetworkControl, T: Notifier>(
    adapter: &N,
    notifier: &T,
    ssid: &str,
    secret: &SecretString,
) -> bool {
    if adapter.is_connected(ssid) {
        log::info!("already connected to {ssid}");
        return true;
    }

    log::info!("trying to connect to {ssid}");
    if adapter.connect(ssid, secret) && adapter.is_connected(ssid) {
        log::info!("connected to {ssid}");
        notifier.notify("Network connected", &format!("Connected to {ssid}"));
        true
    } else {
        log::warn!("could not connect to {ssid}");
        notifier.notify("Connection failed", &format!("Could not connect to {ssid}"));
        false
    }
}
