//! Scripted operation for driving retry chains in tests.
//!
//! Replays a fixed list of outcomes (repeating the last one once exhausted),
//! optionally spending simulated time per attempt, and records when each
//! attempt was issued.

#![allow(dead_code)]

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rtry_core::{Error, Outcome, TransportError};
use tokio::time::{sleep, Instant};

#[derive(Clone)]
pub struct Script {
    outcomes: Arc<Vec<Outcome<&'static str>>>,
    work: Duration,
    issued: Arc<Mutex<Vec<Instant>>>,
}

impl Script {
    pub fn new(outcomes: Vec<Outcome<&'static str>>) -> Self {
        Self {
            outcomes: Arc::new(outcomes),
            work: Duration::ZERO,
            issued: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every attempt takes `work` of (paused) clock time before resolving.
    pub fn with_work(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    pub fn attempt(&self) -> impl Future<Output = Outcome<&'static str>> {
        let mut issued = self.issued.lock().unwrap();
        let i = issued.len();
        issued.push(Instant::now());
        let outcome = self
            .outcomes
            .get(i)
            .or(self.outcomes.last())
            .cloned()
            .unwrap_or(Outcome::NotRequested);
        let work = self.work;
        async move {
            if !work.is_zero() {
                sleep(work).await;
            }
            outcome
        }
    }

    pub fn attempts(&self) -> usize {
        self.issued.lock().unwrap().len()
    }

    /// Offset of each attempt from the first one.
    pub fn offsets(&self) -> Vec<Duration> {
        let issued = self.issued.lock().unwrap();
        match issued.first() {
            Some(first) => issued.iter().map(|t| t.duration_since(*first)).collect(),
            None => Vec::new(),
        }
    }
}

pub fn status(code: u16) -> Outcome<&'static str> {
    Outcome::Failed(TransportError::BadStatus(code).into())
}

pub fn timed_out() -> Outcome<&'static str> {
    Outcome::Failed(TransportError::TimedOut.into())
}

pub fn network() -> Outcome<&'static str> {
    Outcome::Failed(TransportError::NetworkUnreachable.into())
}

pub fn err_status(code: u16) -> Error {
    TransportError::BadStatus(code).into()
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}
