//! Shutdown requests raised by process signals.
//!
//! The CLI owns the [`ShutdownTrigger`] and fires it from its signal listener;
//! the orchestrator and the process runner hold a [`Shutdown`] and check it
//! between stages and while a stage's child process is running.

use std::fmt;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
        }
    }

    /// Conventional `128 + signo` exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Signal::Interrupt => 130,
            Signal::Terminate => 143,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(None);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<Option<Signal>>,
}

impl ShutdownTrigger {
    /// Request shutdown. The first signal wins; returns `false` if a shutdown
    /// had already been requested.
    pub fn fire(&self, signal: Signal) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                false
            } else {
                *current = Some(signal);
                true
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<Option<Signal>>,
}

impl Shutdown {
    /// A handle that never fires.
    pub fn never() -> Self {
        channel().1
    }

    pub fn requested(&self) -> Option<Signal> {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is requested. Pends forever if the trigger is
    /// dropped without firing.
    pub async fn wait(&mut self) -> Signal {
        loop {
            if let Some(signal) = *self.rx.borrow_and_update() {
                return signal;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
