//! Scripted connector for exercising the retry policy.
//!
//! Each `connect` hands out the next scripted transport. The connector
//! records connect attempts, live transports, reads and writes so tests can
//! check exactly what the client did.

use crate::error::{Error, Result};
use crate::transport::{Connector, Endpoint, MemoryTransport, Transport};
use bytes::Bytes;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

/// What one connection will do.
pub(crate) struct ScriptedTransport {
    fail_writes: bool,
    inbound: Vec<u8>,
}

impl ScriptedTransport {
    /// Accepts writes and replies with `inbound`.
    pub(crate) fn replying(inbound: &[u8]) -> Self {
        Self {
            fail_writes: false,
            inbound: inbound.to_vec(),
        }
    }

    /// Every write fails with a broken pipe.
    pub(crate) fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            inbound: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Log {
    plan: RefCell<VecDeque<ScriptedTransport>>,
    connects: Cell<usize>,
    live: Cell<usize>,
    reads: Cell<usize>,
    writes: RefCell<Vec<Vec<Vec<u8>>>>,
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedConnector {
    log: Rc<Log>,
}

impl ScriptedConnector {
    pub(crate) fn new(plan: Vec<ScriptedTransport>) -> Self {
        let log = Log {
            plan: RefCell::new(plan.into()),
            ..Log::default()
        };
        Self { log: Rc::new(log) }
    }

    /// Connect attempts, successful or not.
    pub(crate) fn connects(&self) -> usize {
        self.log.connects.get()
    }

    /// Transports opened and not yet dropped.
    pub(crate) fn live(&self) -> usize {
        self.log.live.get()
    }

    /// Line and exact reads across all transports.
    pub(crate) fn reads(&self) -> usize {
        self.log.reads.get()
    }

    /// Successful writes on the `n`th opened transport.
    pub(crate) fn writes(&self, n: usize) -> Vec<Vec<u8>> {
        self.log
            .writes
            .borrow()
            .get(n)
            .cloned()
            .unwrap_or_default()
    }
}

impl Connector for ScriptedConnector {
    type Transport = LiveTransport;

    fn connect(&self, endpoint: &Endpoint) -> Result<LiveTransport> {
        self.log.connects.set(self.log.connects.get() + 1);

        let Some(script) = self.log.plan.borrow_mut().pop_front() else {
            return Err(Error::Connection {
                host: endpoint.host().to_string(),
                port: endpoint.port(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        };

        let mut writes = self.log.writes.borrow_mut();
        let index = writes.len();
        writes.push(Vec::new());
        self.log.live.set(self.log.live.get() + 1);

        Ok(LiveTransport {
            index,
            fail_writes: script.fail_writes,
            inner: MemoryTransport::new(script.inbound),
            log: Rc::clone(&self.log),
        })
    }
}

pub(crate) struct LiveTransport {
    index: usize,
    fail_writes: bool,
    inner: MemoryTransport,
    log: Rc<Log>,
}

impl Transport for LiveTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        self.log.writes.borrow_mut()[self.index].push(bytes.to_vec());
        self.inner.write(bytes)
    }

    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        self.log.reads.set(self.log.reads.get() + 1);
        self.inner.read_line()
    }

    fn read_exact(&mut self, n: usize) -> io::Result<Bytes> {
        self.log.reads.set(self.log.reads.get() + 1);
        self.inner.read_exact(n)
    }
}

impl Drop for LiveTransport {
    fn drop(&mut self) {
        self.log.live.set(self.log.live.get() - 1);
    }
}
