use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::error::ViewError;

// ---------------------------------------------------------------------------
// Pending – one in-flight request
// ---------------------------------------------------------------------------

/// Result of a request running on a worker thread. Polled from the UI
/// loop; dropping it discards whatever the worker sends later.
#[derive(Debug)]
pub struct Pending<T> {
    rx: Receiver<T>,
}

impl<T: Send + 'static> Pending<T> {
    /// Run `job` on a new thread and call `notify` once its result is queued.
    pub fn spawn<F, N>(job: F, notify: N) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
        N: FnOnce() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = job();
            if tx.send(result).is_ok() {
                notify();
            } else {
                log::debug!("discarding response for a view that is gone");
            }
        });
        Self { rx }
    }
}

impl<T> Pending<Result<T, ViewError>> {
    /// Take the result if it has arrived.
    ///
    /// A worker that died without answering (a panic inside the job) yields
    /// a transport error, so the view stops waiting.
    pub fn poll(&self) -> Option<Result<T, ViewError>> {
        match self.rx.try_recv() {
            Ok(v) => Some(v),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::error!("request worker exited without a result");
                Some(Err(ViewError::network("request worker exited without a result")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::*;

    fn wait<T>(p: &Pending<Result<T, ViewError>>) -> Result<T, ViewError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(v) = p.poll() {
                return v;
            }
            assert!(Instant::now() < deadline, "worker did not answer");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn delivers_result_and_notifies() {
        let notified = Arc::new(AtomicBool::new(false));
        let flag = notified.clone();
        let p = Pending::spawn(|| Ok(41 + 1), move || flag.store(true, Ordering::SeqCst));
        assert_eq!(wait(&p), Ok(42));
        // notify runs right after the send; give it a moment.
        let deadline = Instant::now() + Duration::from_secs(5);
        while !notified.load(Ordering::SeqCst) {
            assert!(Instant::now() < deadline);
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn dropped_pending_discards_result() {
        let notified = Arc::new(AtomicBool::new(false));
        let flag = notified.clone();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let p = Pending::spawn(
            move || {
                gate_rx.recv().ok();
                Ok::<_, ViewError>("stale")
            },
            move || flag.store(true, Ordering::SeqCst),
        );
        drop(p);
        gate_tx.send(()).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(!notified.load(Ordering::SeqCst));
    }

    #[test]
    fn dead_worker_becomes_transport_error() {
        let p: Pending<Result<u8, ViewError>> = Pending::spawn(
            || panic!("worker blew up"),
            || {},
        );
        let err = wait(&p).unwrap_err();
        assert!(matches!(err, ViewError::Transport { status: None, .. }));
    }
}
