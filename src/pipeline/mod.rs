pub mod sink;
pub mod tracker;

use std::{thread, time::Instant};

use anyhow::Result;
use crossbeam_channel::{Receiver, at, select};

use crate::{
    config::GestureConfig,
    debounce::Debouncer,
    error::GestureError,
    gesture::GestureClassifier,
    types::{GestureEvent, TrackerFrame},
};

use self::sink::GestureSink;

/// Everything one call session needs to turn tracker frames into gestures.
pub struct GestureSession {
    classifier: GestureClassifier,
    debouncer: Debouncer,
}

impl GestureSession {
    pub fn new(config: GestureConfig) -> Result<Self, GestureError> {
        let debouncer = Debouncer::from_config(&config);
        let classifier = GestureClassifier::new(config)?;
        Ok(Self {
            classifier,
            debouncer,
        })
    }

    /// Runs the first detected hand through classification and debouncing.
    /// Frames without any hand are ignored; malformed hands count as "no gesture".
    pub fn process(&mut self, frame: &TrackerFrame) -> Option<GestureEvent> {
        let hand = frame.first_hand()?;
        let label = match self.classifier.classify(hand) {
            Ok(label) => label,
            Err(err) => {
                log::warn!("skipping hand frame: {err}");
                None
            }
        };
        log::debug!("frame label: {label:?}");
        self.debouncer.observe(label, frame.timestamp)
    }

    pub fn expire(&mut self, now: Instant) -> bool {
        self.debouncer.expire(now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }
}

/// Hands a confirmed gesture to the sink. Sink failures never end the session.
pub fn publish_event<S: GestureSink + ?Sized>(sink: &mut S, event: &GestureEvent) {
    log::info!("gesture confirmed: {}", event.gesture.indicator_text());
    if let Err(err) = sink.publish(event) {
        log::warn!("failed to publish {}: {err:#}", event.gesture);
    }
}

fn run_worker_loop<S: GestureSink>(
    mut session: GestureSession,
    frame_rx: Receiver<TrackerFrame>,
    mut sink: S,
) {
    loop {
        let frame = match session.next_deadline() {
            Some(deadline) => select! {
                recv(frame_rx) -> msg => msg.ok(),
                recv(at(deadline)) -> _ => {
                    session.expire(Instant::now());
                    continue;
                }
            },
            None => frame_rx.recv().ok(),
        };
        let Some(frame) = frame else { break };

        let frame = latest_frame(&frame_rx, frame);
        if let Some(event) = session.process(&frame) {
            publish_event(&mut sink, &event);
        }
    }
}

fn latest_frame(frame_rx: &Receiver<TrackerFrame>, mut frame: TrackerFrame) -> TrackerFrame {
    while let Ok(newer) = frame_rx.try_recv() {
        frame = newer;
    }
    frame
}

/// Owns a running session worker.
#[derive(Debug)]
pub struct SessionHandle {
    handle: Option<thread::JoinHandle<()>>,
}

impl SessionHandle {
    /// Waits for the worker, which stops once every frame sender is dropped.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("gesture session worker panicked");
            }
        }
    }
}

/// Starts a session worker that exclusively owns the session state. The
/// worker wakes for incoming frames and for cooldown deadlines.
pub fn start_session<S: GestureSink>(
    config: GestureConfig,
    frame_rx: Receiver<TrackerFrame>,
    sink: S,
) -> Result<SessionHandle> {
    // Fail fast on bad thresholds before spawning.
    let session = GestureSession::new(config)?;
    log::info!("starting gesture session");

    let handle = thread::spawn(move || {
        run_worker_loop(session, frame_rx, sink);
        log::info!("gesture session stopped");
    });

    Ok(SessionHandle {
        handle: Some(handle),
    })
}
