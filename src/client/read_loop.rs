//! Background task turning transport input into events.
//!
//! The loop reads chunks, feeds them through a [`FrameReader`] and applies
//! each complete frame before reading again. It exits on cancellation
//! without publishing anything further, on broker close, or on the first
//! transport error.

use std::{io, sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::{sync::CancellationToken, task::AbortOnDropHandle};
use tracing::Instrument;

use super::{
    session::{ConnectionStatus, SessionWriter},
    tracing_helpers::{dispatch_span, emit_timing_event, start_timer},
};
use crate::{
    codec::FrameReader,
    config::ClientConfig,
    dispatch::{Dispatch, classify},
    event::EventSink,
    frame::{Frame, HeartBeat, negotiate_heartbeats},
    metrics::{self, Direction},
    transport::TransportReader,
};

pub(crate) struct ReadLoop {
    pub(crate) reader: Box<dyn TransportReader>,
    pub(crate) frames: FrameReader,
    pub(crate) writer: SessionWriter,
    pub(crate) events: EventSink,
    pub(crate) status: Arc<watch::Sender<ConnectionStatus>>,
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) token: CancellationToken,
    pub(crate) heartbeat: Option<AbortOnDropHandle<()>>,
}

impl ReadLoop {
    pub(crate) async fn run(mut self) {
        loop {
            let chunk = tokio::select! {
                biased;
                () = self.token.cancelled() => break,
                chunk = self.reader.read_chunk() => chunk,
            };
            let fed = match chunk {
                Ok(Some(chunk)) => self.frames.feed(chunk),
                Ok(None) => {
                    log::info!("broker closed the connection");
                    self.set_status(ConnectionStatus::Disconnected);
                    self.events.system("Connection closed by broker");
                    break;
                }
                Err(err) => Err(err),
            };
            let frames = match fed {
                Ok(frames) => frames,
                Err(err) => {
                    self.fail(&err);
                    break;
                }
            };
            for frame in frames {
                if self.token.is_cancelled() {
                    return;
                }
                self.apply(frame).await;
            }
        }
    }

    async fn apply(&mut self, frame: Frame) {
        metrics::inc_frames(Direction::Inbound, frame.command());
        let span = dispatch_span(
            self.config.tracing(),
            frame.command(),
            frame.body().len(),
        );
        let start = start_timer(self.config.tracing().dispatch_timing);
        let outcome = classify(&frame);
        self.handle(outcome).instrument(span).await;
        emit_timing_event(start);
    }

    async fn handle(&mut self, outcome: Dispatch) {
        let notice = outcome.system_event();
        match outcome {
            Dispatch::Connected { heart_beat } => {
                log::info!("STOMP session established");
                self.set_status(ConnectionStatus::Connected);
                self.notify(notice);
                self.subscribe().await;
                self.heartbeat = self.start_heartbeat(heart_beat.unwrap_or(HeartBeat::DISABLED));
            }
            Dispatch::Message(message) => self.events.message(message),
            Dispatch::Error(text) => {
                log::warn!("broker reported an error: {text}");
                metrics::inc_errors();
                self.heartbeat = None;
                self.set_status(ConnectionStatus::Disconnected);
                self.notify(notice);
            }
            Dispatch::Malformed(text) => {
                log::debug!("{text}");
                self.notify(notice);
            }
            Dispatch::Empty | Dispatch::Unrecognised(_) => self.notify(notice),
        }
    }

    fn notify(&self, notice: Option<String>) {
        if let Some(text) = notice {
            self.events.system(text);
        }
    }

    async fn subscribe(&mut self) {
        let destination = self.config.subscribe_destination();
        let frame = Frame::subscribe(self.config.subscription_id(), &destination);
        let writer = self.writer.clone();
        match writer.send(frame).await {
            Ok(_) => self.events.system(format!("Subscribed {destination}")),
            Err(err) => log::warn!("subscribing to {destination} failed: {err}"),
        }
    }

    fn start_heartbeat(&self, server: HeartBeat) -> Option<AbortOnDropHandle<()>> {
        let (outgoing, _incoming) = negotiate_heartbeats(self.config.heart_beat(), server);
        let interval = outgoing?;
        log::debug!("sending heart-beats every {interval:?}");
        let task = tokio::spawn(send_heartbeats(
            self.writer.clone(),
            interval,
            self.token.child_token(),
        ));
        Some(AbortOnDropHandle::new(task))
    }

    fn fail(&self, err: &io::Error) {
        tracing::warn!(error = %err, "read loop failed");
        metrics::inc_errors();
        self.set_status(ConnectionStatus::Disconnected);
        self.events.system(format!("Read loop error: {err}"));
    }

    fn set_status(&self, status: ConnectionStatus) { self.status.send_replace(status); }
}

async fn send_heartbeats(writer: SessionWriter, interval: Duration, token: CancellationToken) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        if let Err(err) = writer.heartbeat().await {
            log::debug!("heart-beat failed: {err}");
            break;
        }
        tracing::trace!("heart-beat sent");
    }
}
