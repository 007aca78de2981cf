//! Worker thread that talks to the parsing/statistics service.
//!
//! The UI thread sends [`BackendJob`]s and drains [`BackendEvent`]s once per
//! frame, so all session state is still mutated on the UI thread only.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use reqwest::blocking::multipart::{Form, Part};

use crate::config::DashboardConfig;
use crate::data::stats::LocalStats;
use crate::error::{DashError, DashResult};
use crate::protocol::{BackendMessage, StatsRequest};
use crate::session::{OutgoingStats, StatsTicket};

/// Work for the backend thread.
#[derive(Debug)]
pub enum BackendJob {
    /// `POST /upload` with the file as multipart field `file`.
    Upload { path: PathBuf },
    /// `POST /stats`.
    Stats(OutgoingStats),
}

/// What came back.
#[derive(Debug)]
pub enum BackendEvent {
    UploadProgress { bytes_sent: u64, total: u64 },
    Uploaded(DashResult<BackendMessage>),
    Stats {
        ticket: StatsTicket,
        result: DashResult<BackendMessage>,
    },
}

/// Handle to the worker. Dropping it closes the job channel and lets the
/// thread finish.
pub struct BackendClient {
    jobs: Sender<BackendJob>,
    events: Receiver<BackendEvent>,
}

impl BackendClient {
    pub fn spawn(cfg: &DashboardConfig) -> DashResult<Self> {
        let (job_tx, job_rx) = mpsc::channel::<BackendJob>();
        let (event_tx, event_rx) = mpsc::channel::<BackendEvent>();
        let worker = Worker::new(cfg)?;
        thread::Builder::new()
            .name("sensordash-backend".into())
            .spawn(move || {
                for job in job_rx {
                    worker.run(job, &event_tx);
                }
                tracing::debug!("backend worker stopped");
            })
            .map_err(|e| DashError::Transport(format!("cannot start backend thread: {e}")))?;
        Ok(Self { jobs: job_tx, events: event_rx })
    }

    pub fn submit(&self, job: BackendJob) -> DashResult<()> {
        self.jobs
            .send(job)
            .map_err(|_| DashError::Transport("backend worker is gone".into()))
    }

    /// Next finished event, if any.
    pub fn try_next(&self) -> Option<BackendEvent> {
        self.events.try_recv().ok()
    }
}

struct Worker {
    http: reqwest::blocking::Client,
    upload_url: String,
    stats_url: String,
    local_stats: bool,
}

impl Worker {
    fn new(cfg: &DashboardConfig) -> DashResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| DashError::Transport(format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            http,
            upload_url: cfg.endpoint("upload"),
            stats_url: cfg.endpoint("stats"),
            local_stats: cfg.local_stats,
        })
    }

    fn run(&self, job: BackendJob, events: &Sender<BackendEvent>) {
        let event = match job {
            BackendJob::Upload { path } => BackendEvent::Uploaded(self.upload(path, events)),
            BackendJob::Stats(OutgoingStats { ticket, request }) => BackendEvent::Stats {
                ticket,
                result: self.stats(&request),
            },
        };
        let _ = events.send(event);
    }

    fn upload(&self, path: PathBuf, events: &Sender<BackendEvent>) -> DashResult<BackendMessage> {
        let file = File::open(&path)
            .map_err(|e| DashError::Transport(format!("cannot open {}: {e}", path.display())))?;
        let total = file
            .metadata()
            .map_err(|e| DashError::Transport(format!("cannot stat {}: {e}", path.display())))?
            .len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        tracing::info!(file = %path.display(), bytes = total, "uploading");

        let reader = ProgressReader { inner: file, sent: 0, total, events: events.clone() };
        let form = Form::new().part("file", Part::reader_with_length(reader, total).file_name(name));
        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .map_err(|e| DashError::Transport(format!("upload failed: {e}")))?;
        decode(response)
    }

    fn stats(&self, request: &StatsRequest) -> DashResult<BackendMessage> {
        if self.local_stats {
            return Ok(BackendMessage::Stats(LocalStats.answer(request)));
        }
        let response = self
            .http
            .post(&self.stats_url)
            .json(request)
            .send()
            .map_err(|e| DashError::Transport(format!("stats request failed: {e}")))?;
        decode(response)
    }
}

fn decode(response: reqwest::blocking::Response) -> DashResult<BackendMessage> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| DashError::Transport(format!("could not read response body: {e}")))?;
    if !status.is_success() {
        return Err(DashError::Transport(format!("status {status}: {}", body.trim())));
    }
    BackendMessage::from_json(&body)
}

/// Wraps the upload body and reports how much of it has been read.
struct ProgressReader<R> {
    inner: R,
    sent: u64,
    total: u64,
    events: Sender<BackendEvent>,
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.sent += n as u64;
            let _ = self.events.send(BackendEvent::UploadProgress {
                bytes_sent: self.sent,
                total: self.total,
            });
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_reader_counts_bytes() {
        let (tx, rx) = mpsc::channel();
        let data = vec![7u8; 10];
        let mut reader = ProgressReader { inner: &data[..], sent: 0, total: 10, events: tx };
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out.len(), 10);
        let last = rx.try_iter().last();
        assert!(matches!(last, Some(BackendEvent::UploadProgress { bytes_sent: 10, total: 10 })));
    }
}
