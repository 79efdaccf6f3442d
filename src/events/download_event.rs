use std::fmt;

/// A progress line produced while downloading a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    Info(String),
    /// A file was written. Carries the file name.
    Saved(String),
    /// One size of one emote was skipped.
    Skipped(String),
    /// An emote could not be processed at all.
    Failed(String),
}

impl fmt::Display for DownloadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadEvent::Info(line) => f.write_str(line),
            DownloadEvent::Saved(line) => write!(f, "[ok] {}", line),
            DownloadEvent::Skipped(line) => write!(f, "[skip] {}", line),
            DownloadEvent::Failed(line) => write!(f, "[error] {}", line),
        }
    }
}

/// Receives progress events, decoupling the pipeline from how they are shown.
pub trait EventSink {
    fn emit(&mut self, event: DownloadEvent);
}

/// Prints each event on its own stdout line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: DownloadEvent) {
        println!("{}", event);
    }
}

impl EventSink for Vec<DownloadEvent> {
    fn emit(&mut self, event: DownloadEvent) {
        self.push(event);
    }
}

/// Traces the event, then hands it to the sink.
pub fn report(sink: &mut dyn EventSink, event: DownloadEvent) {
    match &event {
        DownloadEvent::Info(line) => tracing::info!("{}", line),
        DownloadEvent::Saved(file) => tracing::info!("Saved {}", file),
        DownloadEvent::Skipped(line) => tracing::warn!("Skipped {}", line),
        DownloadEvent::Failed(line) => tracing::error!("{}", line),
    }
    sink.emit(event);
}
