//! Stream reader
//!
//! `StreamReader` owns one IR stream. Creation parses the preamble; `build`
//! drains every record into the event buffer in one pass and releases the
//! input; filtering and range decoding then work on the frozen buffer.
//!
//! # Example
//!
//! ```ignore
//! use irlog_protocol::{LogLevel, ReaderOptions, StreamReader};
//!
//! let mut reader = StreamReader::create(buffer, ReaderOptions::default())?;
//! let count = reader.build()?;
//!
//! reader.filter_log_events(Some(&[LogLevel::Error, LogLevel::Fatal]));
//! for event in reader.decode_range(0, 10, true).unwrap_or_default() {
//!     println!("#{} {}", event.event_num, event.message);
//! }
//! ```

use bytes::Bytes;

use crate::decode::{Deserializer, IrUnit, Preamble, StreamKind, StreamMetadata};
use crate::encoded_var::EncodingWidth;
use crate::event::{BufferedLogEvent, DecodedLogEvent};
use crate::level::LogLevel;
use crate::message::format_log_event;
use crate::schema::SchemaTree;
use crate::source::IrSource;
use crate::timestamp::TimestampPattern;
use crate::{IrError, Result};

/// Initial event buffer capacity
pub const DEFAULT_RESERVED_EVENTS: usize = 4096;

/// Caller overrides for stream metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Key name of the authoritative log level (structured streams)
    pub log_level_key: Option<String>,
    /// Key name of the authoritative timestamp (structured streams)
    pub timestamp_key: Option<String>,
    /// Timestamp pattern used instead of the stream's
    pub timestamp_pattern: Option<String>,
    /// Initial event buffer capacity
    pub reserved_events: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            log_level_key: None,
            timestamp_key: None,
            timestamp_pattern: None,
            reserved_events: DEFAULT_RESERVED_EVENTS,
        }
    }
}

impl ReaderOptions {
    pub fn with_log_level_key(mut self, key: impl Into<String>) -> Self {
        self.log_level_key = Some(key.into());
        self
    }

    pub fn with_timestamp_key(mut self, key: impl Into<String>) -> Self {
        self.timestamp_key = Some(key.into());
        self
    }

    pub fn with_timestamp_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.timestamp_pattern = Some(pattern.into());
        self
    }

    pub fn with_reserved_events(mut self, reserved_events: usize) -> Self {
        self.reserved_events = reserved_events;
        self
    }
}

/// Progress of the one-time build pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamStatus {
    /// `build` has not run
    Pending,
    /// Every record was read up to end of stream
    Complete,
    /// Input ended mid-record; buffered events are usable
    Truncated,
    /// A malformed record aborted the build; nothing is usable
    Corrupted,
}

impl StreamStatus {
    /// Get string representation
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::Truncated => "truncated",
            Self::Corrupted => "corrupted",
        }
    }
}

impl std::fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input and record deserializer, alive until the build pass ends
struct DataContext {
    source: IrSource,
    deserializer: Deserializer,
}

/// Decoder for one IR stream
pub struct StreamReader {
    kind: StreamKind,
    width: EncodingWidth,
    metadata: StreamMetadata,
    ts_pattern: TimestampPattern,
    schema_tree: SchemaTree,
    events: Vec<BufferedLogEvent>,
    filtered_log_event_map: Option<Vec<usize>>,
    status: StreamStatus,
    reserved_events: usize,
    context: Option<DataContext>,
}

impl StreamReader {
    /// Open a stream and parse its preamble
    ///
    /// Fails with `MetadataCorrupted` or `UnsupportedEncoding`.
    pub fn create(data: impl Into<Bytes>, options: ReaderOptions) -> Result<Self> {
        let data = data.into();
        tracing::info!(len = data.len(), "creating IR stream reader");

        let mut source = IrSource::new(data)
            .map_err(|e| IrError::from(e).into_metadata_corrupted())?;
        let preamble = Preamble::parse(&mut source)?;
        tracing::info!(
            version = %preamble.metadata.version,
            kind = %preamble.kind,
            width = %preamble.width,
            compressed = source.is_compressed(),
            "detected IR stream"
        );

        let pattern = options
            .timestamp_pattern
            .as_deref()
            .or(preamble.metadata.timestamp_pattern.as_deref());
        let ts_pattern = match pattern {
            Some(pattern) => TimestampPattern::parse(pattern)?,
            None => TimestampPattern::default(),
        };

        let log_level_key = options
            .log_level_key
            .or_else(|| preamble.metadata.log_level_key.clone());
        let timestamp_key = options
            .timestamp_key
            .or_else(|| preamble.metadata.timestamp_key.clone());
        let deserializer = Deserializer::new(&preamble, log_level_key, timestamp_key)?;

        Ok(Self {
            kind: preamble.kind,
            width: preamble.width,
            metadata: preamble.metadata,
            ts_pattern,
            schema_tree: SchemaTree::new(),
            events: Vec::new(),
            filtered_log_event_map: None,
            status: StreamStatus::Pending,
            reserved_events: options.reserved_events,
            context: Some(DataContext {
                source,
                deserializer,
            }),
        })
    }

    /// Deserialize every record into the event buffer
    ///
    /// Runs once; later calls return the existing count. A truncated stream
    /// keeps the events before the cut. A corrupt stream empties the buffer
    /// and fails now and on every later call.
    pub fn build(&mut self) -> Result<usize> {
        match self.status {
            StreamStatus::Complete | StreamStatus::Truncated => return Ok(self.events.len()),
            StreamStatus::Corrupted => {
                return Err(IrError::corrupt_stream("stream was found corrupt by an earlier build"));
            }
            StreamStatus::Pending => {}
        }
        let Some(mut context) = self.context.take() else {
            return Ok(self.events.len());
        };

        if let Err(e) = self.events.try_reserve(self.reserved_events) {
            tracing::warn!(
                error = %e,
                reserved_events = self.reserved_events,
                "could not reserve event buffer; growing on demand"
            );
        }
        let outcome = loop {
            match context
                .deserializer
                .deserialize_next(&mut context.source, &mut self.schema_tree)
            {
                Ok(IrUnit::LogEvent(event)) => self.events.push(event),
                Ok(IrUnit::SchemaTreeNodeInsertion(id)) => {
                    tracing::debug!(node_id = id, "schema tree node inserted");
                }
                Ok(IrUnit::UtcOffsetChange(offset)) => {
                    tracing::warn!(offset_secs = offset, "ignoring UTC offset change");
                }
                Ok(IrUnit::EndOfStream) => break Ok(StreamStatus::Complete),
                Err(IrError::TruncatedStream) => break Ok(StreamStatus::Truncated),
                Err(e) => break Err(e),
            }
        };
        drop(context);

        match outcome {
            Ok(status) => {
                if status == StreamStatus::Truncated {
                    tracing::error!(
                        num_events = self.events.len(),
                        "IR stream is truncated; keeping events decoded so far"
                    );
                }
                self.status = status;
                Ok(self.events.len())
            }
            Err(e) => {
                tracing::error!(error = %e, "IR stream is corrupt");
                self.events = Vec::new();
                self.filtered_log_event_map = None;
                self.status = StreamStatus::Corrupted;
                Err(e)
            }
        }
    }

    /// Rebuild the filter index from the buffer
    ///
    /// `None` clears the filter.
    pub fn filter_log_events(&mut self, levels: Option<&[LogLevel]>) {
        self.filtered_log_event_map = levels.map(|levels| {
            self.events
                .iter()
                .enumerate()
                .filter(|(_, event)| levels.contains(&event.level()))
                .map(|(idx, _)| idx)
                .collect()
        });
    }

    /// Current filter index, `None` when unfiltered
    pub fn filtered_log_event_map(&self) -> Option<&[usize]> {
        self.filtered_log_event_map.as_deref()
    }

    /// Render events `[begin, end)` of the buffer or of the filter index
    ///
    /// Returns `None` when the range can't be satisfied. A message that fails
    /// to render ends the batch early.
    pub fn decode_range(
        &self,
        begin: usize,
        end: usize,
        use_filter: bool,
    ) -> Option<Vec<DecodedLogEvent>> {
        if self.status == StreamStatus::Corrupted || begin > end {
            return None;
        }

        let filter = if use_filter {
            self.filtered_log_event_map.as_deref()
        } else {
            None
        };
        let len = filter.map_or(self.events.len(), <[usize]>::len);
        if end > len {
            return None;
        }

        let mut results = Vec::with_capacity(end - begin);
        for idx in begin..end {
            let event_idx = filter.map_or(idx, |map| map[idx]);
            let event = &self.events[event_idx];

            match format_log_event(event, &self.schema_tree, &self.ts_pattern) {
                Ok(message) => results.push(DecodedLogEvent {
                    message,
                    timestamp: event.timestamp(),
                    level: event.level(),
                    event_num: event_idx + 1,
                }),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        event_num = event_idx + 1,
                        "failed to decode message; truncating batch"
                    );
                    break;
                }
            }
        }
        Some(results)
    }

    /// Number of buffered events; 0 before `build`
    #[inline]
    pub fn num_events_buffered(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    #[inline]
    pub fn encoding_width(&self) -> EncodingWidth {
        self.width
    }

    #[inline]
    pub fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    #[inline]
    pub fn status(&self) -> StreamStatus {
        self.status
    }

    /// Buffered events in stream order
    #[inline]
    pub fn events(&self) -> &[BufferedLogEvent] {
        &self.events
    }

    #[inline]
    pub fn schema_tree(&self) -> &SchemaTree {
        &self.schema_tree
    }

    #[inline]
    pub fn timestamp_pattern(&self) -> &TimestampPattern {
        &self.ts_pattern
    }
}
