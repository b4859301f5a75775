//! Wire messages of the plot-data feed.
//!
//! Binary frames carry packed samples in the stream's element format
//! (little-endian `SF` unless a header says otherwise). Text frames carry JSON
//! header overrides such as `{ "xstart": 99000000.0, "xdelta": 30.52 }`.

use crate::domain::errors::StreamError;
use crate::domain::layer::{BufferHeader, ElementFormat, HeaderOverride, SampleBuffer};
use serde::{Deserialize, Serialize};

/// Websocket subprotocol carrying plot data
pub const PLOT_DATA_PROTOCOL: &str = "plot-data";
/// Websocket subprotocol accepting tuning commands
pub const CONTROL_PROTOCOL: &str = "rtl";

/// One decoded inbound message
#[derive(Debug, Clone)]
pub enum StreamMessage {
    Samples(SampleBuffer),
    Header(HeaderOverride),
}

/// Tuning request understood by the control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuneCommand {
    pub frequency_hz: u32,
}

/// Stateful decoder: header overrides apply to every following binary frame
#[derive(Debug, Clone)]
pub struct StreamDecoder {
    header: BufferHeader,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self { header: BufferHeader::new(ElementFormat::SCALAR_F32, 0.0, 1.0) }
    }
}

impl StreamDecoder {
    pub fn new(name: &str) -> Self {
        let mut decoder = Self::default();
        decoder.header.name = name.to_string();
        decoder
    }

    pub fn header(&self) -> &BufferHeader {
        &self.header
    }

    /// Parse and remember a JSON header override
    pub fn decode_text(&mut self, text: &str) -> Result<StreamMessage, StreamError> {
        let update: HeaderOverride =
            serde_json::from_str(text).map_err(|e| StreamError::MalformedHeader(e.to_string()))?;
        self.header.merge(&update).map_err(|e| StreamError::MalformedHeader(e.to_string()))?;
        Ok(StreamMessage::Header(update))
    }

    /// Wrap a binary frame as a buffer using the current header
    pub fn decode_binary(&self, bytes: Vec<u8>) -> Result<StreamMessage, StreamError> {
        let element_size = self
            .header
            .element_format()
            .map_err(|e| StreamError::MalformedHeader(e.to_string()))?
            .stride();
        if bytes.is_empty() || bytes.len() % element_size != 0 {
            return Err(StreamError::MalformedFrame { len: bytes.len(), element_size });
        }
        Ok(StreamMessage::Samples(SampleBuffer::unchecked(self.header.clone(), bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layer::BufferAccessor;

    #[test]
    fn header_then_samples() {
        let mut decoder = StreamDecoder::new("rtl");
        decoder.decode_text(r#"{ "xstart": 99000000.000000, "xdelta": 30.517578 }"#).unwrap();
        let frame: Vec<u8> = [1.5f32, -2.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let StreamMessage::Samples(buffer) = decoder.decode_binary(frame).unwrap() else {
            panic!("expected samples");
        };
        assert_eq!(buffer.header().xstart, 99_000_000.0);
        assert_eq!(buffer.materialize(0, 2).unwrap(), vec![1.5, -2.0]);
    }

    #[test]
    fn ragged_frame_is_rejected() {
        let decoder = StreamDecoder::default();
        assert_eq!(
            decoder.decode_binary(vec![0; 6]).unwrap_err(),
            StreamError::MalformedFrame { len: 6, element_size: 4 }
        );
    }

    #[test]
    fn bad_header_is_reported() {
        let mut decoder = StreamDecoder::default();
        assert!(matches!(decoder.decode_text("{ xstart"), Err(StreamError::MalformedHeader(_))));
        assert!(decoder.decode_text(r#"{ "format": "QQ" }"#).is_err());
        assert_eq!(decoder.header().format, "SF");
    }
}
