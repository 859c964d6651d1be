//! Heartbeat encode/decode with size limits and length-delimited framing.

use prost::Message;
use sessionhost_model::HeartbeatInfo;
use tracing::{debug, warn};

use crate::convert::validate_outgoing;
use crate::{HeartbeatInfoProto, WireError};

/// Default cap on a single encoded heartbeat.
pub const MAX_HEARTBEAT_MESSAGE_LEN: usize = 64 * 1024;

/// Codec configuration.
#[derive(Debug, Clone, Copy)]
pub struct CodecConfig {
    /// Largest message body accepted or produced, excluding the length prefix.
    pub max_message_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_len: MAX_HEARTBEAT_MESSAGE_LEN,
        }
    }
}

/// Encodes and decodes heartbeats under a [`CodecConfig`].
#[derive(Debug, Clone, Default)]
pub struct HeartbeatCodec {
    config: CodecConfig,
}

impl HeartbeatCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn check_len(&self, len: usize) -> Result<(), WireError> {
        if len > self.config.max_message_len {
            warn!(
                len,
                max = self.config.max_message_len,
                "heartbeat exceeds size limit"
            );
            return Err(WireError::PayloadTooLarge {
                len,
                max: self.config.max_message_len,
            });
        }
        Ok(())
    }

    fn to_proto(&self, hb: &HeartbeatInfo) -> Result<HeartbeatInfoProto, WireError> {
        validate_outgoing(hb).inspect_err(|err| warn!(%err, "refusing to encode heartbeat"))?;
        let proto = HeartbeatInfoProto::from(hb);
        self.check_len(proto.encoded_len())?;
        Ok(proto)
    }

    /// Encode a heartbeat body.
    pub fn encode(&self, hb: &HeartbeatInfo) -> Result<Vec<u8>, WireError> {
        let bytes = self.to_proto(hb)?.encode_to_vec();
        debug!(
            assignment_id = %hb.assignment_id,
            state = %hb.current_game_state,
            players = hb.player_count(),
            bytes = bytes.len(),
            "encoded heartbeat"
        );
        Ok(bytes)
    }

    /// Encode a heartbeat preceded by its varint length.
    pub fn encode_framed(&self, hb: &HeartbeatInfo) -> Result<Vec<u8>, WireError> {
        let bytes = self.to_proto(hb)?.encode_length_delimited_to_vec();
        debug!(
            assignment_id = %hb.assignment_id,
            state = %hb.current_game_state,
            bytes = bytes.len(),
            "encoded framed heartbeat"
        );
        Ok(bytes)
    }

    /// Decode a heartbeat body.
    pub fn decode(&self, bytes: &[u8]) -> Result<HeartbeatInfo, WireError> {
        self.check_len(bytes.len())?;
        let hb = HeartbeatInfoProto::decode(bytes)
            .map_err(WireError::from)
            .and_then(HeartbeatInfo::try_from)
            .inspect_err(|err| warn!(%err, bytes = bytes.len(), "dropping heartbeat"))?;
        debug!(
            assignment_id = %hb.assignment_id,
            state = %hb.current_game_state,
            health = %hb.current_game_health,
            players = hb.player_count(),
            "decoded heartbeat"
        );
        Ok(hb)
    }

    /// Decode one length-delimited heartbeat from the front of `buf`,
    /// advancing it past the frame. Trailing frames are left in place.
    pub fn decode_framed(&self, buf: &mut &[u8]) -> Result<HeartbeatInfo, WireError> {
        let declared = prost::encoding::decode_varint(buf)?;
        let len = usize::try_from(declared).map_err(|_| WireError::PayloadTooLarge {
            len: usize::MAX,
            max: self.config.max_message_len,
        })?;
        self.check_len(len)?;
        if buf.len() < len {
            return Err(WireError::malformed(format!(
                "frame declares {len} bytes but {} remain",
                buf.len()
            )));
        }
        let (frame, rest) = buf.split_at(len);
        *buf = rest;
        self.decode(frame)
    }
}

/// Encode a heartbeat body with no validation and no size limit.
///
/// Unlike [`decode_heartbeat`] this does not go through [`HeartbeatCodec`]:
/// it never fails, and a value the codec would refuse (oversized, or an
/// empty port name) is written anyway and rejected by the receiver. Senders
/// that need those checks use [`HeartbeatCodec::encode`].
pub fn encode_heartbeat(hb: &HeartbeatInfo) -> Vec<u8> {
    let bytes = HeartbeatInfoProto::from(hb).encode_to_vec();
    debug!(
        assignment_id = %hb.assignment_id,
        state = %hb.current_game_state,
        bytes = bytes.len(),
        "encoded heartbeat without codec checks"
    );
    bytes
}

/// Decode a heartbeat body under the default [`CodecConfig`].
pub fn decode_heartbeat(bytes: &[u8]) -> Result<HeartbeatInfo, WireError> {
    HeartbeatCodec::default().decode(bytes)
}
