//! # Symphonia Narration Decoder
//!
//! Validates fetched narration bytes and derives the stream duration using
//! Symphonia's probe. The full PCM pipeline is not run here: the playback
//! sink owns rendering, this adapter only has to establish that the payload
//! is playable and how long it is.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    playback::{DecodedNarration, NarrationDecoder, NarrationFormat},
};
use bytes::Bytes;
use std::io::Cursor;
use std::time::Duration;
use symphonia::core::codecs::{
    CodecType, CODEC_TYPE_AAC, CODEC_TYPE_FLAC, CODEC_TYPE_MP3, CODEC_TYPE_NULL,
    CODEC_TYPE_OPUS, CODEC_TYPE_VORBIS,
};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Narration decoder backed by Symphonia's format probe.
///
/// Handles every container/codec the `symphonia` feature set enables (mp3,
/// aac, flac, ogg/vorbis, wav, ...). Stateless and cheap to share.
#[derive(Debug, Default, Clone)]
pub struct SymphoniaNarrationDecoder;

impl SymphoniaNarrationDecoder {
    pub fn new() -> Self {
        Self
    }

    fn codec_name(codec: CodecType) -> Option<String> {
        let name = if codec == CODEC_TYPE_MP3 {
            "mp3"
        } else if codec == CODEC_TYPE_AAC {
            "aac"
        } else if codec == CODEC_TYPE_FLAC {
            "flac"
        } else if codec == CODEC_TYPE_VORBIS {
            "vorbis"
        } else if codec == CODEC_TYPE_OPUS {
            "opus"
        } else {
            return None;
        };
        Some(name.to_string())
    }
}

#[async_trait]
impl NarrationDecoder for SymphoniaNarrationDecoder {
    async fn decode(&self, data: Bytes) -> Result<DecodedNarration> {
        // Probing a byte buffer is quick; no need to leave the task.
        let source = Box::new(Cursor::new(data.to_vec()));
        let stream = MediaSourceStream::new(source, Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                warn!(error = %e, "narration probe failed");
                BridgeError::Undecodable(format!("Failed to probe format: {}", e))
            })?;

        let reader = probed.format;
        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                BridgeError::Undecodable("No supported audio tracks".to_string())
            })?;

        let params = &track.codec_params;
        let duration = match (params.time_base, params.n_frames) {
            (Some(time_base), Some(frames)) => {
                let time = time_base.calc_time(frames);
                Duration::from_secs_f64(time.seconds as f64 + time.frac)
            }
            _ => {
                return Err(BridgeError::Undecodable(
                    "Container does not report a duration".to_string(),
                ))
            }
        };

        let format = NarrationFormat {
            codec: Self::codec_name(params.codec),
            sample_rate: params.sample_rate,
            channels: params.channels.map(|c| c.count() as u16),
        };
        debug!(
            ?duration,
            codec = format.codec.as_deref().unwrap_or("unknown"),
            sample_rate = format.sample_rate,
            "narration probed"
        );

        Ok(DecodedNarration::new(data, duration).with_format(format))
    }
}
