use std::time::Duration;

use derive_builder::Builder;
use nom::bytes::complete::take;
use nom::number::complete::{le_f32, le_i32};
use serde::Serialize;
use tracing::debug;

use crate::error::{ErrorKind, IResult, Result};
use crate::types::ProtocolVariant;

const SOURCE1_FILESTAMP: &str = "HL2DEMO";
const SOURCE2_FILESTAMP: &str = "PBDEMS2";

const FILESTAMP_LEN: usize = 8;
const MAX_OSPATH: usize = 260;
/// Size of the fixed Source 1 header.
pub const SOURCE1_HEADER_LEN: usize = FILESTAMP_LEN + 2 * 4 + 4 * MAX_OSPATH + 4 * 4;

/// Static playback metadata from the start of a demo file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Builder)]
#[builder(default, setter(into))]
pub struct DemoHeader {
    pub filestamp: String,
    pub protocol: i32,
    pub network_protocol: i32,
    pub server_name: String,
    pub client_name: String,
    pub map_name: String,
    pub game_directory: String,
    pub playback_time: Duration,
    pub playback_ticks: i32,
    pub playback_frames: i32,
    pub signon_length: i32,
}

impl DemoHeader {
    /// Frames per second over the whole recording. Zero if the playback time is zero.
    pub fn frame_rate(&self) -> f64 {
        if self.playback_time.is_zero() {
            return 0.0;
        }
        self.playback_frames as f64 / self.playback_time.as_secs_f64()
    }

    /// Duration of one frame. Zero if there are no frames.
    pub fn frame_time(&self) -> Duration {
        match u32::try_from(self.playback_frames) {
            Ok(frames) if frames > 0 => self.playback_time / frames,
            _ => Duration::ZERO,
        }
    }

    pub fn protocol_variant(&self) -> Option<ProtocolVariant> {
        match self.filestamp.as_str() {
            SOURCE1_FILESTAMP => Some(ProtocolVariant::Source1),
            SOURCE2_FILESTAMP => Some(ProtocolVariant::Source2),
            _ => None,
        }
    }

    /// Parses the header at the start of `data`.
    ///
    /// Source 1 demos carry the full fixed-size header. Source 2 demos keep
    /// their metadata in a later message, so only the filestamp is filled in.
    pub fn parse(data: &[u8]) -> Result<DemoHeader> {
        let (_, filestamp) = fixed_string(data, FILESTAMP_LEN)?;
        debug!(%filestamp, len = data.len(), "parsing demo header");

        match filestamp.as_str() {
            SOURCE1_FILESTAMP => {
                if data.len() < SOURCE1_HEADER_LEN {
                    return Err(ErrorKind::InvalidHeader(format!(
                        "need {} bytes, got {}",
                        SOURCE1_HEADER_LEN,
                        data.len()
                    ))
                    .into());
                }
                let (_, header) = parse_source1(data)?;
                Ok(header)
            }
            SOURCE2_FILESTAMP => Ok(DemoHeader {
                filestamp,
                ..Default::default()
            }),
            _ => Err(ErrorKind::InvalidHeader(format!("unknown filestamp {filestamp:?}")).into()),
        }
    }
}

/// A NUL-padded string field of exactly `len` bytes.
fn fixed_string(i: &[u8], len: usize) -> IResult<&[u8], String> {
    let (i, raw) = take(len)(i)?;
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    Ok((i, String::from_utf8_lossy(&raw[..end]).into_owned()))
}

fn parse_source1(i: &[u8]) -> IResult<&[u8], DemoHeader> {
    let (i, filestamp) = fixed_string(i, FILESTAMP_LEN)?;
    let (i, protocol) = le_i32(i)?;
    let (i, network_protocol) = le_i32(i)?;
    let (i, server_name) = fixed_string(i, MAX_OSPATH)?;
    let (i, client_name) = fixed_string(i, MAX_OSPATH)?;
    let (i, map_name) = fixed_string(i, MAX_OSPATH)?;
    let (i, game_directory) = fixed_string(i, MAX_OSPATH)?;
    let (i, playback_time) = le_f32(i)?;
    let (i, playback_ticks) = le_i32(i)?;
    let (i, playback_frames) = le_i32(i)?;
    let (i, signon_length) = le_i32(i)?;

    Ok((
        i,
        DemoHeader {
            filestamp,
            protocol,
            network_protocol,
            server_name,
            client_name,
            map_name,
            game_directory,
            // negative or NaN times come from truncated recordings
            playback_time: Duration::try_from_secs_f32(playback_time).unwrap_or_default(),
            playback_ticks,
            playback_frames,
            signon_length,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(frames: i32, time: Duration) -> DemoHeader {
        DemoHeaderBuilder::default()
            .playback_frames(frames)
            .playback_time(time)
            .build()
            .unwrap()
    }

    #[test]
    fn frame_rate() {
        assert_eq!(64.0, header(256, Duration::from_secs(4)).frame_rate());
        assert_eq!(0.0, header(256, Duration::ZERO).frame_rate());
        assert_eq!(0.0, header(0, Duration::ZERO).frame_rate());
    }

    #[test]
    fn frame_time() {
        assert_eq!(
            Duration::from_secs(1) / 64,
            header(256, Duration::from_secs(4)).frame_time()
        );
        assert_eq!(Duration::ZERO, header(0, Duration::from_secs(4)).frame_time());
        assert_eq!(Duration::ZERO, header(-1, Duration::from_secs(4)).frame_time());
    }

    fn padded(s: &str, len: usize) -> Vec<u8> {
        let mut buf = s.as_bytes().to_vec();
        buf.resize(len, 0);
        buf
    }

    fn source1_bytes() -> Vec<u8> {
        let mut data = padded("HL2DEMO", FILESTAMP_LEN);
        data.extend(4i32.to_le_bytes());
        data.extend(13881i32.to_le_bytes());
        data.extend(padded("Valve CS:GO EU West Server", MAX_OSPATH));
        data.extend(padded("GOTV Demo", MAX_OSPATH));
        data.extend(padded("de_dust2", MAX_OSPATH));
        data.extend(padded("csgo", MAX_OSPATH));
        data.extend(2.5f32.to_le_bytes());
        data.extend(320i32.to_le_bytes());
        data.extend(160i32.to_le_bytes());
        data.extend(551_223i32.to_le_bytes());
        data
    }

    #[test]
    fn parse_source1_header() {
        let mut data = source1_bytes();
        assert_eq!(SOURCE1_HEADER_LEN, data.len());
        // trailing frame data is ignored
        data.extend([1, 2, 3]);

        let header = DemoHeader::parse(&data).unwrap();
        assert_eq!("HL2DEMO", header.filestamp);
        assert_eq!(Some(ProtocolVariant::Source1), header.protocol_variant());
        assert_eq!(4, header.protocol);
        assert_eq!(13881, header.network_protocol);
        assert_eq!("Valve CS:GO EU West Server", header.server_name);
        assert_eq!("GOTV Demo", header.client_name);
        assert_eq!("de_dust2", header.map_name);
        assert_eq!("csgo", header.game_directory);
        assert_eq!(Duration::from_millis(2500), header.playback_time);
        assert_eq!(320, header.playback_ticks);
        assert_eq!(160, header.playback_frames);
        assert_eq!(551_223, header.signon_length);
        assert_eq!(64.0, header.frame_rate());
    }

    #[test]
    fn parse_source2_filestamp_only() {
        let mut data = padded("PBDEMS2", FILESTAMP_LEN);
        data.extend([0u8; 8]);

        let header = DemoHeader::parse(&data).unwrap();
        assert_eq!(Some(ProtocolVariant::Source2), header.protocol_variant());
        assert_eq!(0.0, header.frame_rate());
        assert_eq!(Duration::ZERO, header.frame_time());
    }

    #[test]
    fn parse_rejects_bad_input() {
        let err = DemoHeader::parse(&padded("NOTADEMO", FILESTAMP_LEN)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidHeader(_)));

        let full = source1_bytes();
        let err = DemoHeader::parse(&full[..100]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidHeader(_)));

        let err = DemoHeader::parse(b"HL2").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Nom(_)));
    }

    #[test]
    fn serializes_to_json() {
        let header = DemoHeaderBuilder::default()
            .filestamp("HL2DEMO")
            .map_name("de_inferno")
            .playback_frames(10)
            .build()
            .unwrap();
        let json = serde_json::to_value(&header).unwrap();
        assert_eq!("de_inferno", json["map_name"]);
        assert_eq!(10, json["playback_frames"]);
    }
}
