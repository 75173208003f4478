use bincode::{Decode, Encode};
use thiserror::Error;

use crate::Stroke;

pub const SESSION_FILE_MAGIC: [u8; 4] = *b"SSKS";
pub const SESSION_FILE_VERSION: u32 = 1;
const SESSION_HEADER_LEN: usize = SESSION_FILE_MAGIC.len() + std::mem::size_of::<u32>();

/// Ordered stroke history as persisted between sessions.
#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct SessionFileData {
    pub strokes: Vec<Stroke>,
}

#[derive(Debug, Error)]
pub enum SessionFileDecodeError {
    #[error("unsupported session file version {0}")]
    UnsupportedVersion(u32),
    #[error("not a session file")]
    InvalidHeader,
    #[error("corrupt session file body: {0}")]
    InvalidData(#[from] bincode::error::DecodeError),
}

pub fn encode_session_file(
    data: &SessionFileData,
) -> Result<Vec<u8>, bincode::error::EncodeError> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&SESSION_FILE_MAGIC);
    payload.extend_from_slice(&SESSION_FILE_VERSION.to_le_bytes());
    let body = bincode::encode_to_vec(data, bincode::config::standard())?;
    payload.extend_from_slice(&body);
    Ok(payload)
}

pub fn decode_session_file(payload: &[u8]) -> Result<SessionFileData, SessionFileDecodeError> {
    if !(payload.len() >= SESSION_HEADER_LEN && payload.starts_with(&SESSION_FILE_MAGIC)) {
        return Err(SessionFileDecodeError::InvalidHeader);
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&payload[SESSION_FILE_MAGIC.len()..SESSION_HEADER_LEN]);
    let version = u32::from_le_bytes(version);
    let body = &payload[SESSION_HEADER_LEN..];
    match version {
        1 => {
            let (data, _) = bincode::decode_from_slice(body, bincode::config::standard())?;
            Ok(data)
        }
        _ => Err(SessionFileDecodeError::UnsupportedVersion(version)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Pixel, Point, StrokeBody, StrokeId, Tool, UserId};

    fn sample() -> SessionFileData {
        let mut line = Stroke::begin(
            StrokeId::from("line"),
            Tool::Line,
            Color::rgb(1, 2, 3),
            4.0,
            Point::new(0.0, 0.0),
            UserId::from("u"),
        );
        line.extend(Point::new(10.0, 0.0));
        line.finalize();
        let fill = Stroke {
            id: StrokeId::from("fill"),
            color: Color::WHITE,
            line_width: 1.0,
            user_id: UserId::from("u"),
            body: StrokeBody::Fill {
                seed: Point::new(1.5, 1.5),
                pixels: vec![Pixel::new(1, 1)],
            },
        };
        SessionFileData {
            strokes: vec![line, fill],
        }
    }

    #[test]
    fn encoded_file_starts_with_header_and_decodes() {
        let data = sample();
        let payload = encode_session_file(&data).unwrap();
        assert!(payload.starts_with(&SESSION_FILE_MAGIC));
        assert_eq!(decode_session_file(&payload).unwrap(), data);
    }

    #[test]
    fn rejects_foreign_and_future_files() {
        assert!(matches!(
            decode_session_file(b"nope"),
            Err(SessionFileDecodeError::InvalidHeader)
        ));
        let mut payload = encode_session_file(&sample()).unwrap();
        payload[4..8].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(
            decode_session_file(&payload),
            Err(SessionFileDecodeError::UnsupportedVersion(7))
        ));
        let truncated = &encode_session_file(&sample()).unwrap()[..12];
        assert!(matches!(
            decode_session_file(truncated),
            Err(SessionFileDecodeError::InvalidData(_))
        ));
    }
}
