//! Canonical 44-byte RIFF/WAVE header for linear PCM.
//!
//! Layout (all integers little-endian):
//! ```text
//! [0-3]    "RIFF"
//! [4-7]    chunk size = 36 + data_size
//! [8-11]   "WAVE"
//! [12-15]  "fmt "
//! [16-19]  16 (PCM format chunk size)
//! [20-21]  1 (PCM format code)
//! [22-23]  channels
//! [24-27]  sample_rate
//! [28-31]  byte_rate = sample_rate * block_align
//! [32-33]  block_align = channels * bits_per_sample / 8
//! [34-35]  bits_per_sample
//! [36-39]  "data"
//! [40-43]  data_size
//! ```

use crate::models::audio_models::AudioFormat;

/// Size of the canonical WAV header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Offset of the RIFF chunk size field.
pub const RIFF_SIZE_OFFSET: u64 = 4;

/// Offset of the data subchunk size field.
pub const DATA_SIZE_OFFSET: u64 = 40;

/// Header bytes counted by the RIFF chunk size besides the sample data.
pub const RIFF_SIZE_BASE: u32 = 36;

const PCM_FORMAT_CODE: u16 = 1;
const PCM_FMT_CHUNK_SIZE: u32 = 16;

/// Build a header for `format` claiming `data_size` bytes of sample data.
///
/// Writers emit this with `data_size = 0` as a placeholder and patch both
/// size fields once the real length is known.
pub fn generate_wav_header(format: &AudioFormat, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&riff_chunk_size(data_size).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&PCM_FMT_CHUNK_SIZE.to_le_bytes());
    header[20..22].copy_from_slice(&PCM_FORMAT_CODE.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// RIFF chunk size for a file holding `data_size` bytes of samples.
pub fn riff_chunk_size(data_size: u32) -> u32 {
    RIFF_SIZE_BASE + data_size
}

/// Largest data chunk whose RIFF size still fits in 32 bits.
pub const MAX_DATA_SIZE: u32 = u32::MAX - RIFF_SIZE_BASE;

/// Fields read back from a canonical PCM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_size: u32,
    pub format: AudioFormat,
    pub byte_rate: u32,
    pub block_align: u16,
    pub data_size: u32,
}

impl WavHeader {
    /// Parse the first 44 bytes of `bytes`. Returns `None` unless they form a
    /// canonical single-`fmt`-chunk PCM header.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < WAV_HEADER_SIZE {
            return None;
        }
        if &bytes[0..4] != b"RIFF"
            || &bytes[8..12] != b"WAVE"
            || &bytes[12..16] != b"fmt "
            || &bytes[36..40] != b"data"
        {
            return None;
        }
        if read_u32(bytes, 16) != PCM_FMT_CHUNK_SIZE || read_u16(bytes, 20) != PCM_FORMAT_CODE {
            return None;
        }

        Some(Self {
            riff_size: read_u32(bytes, 4),
            format: AudioFormat {
                channels: read_u16(bytes, 22),
                sample_rate: read_u32(bytes, 24),
                bits_per_sample: read_u16(bytes, 34),
            },
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
            data_size: read_u32(bytes, 40),
        })
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
