pub mod checksum;
pub mod wav_writer;
