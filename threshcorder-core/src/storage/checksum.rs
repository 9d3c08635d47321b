use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::models::error::RecorderError;

/// SHA-256 of a finalized recording as lowercase hex.
///
/// The file is streamed through the hasher, so memory use does not grow
/// with the recording.
pub fn sha256_file(path: &Path) -> Result<String, RecorderError> {
    let checksum_error = |e: io::Error| RecorderError::Io(format!("failed to checksum {}: {}", path.display(), e));

    let mut reader = BufReader::new(File::open(path).map_err(checksum_error)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(checksum_error)?;

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_support::TestDir;

    #[test]
    fn digest_of_known_content() {
        let dir = TestDir::new("checksum_known");
        let path = dir.path().join("abc.bin");
        fs::write(&path, b"abc").unwrap();

        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn streams_files_larger_than_the_copy_buffer() {
        let dir = TestDir::new("checksum_large");
        let path = dir.path().join("large.bin");
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        let expected = format!("{:x}", Sha256::digest(&data));
        assert_eq!(sha256_file(&path).unwrap(), expected);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TestDir::new("checksum_missing");
        assert!(matches!(
            sha256_file(&dir.path().join("nope.wav")),
            Err(RecorderError::Io(_))
        ));
    }
}
