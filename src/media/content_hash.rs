// Dropbox-compatible content hash used to detect duplicate uploads.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

/// Block size the remote store hashes with.
pub const BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// SHA-256 over the concatenated SHA-256 digests of each 4 MiB block, hex encoded.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    for block in data.chunks(BLOCK_SIZE) {
        hasher.update(Sha256::digest(block));
    }
    hex::encode(hasher.finalize())
}

/// Same as [`content_hash`], streaming the file block by block.
pub fn content_hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut block = vec![0u8; BLOCK_SIZE];
    loop {
        let filled = read_block(&mut file, &mut block)?;
        if filled == 0 {
            break;
        }
        hasher.update(Sha256::digest(&block[..filled]));
        if filled < BLOCK_SIZE {
            break;
        }
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Fill `buf` as far as the reader allows. Returns the number of bytes read.
fn read_block(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_single_block_is_hash_of_hash() {
        let data = b"photo bytes";
        let expected = hex::encode(Sha256::digest(Sha256::digest(data)));
        assert_eq!(content_hash(data), expected);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(content_hash(b""), hex::encode(Sha256::digest(b"")));
    }

    #[test]
    fn test_multi_block() {
        let data = vec![7u8; BLOCK_SIZE + 10];
        let mut outer = Sha256::new();
        outer.update(Sha256::digest(&data[..BLOCK_SIZE]));
        outer.update(Sha256::digest(&data[BLOCK_SIZE..]));
        assert_eq!(content_hash(&data), hex::encode(outer.finalize()));
    }

    #[test]
    fn test_file_hash_matches_bytes() {
        let data: Vec<u8> = (0..(BLOCK_SIZE + 123)).map(|i| (i % 251) as u8).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file.flush().unwrap();
        assert_eq!(content_hash_file(file.path()).unwrap(), content_hash(&data));
    }
}
