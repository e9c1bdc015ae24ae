use anyhow::{ensure, Context, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub name: String,
    pub base: u32,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub perms: &'static str,
}

impl Segment {
    pub fn end(&self) -> u32 {
        self.base.wrapping_add(self.bytes.len() as u32)
    }

    fn contains(&self, addr: u32) -> bool {
        addr >= self.base && addr < self.end()
    }
}

#[derive(Debug, Clone)]
pub struct Image {
    pub segments: Vec<Segment>,
}

/// Map a raw little-endian image at `base`, optionally dropping a header of
/// `skip` bytes and keeping at most `len` bytes.
pub fn load_raw_bin(path: &Path, base: u32, skip: usize, len: Option<usize>) -> Result<Image> {
    let mut bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    ensure!(skip <= bytes.len(), "header of {skip} bytes is longer than {}", path.display());
    bytes.drain(..skip);
    if let Some(len) = len {
        ensure!(len <= bytes.len(), "{len} bytes requested, {} left after the header", bytes.len());
        bytes.truncate(len);
    }
    Ok(Image::raw(base, bytes))
}

impl Image {
    pub fn raw(base: u32, bytes: Vec<u8>) -> Self {
        let seg = Segment { name: "text".into(), base, bytes, perms: "r-x" };
        Self { segments: vec![seg] }
    }

    pub fn read_u8(&self, addr: u32) -> Option<u8> {
        let s = self.segments.iter().find(|s| s.contains(addr))?;
        Some(s.bytes[(addr - s.base) as usize])
    }

    pub fn read_u32(&self, addr: u32) -> Option<u32> {
        let mut b = [0u8; 4];
        for (i, byte) in b.iter_mut().enumerate() {
            *byte = self.read_u8(addr.wrapping_add(i as u32))?;
        }
        Some(u32::from_le_bytes(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_maps_skip_and_len() {
        let path = std::env::temp_dir().join("legv8_disasm_loader.bin");
        std::fs::write(&path, [0u8, 1, 2, 3, 4, 5]).unwrap();
        let img = load_raw_bin(&path, 0x1000_0000, 2, Some(3)).unwrap();
        assert_eq!(img.segments.len(), 1);
        let s = &img.segments[0];
        assert_eq!(s.base, 0x1000_0000);
        assert_eq!(s.bytes, vec![2, 3, 4]);
        assert_eq!(img.read_u8(0x1000_0002), Some(4));
        assert!(img.read_u32(0x1000_0000).is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn loader_rejects_oversized_header_and_length() {
        let path = std::env::temp_dir().join("legv8_disasm_loader_short.bin");
        std::fs::write(&path, [0u8; 4]).unwrap();
        assert!(load_raw_bin(&path, 0, 5, None).is_err());
        assert!(load_raw_bin(&path, 0, 2, Some(3)).is_err());
        assert_eq!(load_raw_bin(&path, 0, 4, None).unwrap().segments[0].bytes.len(), 0);
        let _ = std::fs::remove_file(&path);
    }
}
