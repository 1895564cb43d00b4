use super::{heap::Heap, CompileError};
use acc8_core::IMAGE_SIZE;
use std::fmt;

/// Final executable: code at the bottom, strings at the top, zero
/// filler in between where variables live at run time.
#[derive(Clone, PartialEq, Eq)]
pub struct Image(Box<[u8; IMAGE_SIZE]>);

impl Image {
    /// Splice resolved code and the heap into one image.
    pub fn assemble(code: &[u8], heap: &Heap) -> Result<Self, CompileError> {
        let heap_start = heap.start();
        if code.len() > heap_start {
            return Err(CompileError::ImageOverflow {
                code: code.len(),
                variables: 0,
                heap_start,
            });
        }

        let mut bytes = Box::new([0; IMAGE_SIZE]);
        bytes[..code.len()].copy_from_slice(code);
        bytes[heap_start..].copy_from_slice(heap.bytes());
        Ok(Self(bytes))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl AsRef<[u8]> for Image {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Image({} bytes)", IMAGE_SIZE)
    }
}

/// Hex grid, 8 bytes per row.
impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.0.chunks(8) {
            let line: Vec<String> = row.iter().map(|byte| format!("{:02X}", byte)).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_layout() {
        let heap = Heap::new();
        let image = Image::assemble(&[0xA9, 0x01, 0x00], &heap).unwrap();
        let bytes = image.as_bytes();

        assert_eq!(bytes.len(), IMAGE_SIZE);
        assert_eq!(&bytes[..3], &[0xA9, 0x01, 0x00]);
        assert!(bytes[3..heap.start()].iter().all(|b| *b == 0));
        assert_eq!(&bytes[heap.start()..], heap.bytes());
    }

    #[test]
    fn test_hex_grid() {
        let image = Image::assemble(&[0xA9, 0x0A], &Heap::new()).unwrap();
        let grid = image.to_string();
        let rows: Vec<_> = grid.lines().collect();

        assert_eq!(rows.len(), 32);
        assert_eq!(rows[0], "A9 0A 00 00 00 00 00 00");
        assert!(rows.iter().all(|row| row.split(' ').count() == 8));
    }
}
