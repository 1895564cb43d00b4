//! String constants stored at the top of the image.
use super::CompileError;
use acc8_core::{ascii, IMAGE_SIZE};
use log::debug;
use smol_str::SmolStr;

/// Address of the pre-seeded `"true"` string.
pub const TRUE_ADDRESS: u8 = 0xFB;

/// Address of the pre-seeded `"false"` string.
pub const FALSE_ADDRESS: u8 = 0xF5;

/// Downward growing region of null-terminated strings.
///
/// New strings are prepended, so the address of a string never changes
/// once it's allocated and no two strings overlap.
#[derive(Debug, Clone)]
pub struct Heap {
    /// Contents of the image from `start()` up to the last address.
    bytes: Vec<u8>,
    /// Allocated literals and their addresses, in allocation order.
    strings: Vec<(SmolStr, u8)>,
}

impl Heap {
    pub fn new() -> Self {
        let mut heap = Self {
            bytes: Vec::with_capacity(IMAGE_SIZE),
            strings: vec![],
        };
        heap.prepend("true");
        heap.prepend("false");
        heap
    }

    /// Address of the first heap byte, the `endOfHeap` boundary.
    #[inline]
    pub fn start(&self) -> usize {
        IMAGE_SIZE - self.bytes.len()
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Allocated strings with their addresses, including the seeded booleans.
    pub fn strings(&self) -> impl Iterator<Item = (&str, u8)> {
        self.strings.iter().map(|(s, address)| (s.as_str(), *address))
    }

    /// Address of a string literal, allocating it when first seen.
    ///
    /// Equal literals share one allocation.
    pub fn allocate(&mut self, value: &str) -> Result<u8, CompileError> {
        if let Some((_, address)) = self.strings.iter().find(|(s, _)| s == value) {
            return Ok(*address);
        }

        // A string may not reach address zero, where code starts.
        if value.chars().count() + 1 >= self.start() {
            return Err(CompileError::HeapOverflow {
                string: SmolStr::from(value),
            });
        }

        let address = self.prepend(value);
        debug!("allocated \"{}\" at {:#04X}", value, address);
        Ok(address)
    }

    fn prepend(&mut self, value: &str) -> u8 {
        let encoded = ascii::encode(value);
        self.bytes.splice(0..0, encoded);
        let address = self.start() as u8;
        self.strings.push((SmolStr::from(value), address));
        address
    }
}

impl Default for Heap {
    fn default() -> Self {
        Heap::new()
    }
}
