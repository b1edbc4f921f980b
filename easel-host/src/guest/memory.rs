//! Marshalling between host text and guest linear memory.
//!
//! The guest reads its program text from a conventional input region at
//! offset 0 of its exported memory; the host reads error strings back out
//! of wherever the guest points. The backing store can move whenever the
//! memory grows, so every operation re-derives its slice from the
//! [`Memory`] handle instead of caching pointers.

use easel_core::error::{EaselError, Result};
use wasmtime::{AsContext, AsContextMut, Memory};

/// Offset of the input region in guest memory.
pub const INPUT_OFFSET: u32 = 0;

/// Size of one WASM memory page in bytes.
const WASM_PAGE_SIZE: u64 = 64 * 1024;

/// Handle over the guest's exported linear memory.
#[derive(Debug, Clone, Copy)]
pub struct GuestMemory {
    memory: Memory,
}

impl GuestMemory {
    /// Wrap an exported guest memory.
    pub fn new(memory: Memory) -> Self {
        Self { memory }
    }

    /// Copy program text into the input region at offset 0.
    ///
    /// The length is the UTF-8 byte length of `text`, recomputed on every
    /// call. If the text does not fit the current memory, the memory is
    /// grown by whole pages first.
    ///
    /// # Returns
    /// The `(ptr, len)` pair to pass to the guest's `update` entrypoint.
    pub fn write_input(&self, mut store: impl AsContextMut, text: &str) -> Result<(u32, u32)> {
        let bytes = text.as_bytes();
        let len = bytes.len();

        let current = self.memory.data_size(&store);
        if len > current {
            let pages = ((len - current) as u64).div_ceil(WASM_PAGE_SIZE);
            self.memory
                .grow(&mut store, pages)
                .map_err(|e| EaselError::MemoryGrow {
                    pages,
                    cause: e.to_string(),
                })?;
        }

        let data = self.memory.data_mut(&mut store);
        let dest = data.get_mut(..len).ok_or(EaselError::MemoryWrite {
            offset: u64::from(INPUT_OFFSET),
            count: len as u64,
        })?;
        dest.copy_from_slice(bytes);

        Ok((INPUT_OFFSET, len as u32))
    }

    /// Read a NUL-terminated string starting at `addr`.
    ///
    /// Invalid UTF-8 sequences decode lossily to U+FFFD. A missing
    /// terminator before the end of memory is a read error.
    pub fn read_cstring(&self, store: impl AsContext, addr: u32) -> Result<String> {
        let data = self.memory.data(&store);
        let tail = data.get(addr as usize..).ok_or(EaselError::MemoryRead {
            offset: u64::from(addr),
            count: 1,
        })?;

        let nul = tail
            .iter()
            .position(|b| *b == 0)
            .ok_or(EaselError::MemoryRead {
                offset: u64::from(addr),
                count: tail.len() as u64,
            })?;

        Ok(String::from_utf8_lossy(&tail[..nul]).into_owned())
    }

    /// Read exactly `count` bytes at `addr` as text.
    ///
    /// Invalid UTF-8 sequences decode lossily to U+FFFD.
    pub fn read_range(&self, store: impl AsContext, addr: u32, count: u32) -> Result<String> {
        let data = self.memory.data(&store);
        let start = addr as usize;
        let bytes = data
            .get(start..start + count as usize)
            .ok_or(EaselError::MemoryRead {
                offset: u64::from(addr),
                count: u64::from(count),
            })?;

        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Current guest memory size in bytes.
    pub fn data_size(&self, store: impl AsContext) -> usize {
        self.memory.data_size(&store)
    }
}
