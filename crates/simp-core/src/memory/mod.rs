//! Data memory model and address legality checks.

/// Address legality checks for data-memory and I/O port accesses.
pub mod access;

pub use access::{validate_data_address, validate_data_block, validate_io_address};

/// Number of 32-bit words in data memory.
pub const DATA_MEMORY_WORDS: usize = 4096;

/// Flat word-addressed data memory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DataMemory {
    words: Box<[i32]>,
}

impl Default for DataMemory {
    fn default() -> Self {
        Self {
            words: vec![0; DATA_MEMORY_WORDS].into_boxed_slice(),
        }
    }
}

impl DataMemory {
    /// Builds data memory from an image, zero-filling everything past its end.
    ///
    /// Words beyond [`DATA_MEMORY_WORDS`] are ignored; image loading rejects
    /// oversized images before they get here.
    #[must_use]
    pub fn from_words(image: &[i32]) -> Self {
        let mut memory = Self::default();
        for (slot, word) in memory.words.iter_mut().zip(image) {
            *slot = *word;
        }
        memory
    }

    /// Reads the word at a validated index.
    #[must_use]
    pub fn read(&self, index: usize) -> i32 {
        self.words.get(index).copied().unwrap_or(0)
    }

    /// Writes the word at a validated index. Out-of-range writes are dropped.
    pub fn write(&mut self, index: usize, value: i32) {
        if let Some(slot) = self.words.get_mut(index) {
            *slot = value;
        }
    }

    /// All words in address order.
    #[must_use]
    pub fn words(&self) -> &[i32] {
        &self.words
    }

    /// Mutable view used by block transfers.
    #[must_use]
    pub fn words_mut(&mut self) -> &mut [i32] {
        &mut self.words
    }
}
