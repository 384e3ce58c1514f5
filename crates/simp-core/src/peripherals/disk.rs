//! Fixed-latency disk controller.
//!
//! A command is accepted when `diskcmd` is non-zero and no transfer is in
//! flight. The whole sector moves at once when the command is accepted;
//! `diskstatus` then stays busy for the configured latency before the
//! controller clears the command and raises irq1.

use crate::fault::FaultCode;
use crate::memory::{validate_data_block, DataMemory};
use crate::state::{IoBank, IoRegister};

/// Number of sectors on the disk.
pub const DISK_SECTORS: usize = 128;

/// Words per sector.
pub const SECTOR_WORDS: usize = 128;

/// Total disk capacity in words.
pub const DISK_WORDS: usize = DISK_SECTORS * SECTOR_WORDS;

/// `diskcmd` value selecting a disk-to-memory read. Any other non-zero value
/// writes memory to disk.
pub const DISK_CMD_READ: u32 = 1;

/// Disk contents, sector-major.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Disk {
    words: Box<[i32]>,
}

impl Default for Disk {
    fn default() -> Self {
        Self {
            words: vec![0; DISK_WORDS].into_boxed_slice(),
        }
    }
}

impl Disk {
    /// Builds a disk from an image, zero-filling everything past its end.
    #[must_use]
    pub fn from_words(image: &[i32]) -> Self {
        let mut disk = Self::default();
        for (slot, word) in disk.words.iter_mut().zip(image) {
            *slot = *word;
        }
        disk
    }

    /// All words, sector 0 first.
    #[must_use]
    pub fn words(&self) -> &[i32] {
        &self.words
    }

    /// One sector, or `None` past the last sector.
    #[must_use]
    pub fn sector(&self, index: usize) -> Option<&[i32]> {
        let start = index.checked_mul(SECTOR_WORDS)?;
        self.words.get(start..start + SECTOR_WORDS)
    }

    fn sector_mut(&mut self, index: usize) -> Option<&mut [i32]> {
        let start = index.checked_mul(SECTOR_WORDS)?;
        self.words.get_mut(start..start + SECTOR_WORDS)
    }
}

/// Direction of a sector transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiskTransfer {
    /// Disk to data memory.
    Read,
    /// Data memory to disk.
    Write,
}

/// What the controller did during one service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiskEvent {
    /// Nothing changed.
    Idle,
    /// A command was accepted and its sector copied.
    Started {
        /// Transfer direction.
        transfer: DiskTransfer,
        /// Sector index.
        sector: usize,
        /// Data-memory buffer address.
        buffer: usize,
        /// Cycle on which the transfer completes.
        completes_at: u64,
    },
    /// An in-flight transfer completed and raised irq1.
    Completed,
}

/// Disk plus the controller's in-flight bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DiskController {
    disk: Disk,
    latency: u64,
    completion: Option<u64>,
}

impl DiskController {
    /// Creates an idle controller over `disk`.
    #[must_use]
    pub const fn new(disk: Disk, latency: u64) -> Self {
        Self {
            disk,
            latency,
            completion: None,
        }
    }

    /// The disk contents.
    #[must_use]
    pub const fn disk(&self) -> &Disk {
        &self.disk
    }

    /// Completion cycle of the in-flight transfer, if any.
    #[must_use]
    pub const fn completion(&self) -> Option<u64> {
        self.completion
    }

    /// Runs the controller for `cycle`.
    ///
    /// A completion due this cycle is handled before a new command is
    /// considered, and the cleared `diskcmd` prevents a same-cycle restart.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::DiskSectorOutOfRange`] or
    /// [`FaultCode::DiskBufferOutOfRange`] when a new command names a transfer
    /// that cannot happen. The command is dropped: `diskcmd` is cleared and
    /// nothing is copied.
    pub fn service(
        &mut self,
        io: &mut IoBank,
        memory: &mut DataMemory,
        cycle: u64,
    ) -> Result<DiskEvent, FaultCode> {
        if self.completion.is_some_and(|due| cycle >= due) {
            self.completion = None;
            io.set(IoRegister::DiskCmd, 0);
            io.set_flag(IoRegister::DiskStatus, false);
            io.set_flag(IoRegister::Irq1Status, true);
            return Ok(DiskEvent::Completed);
        }

        let cmd = io.get(IoRegister::DiskCmd);
        if cmd == 0 || self.completion.is_some() || io.is_set(IoRegister::DiskStatus) {
            return Ok(DiskEvent::Idle);
        }

        let (sector, buffer) = match self.locate(io) {
            Ok(found) => found,
            Err(cause) => {
                io.set(IoRegister::DiskCmd, 0);
                return Err(cause);
            }
        };

        let block = &mut memory.words_mut()[buffer..buffer + SECTOR_WORDS];
        let transfer = if cmd == DISK_CMD_READ {
            if let Some(source) = self.disk.sector(sector) {
                block.copy_from_slice(source);
            }
            DiskTransfer::Read
        } else {
            if let Some(target) = self.disk.sector_mut(sector) {
                target.copy_from_slice(block);
            }
            DiskTransfer::Write
        };

        let completes_at = cycle.saturating_add(self.latency);
        self.completion = Some(completes_at);
        io.set_flag(IoRegister::DiskStatus, true);

        Ok(DiskEvent::Started {
            transfer,
            sector,
            buffer,
            completes_at,
        })
    }

    fn locate(&self, io: &IoBank) -> Result<(usize, usize), FaultCode> {
        let sector = usize::try_from(io.get(IoRegister::DiskSector))
            .ok()
            .filter(|index| self.disk.sector(*index).is_some())
            .ok_or(FaultCode::DiskSectorOutOfRange)?;
        let buffer = validate_data_block(io.get(IoRegister::DiskBuffer), SECTOR_WORDS)?;
        Ok((sector, buffer))
    }
}
