//! Devices driven from the hardware register bank.

/// Fixed-latency sector transfers between disk and data memory.
pub mod disk;
/// Timer, external schedule and interrupt vectoring.
pub mod interrupt;
/// Monitor framebuffer.
pub mod monitor;

pub use disk::{
    Disk, DiskController, DiskEvent, DiskTransfer, DISK_CMD_READ, DISK_SECTORS, DISK_WORDS,
    SECTOR_WORDS,
};
pub use interrupt::InterruptController;
pub use monitor::{Monitor, MONITOR_CMD_WRITE, MONITOR_PIXELS, MONITOR_SIDE};
