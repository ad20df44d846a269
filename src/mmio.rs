/*
 * SPDX-License-Identifier: MIT
 */

//! Userspace views of physical memory through `/dev/mem`.
//!
//! `mmap` only accepts page-aligned offsets, so every mapping is widened
//! down to the containing page boundary and the caller-visible pointer is
//! bumped back up by the in-page remainder. `mmap64` is used throughout
//! because the BCM2711 peripheral base does not fit a 32-bit `off_t`.

use {
    crate::errors::{Result, Ws281xError},
    core::{marker::PhantomData, ops::Deref, ptr},
    std::{
        fs::{File, OpenOptions},
        os::unix::{fs::OpenOptionsExt, io::AsRawFd},
    },
};

const DEV_MEM: &str = "/dev/mem";

/// Open `/dev/mem` for uncached register and buffer access.
pub fn open_dev_mem() -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open(DEV_MEM)
        .map_err(|_| Ws281xError::MapRegisters)
}

/// An owned `mmap` of `len` bytes of physical memory starting at `phys`.
pub struct RawMapping {
    base: *mut u8,
    map_len: usize,
    in_page: usize,
}

impl RawMapping {
    pub fn map(file: &File, phys: u64, len: usize) -> Result<Self> {
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as u64;
        let page_base = phys & !(page - 1);
        let in_page = (phys - page_base) as usize;
        let map_len = len + in_page;

        let base = unsafe {
            libc::mmap64(
                ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                page_base as libc::off64_t,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(Ws281xError::Mmap);
        }

        Ok(Self {
            base: base as *mut u8,
            map_len,
            in_page,
        })
    }

    /// Pointer to the first byte of the requested physical range.
    pub fn as_ptr(&self) -> *mut u8 {
        unsafe { self.base.add(self.in_page) }
    }
}

impl Drop for RawMapping {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base as *mut libc::c_void, self.map_len);
        }
    }
}

/// A mapped peripheral register window, typed as its `register_structs!`
/// block. Borrowing through `Deref` keeps every access volatile via the
/// `tock_registers` field types.
pub struct MappedBlock<T> {
    mapping: RawMapping,
    phantom: PhantomData<fn() -> T>,
}

impl<T> MappedBlock<T> {
    pub fn map(file: &File, phys: u64) -> Result<Self> {
        let mapping = RawMapping::map(file, phys, core::mem::size_of::<T>())
            .map_err(|_| Ws281xError::MapRegisters)?;
        Ok(Self {
            mapping,
            phantom: PhantomData,
        })
    }
}

impl<T> Deref for MappedBlock<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.mapping.as_ptr() as *const T) }
    }
}
