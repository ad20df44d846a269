/*
 * SPDX-License-Identifier: MIT
 */

//! VideoCore property mailbox, reached through the `/dev/vcio` ioctl.
//!
//! The firmware owns a pool of DMA-coherent memory; we ask it to allocate,
//! lock and eventually release the pixel buffer through property tags. A
//! message is a 16-byte-aligned run of u32 words: total size, request code,
//! then tags, each tag carrying its own buffer and request lengths, closed by
//! an end tag.

use {
    crate::{
        board::BoardInfo,
        errors::{Result, Ws281xError},
        mmio::RawMapping,
    },
    core::mem::ManuallyDrop,
    std::{
        ffi::CString,
        fs::{File, OpenOptions},
        os::unix::io::AsRawFd,
    },
};

const MBOX_DEVICE: &str = "/dev/vcio";
const MBOX_DEV_MAJOR: u32 = 100;

/// _IOWR(MBOX_DEV_MAJOR, 0, char *)
const IOCTL_MBOX_PROPERTY: libc::c_ulong =
    (3 << 30) | ((core::mem::size_of::<*mut libc::c_void>() as libc::c_ulong) << 16) | 100 << 8;

const REQUEST: u32 = 0;
const RESPONSE_SUCCESS: u32 = 0x8000_0000;

mod tag {
    pub const ALLOCATE_MEMORY: u32 = 0x3000c;
    pub const LOCK_MEMORY: u32 = 0x3000d;
    pub const UNLOCK_MEMORY: u32 = 0x3000e;
    pub const RELEASE_MEMORY: u32 = 0x3000f;
    pub const END: u32 = 0;
}

/// Cache aliases for AllocateMemory. The VideoCore on the original Pi sees
/// RAM through the L2-coherent 0x40000000 alias; everything later uses the
/// uncached direct alias.
const MEM_FLAG_DIRECT: u32 = 1 << 2;
const MEM_FLAG_L1_NONALLOCATING: u32 = (1 << 2) | (1 << 3);

/// A property message under construction or returned by the firmware.
#[repr(C, align(16))]
pub struct Message {
    buf: [u32; 32],
    cursor: usize,
}

impl Message {
    pub fn request() -> Self {
        let mut buf = [0u32; 32];
        buf[1] = REQUEST;
        Self { buf, cursor: 2 }
    }

    /// Append one tag. The tag's value buffer is sized to hold whichever is
    /// larger, the request words or the response the firmware writes back.
    pub fn tag(mut self, id: u32, args: &[u32], response_words: usize) -> Self {
        let value_words = args.len().max(response_words);
        self.buf[self.cursor] = id;
        self.buf[self.cursor + 1] = (value_words * 4) as u32;
        self.buf[self.cursor + 2] = (args.len() * 4) as u32;
        self.buf[self.cursor + 3..self.cursor + 3 + args.len()].copy_from_slice(args);
        self.cursor += 3 + value_words;
        self
    }

    pub fn end(mut self) -> Self {
        self.buf[self.cursor] = tag::END;
        self.cursor += 1;
        self.buf[0] = (self.cursor * 4) as u32;
        self
    }

    /// Word `n` of the first tag's value buffer, after the firmware replied.
    pub fn value(&self, n: usize) -> u32 {
        self.buf[5 + n]
    }
}

/// An open handle on the property channel.
pub struct Mailbox {
    file: File,
}

impl Mailbox {
    /// Open `/dev/vcio`, or on kernels predating it, a transient device node
    /// for the mailbox char major.
    pub fn open() -> Result<Self> {
        if let Ok(file) = OpenOptions::new().read(true).write(true).open(MBOX_DEVICE) {
            return Ok(Self { file });
        }

        let path = format!("/tmp/mailbox-{}", std::process::id());
        let cpath = CString::new(path.as_str()).map_err(|_| Ws281xError::MailboxDevice)?;
        unsafe {
            libc::unlink(cpath.as_ptr());
            if libc::mknod(
                cpath.as_ptr(),
                libc::S_IFCHR | 0o600,
                libc::makedev(MBOX_DEV_MAJOR, 0),
            ) < 0
            {
                return Err(Ws281xError::MailboxDevice);
            }
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|_| Ws281xError::MailboxDevice)?;
        unsafe {
            libc::unlink(cpath.as_ptr());
        }
        Ok(Self { file })
    }

    /// Round-trip one message through the firmware.
    fn property(&self, msg: &mut Message) -> Result<()> {
        let rc = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                IOCTL_MBOX_PROPERTY,
                msg.buf.as_mut_ptr(),
            )
        };
        if rc < 0 || msg.buf[1] != RESPONSE_SUCCESS {
            return Err(Ws281xError::MailboxDevice);
        }
        Ok(())
    }

    /// Allocate `size` bytes from the firmware's pool. Returns a memory
    /// handle, not an address.
    pub fn alloc(&self, size: u32, align: u32, flags: u32) -> Result<u32> {
        let mut msg = Message::request()
            .tag(tag::ALLOCATE_MEMORY, &[size, align, flags], 1)
            .end();
        self.property(&mut msg)?;
        match msg.value(0) {
            0 => Err(Ws281xError::OutOfMemory),
            handle => Ok(handle),
        }
    }

    /// Pin an allocation and learn its bus address.
    pub fn lock(&self, handle: u32) -> Result<u32> {
        let mut msg = Message::request()
            .tag(tag::LOCK_MEMORY, &[handle], 1)
            .end();
        self.property(&mut msg)?;
        Ok(msg.value(0))
    }

    pub fn unlock(&self, handle: u32) -> Result<()> {
        let mut msg = Message::request()
            .tag(tag::UNLOCK_MEMORY, &[handle], 1)
            .end();
        self.property(&mut msg)
    }

    pub fn release(&self, handle: u32) -> Result<()> {
        let mut msg = Message::request()
            .tag(tag::RELEASE_MEMORY, &[handle], 1)
            .end();
        self.property(&mut msg)
    }
}

/// A firmware allocation, locked and mapped into our address space for its
/// whole lifetime. Dropping it unmaps, unlocks and releases in that order.
pub struct VideoCoreMem {
    mapping: ManuallyDrop<RawMapping>,
    mailbox: Mailbox,
    handle: u32,
    bus_addr: u32,
    size: usize,
}

impl VideoCoreMem {
    pub fn alloc(board: &BoardInfo, dev_mem: &File, size: usize) -> Result<Self> {
        let mailbox = Mailbox::open()?;

        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        let size = (size + page - 1) & !(page - 1);

        let flags = if board.videocore_base == 0x4000_0000 {
            MEM_FLAG_L1_NONALLOCATING
        } else {
            MEM_FLAG_DIRECT
        };

        let handle = mailbox.alloc(size as u32, page as u32, flags)?;
        let bus_addr = match mailbox.lock(handle) {
            Ok(addr) => addr,
            Err(_) => {
                let _ = mailbox.release(handle);
                return Err(Ws281xError::MemLock);
            }
        };

        let phys = BoardInfo::bus_to_phys(bus_addr);
        let mapping = match RawMapping::map(dev_mem, u64::from(phys), size) {
            Ok(mapping) => mapping,
            Err(e) => {
                let _ = mailbox.unlock(handle);
                let _ = mailbox.release(handle);
                return Err(e);
            }
        };

        Ok(Self {
            mapping: ManuallyDrop::new(mapping),
            mailbox,
            handle,
            bus_addr,
            size,
        })
    }

    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.mapping.as_ptr()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Bus address of byte `offset` of the allocation, as the DMA engine and
    /// the VideoCore address it.
    pub fn bus_of(&self, offset: usize) -> u32 {
        self.bus_addr + offset as u32
    }
}

impl Drop for VideoCoreMem {
    fn drop(&mut self) {
        unsafe {
            ManuallyDrop::drop(&mut self.mapping);
        }
        let _ = self.mailbox.unlock(self.handle);
        let _ = self.mailbox.release(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_message_layout() {
        let msg = Message::request()
            .tag(tag::ALLOCATE_MEMORY, &[4096, 4096, MEM_FLAG_DIRECT], 1)
            .end();

        // [size, code, tag, bufsize, datasize, size, align, flags, end]
        assert_eq!(msg.buf[0], 9 * 4);
        assert_eq!(msg.buf[1], REQUEST);
        assert_eq!(msg.buf[2], tag::ALLOCATE_MEMORY);
        assert_eq!(msg.buf[3], 12);
        assert_eq!(msg.buf[4], 12);
        assert_eq!(msg.buf[5], 4096);
        assert_eq!(msg.buf[6], 4096);
        assert_eq!(msg.buf[7], MEM_FLAG_DIRECT);
        assert_eq!(msg.buf[8], tag::END);
    }

    #[test]
    fn lock_message_layout() {
        let msg = Message::request().tag(tag::LOCK_MEMORY, &[0xabcd], 1).end();
        assert_eq!(msg.buf[0], 7 * 4);
        assert_eq!(msg.buf[2], tag::LOCK_MEMORY);
        assert_eq!(msg.buf[3], 4);
        assert_eq!(msg.buf[4], 4);
        assert_eq!(msg.buf[5], 0xabcd);
        assert_eq!(msg.buf[6], tag::END);
    }

    #[test]
    fn message_alignment() {
        assert_eq!(core::mem::align_of::<Message>(), 16);
        let msg = Message::request();
        assert_eq!(msg.buf.as_ptr() as usize % 16, 0);
    }

    #[test]
    fn response_value_offset() {
        let mut msg = Message::request().tag(tag::LOCK_MEMORY, &[7], 1).end();
        // Simulate the firmware writing the bus address into the value buffer.
        msg.buf[5] = 0xde40_0000;
        assert_eq!(msg.value(0), 0xde40_0000);
    }
}
