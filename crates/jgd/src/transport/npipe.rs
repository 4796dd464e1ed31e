//
// npipe.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! Windows named-pipe client transport. No overlapped I/O: `has_data` and
//! the read-timeout loop in `recv_line` (see `mod.rs`) both poll with
//! `PeekNamedPipe`, which is the simplest way to get a non-blocking byte
//! count out of a synchronous pipe handle.

use std::ffi::c_void;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::time::Duration;
use std::time::Instant;

use windows_sys::Win32::Foundation::CloseHandle;
use windows_sys::Win32::Foundation::GENERIC_READ;
use windows_sys::Win32::Foundation::GENERIC_WRITE;
use windows_sys::Win32::Foundation::HANDLE;
use windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE;
use windows_sys::Win32::Storage::FileSystem::CreateFileW;
use windows_sys::Win32::Storage::FileSystem::OPEN_EXISTING;
use windows_sys::Win32::Storage::FileSystem::ReadFile;
use windows_sys::Win32::Storage::FileSystem::WriteFile;
use windows_sys::Win32::System::Pipes::PeekNamedPipe;

pub struct Conn {
    handle: HANDLE,
}

// The handle is only ever touched from the host's single cooperative
// thread (§5); there is no concurrent access to race against.
unsafe impl Send for Conn {}

impl Conn {
    pub fn connect(name: &str) -> io::Result<Self> {
        let path = format!(r"\\.\pipe\{name}");
        let wide: Vec<u16> =
            std::ffi::OsStr::new(&path).encode_wide().chain(std::iter::once(0)).collect();
        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                0,
                std::ptr::null(),
                OPEN_EXISTING,
                0,
                0,
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }
        Ok(Conn { handle })
    }

    pub fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut written: u32 = 0;
        let ok = unsafe {
            WriteFile(
                self.handle,
                buf.as_ptr(),
                buf.len() as u32,
                &mut written,
                std::ptr::null_mut(),
            )
        };
        if ok == 0 || (written as usize) != buf.len() {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut read: u32 = 0;
        let ok = unsafe {
            ReadFile(
                self.handle,
                buf.as_mut_ptr() as *mut c_void,
                buf.len() as u32,
                &mut read,
                std::ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(read as usize)
    }

    fn bytes_available(&self) -> io::Result<u32> {
        let mut available: u32 = 0;
        let ok = unsafe {
            PeekNamedPipe(
                self.handle,
                std::ptr::null_mut(),
                0,
                std::ptr::null_mut(),
                &mut available,
                std::ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(available)
    }

    pub fn has_data(&self) -> io::Result<bool> {
        Ok(self.bytes_available()? > 0)
    }

    /// Block (via short polling sleeps) until at least one byte is
    /// available or `timeout` elapses, then perform one `read`.
    pub fn read_with_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.bytes_available()? > 0 {
                return self.read(buf);
            }
            if Instant::now() >= deadline {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "named pipe read timed out"));
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

impl Drop for Conn {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.handle);
        }
    }
}
