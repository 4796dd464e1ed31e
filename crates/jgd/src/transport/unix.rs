//
// unix.rs
//
// Copyright (C) 2024 jgd contributors
//
//

use std::io;
use std::io::Read;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::time::Duration;

pub struct Conn(UnixStream);

impl Conn {
    pub fn connect(path: &str) -> io::Result<Self> {
        Ok(Conn(UnixStream::connect(path)?))
    }

    pub fn from_stream(stream: UnixStream) -> Self {
        Conn(stream)
    }

    pub fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.write_all(buf)
    }

    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }

    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.0.set_read_timeout(timeout)
    }

    pub fn peek(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.peek(buf)
    }
}
