//! In-memory sinks for inspecting what a progress bar draws.

use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};

/// A sink whose contents stay readable after a clone was handed to a progress bar.
#[derive(Clone, Default)]
pub(crate) struct SharedSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl SharedSink {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }

    /// Every redraw, with its leading carriage return and trailing padding removed.
    pub(crate) fn draws(&self) -> Vec<String> {
        self.contents()
            .split('\r')
            .skip(1)
            .map(|draw| draw.trim_end().to_owned())
            .collect()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A sink that behaves like a closed pipe.
pub(crate) struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::ErrorKind::BrokenPipe.into())
    }
}
