use std::io;
use std::net::Shutdown;
use std::net::TcpStream;

/// Explicit release of an underlying stream's resources
///
/// Readers built with `new_with_release` forward `close()` here; others treat `close()` as
/// a successful no-op.
pub trait Release {
    fn release(&mut self) -> io::Result<()>;
}

impl Release for TcpStream {
    fn release(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

#[cfg(unix)]
impl Release for std::os::unix::net::UnixStream {
    fn release(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

impl<T: Release + ?Sized> Release for Box<T> {
    fn release(&mut self) -> io::Result<()> {
        (**self).release()
    }
}

impl<T: Release + ?Sized> Release for &mut T {
    fn release(&mut self) -> io::Result<()> {
        (**self).release()
    }
}
