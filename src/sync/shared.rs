//! ISR-safe driver wrapper using critical sections.

use super::primitives::CriticalSectionCell;
use crate::driver::enc28j60::Enc28j60;
use crate::hal::transport::Transport;

/// ISR-safe ENC28J60 wrapper using critical sections.
///
/// The slot starts empty so it can live in a `static`; the driver is moved
/// in with [`install`](Self::install) once the SPI bus exists. All access
/// goes through `critical_section::with()`, disabling interrupts for the
/// duration of the closure.
///
/// # Example
///
/// ```ignore
/// static ETH: SharedEnc28j60<MyTransport> = SharedEnc28j60::new();
///
/// ETH.install(Enc28j60::new(transport));
/// ETH.with(|eth| eth.init(Enc28j60Config::new()));
///
/// #[interrupt]
/// fn EXTI0() {
///     ETH.with(|eth| {
///         let mut buf = [0u8; 1518];
///         while let Ok(Some(frame)) = eth.poll_receive(&mut buf) {
///             // ...
///         }
///     });
/// }
/// ```
pub struct SharedEnc28j60<T: Transport> {
    inner: CriticalSectionCell<Option<Enc28j60<T>>>,
}

impl<T: Transport> SharedEnc28j60<T> {
    /// Create an empty wrapper (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(None),
        }
    }

    /// Create a wrapper that already holds `dev`.
    pub const fn with_driver(dev: Enc28j60<T>) -> Self {
        Self {
            inner: CriticalSectionCell::new(Some(dev)),
        }
    }

    /// Move a driver in, returning the one it replaces.
    pub fn install(&self, dev: Enc28j60<T>) -> Option<Enc28j60<T>> {
        self.inner.with(|slot| slot.replace(dev))
    }

    /// Move the driver out, leaving the wrapper empty.
    pub fn take(&self) -> Option<Enc28j60<T>> {
        self.inner.with(Option::take)
    }

    /// Whether a driver is installed.
    pub fn is_installed(&self) -> bool {
        self.inner.with(|slot| slot.is_some())
    }

    /// Execute a closure with exclusive access to the driver.
    ///
    /// Returns `None` when no driver is installed. Interrupts are disabled
    /// for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Enc28j60<T>) -> R,
    {
        self.inner.with(|slot| slot.as_mut().map(f))
    }

    /// Like [`with`](Self::with), but also returns `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Enc28j60<T>) -> R,
    {
        self.inner.try_with(|slot| slot.as_mut().map(f)).flatten()
    }
}

impl<T: Transport> Default for SharedEnc28j60<T> {
    fn default() -> Self {
        Self::new()
    }
}
