use std::fmt;
use std::sync::OnceLock;

use log::{debug, warn};

/// Block transform implementation used by a [`Cipher`](crate::Cipher).
///
/// [`Backend::detect`] picks the fastest available backend once per process. Both backends
/// produce bit-identical output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Backend {
    /// Portable implementation with an arithmetic (table-free) S-box.
    Software,
    /// x86 AES-NI instructions.
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    AesNi,
}

impl Backend {
    /// Returns the preferred backend for this CPU. Detection runs once and is cached.
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Backend> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let backend = Self::probe();
            debug!("tgcrypt: selected {backend} AES backend");
            backend
        })
    }

    /// Whether this backend can run on the current CPU.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Software => true,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::AesNi => {
                std::is_x86_feature_detected!("aes") && std::is_x86_feature_detected!("sse2")
            }
        }
    }

    /// Returns `self` if it is available, otherwise the software backend.
    pub(crate) fn or_software(self) -> Self {
        if self.is_available() {
            self
        } else {
            warn!("tgcrypt: {self} AES backend unavailable on this CPU, using software");
            Backend::Software
        }
    }

    fn probe() -> Self {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if Backend::AesNi.is_available() {
                return Backend::AesNi;
            }
        }
        Backend::Software
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Software => f.write_str("software"),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::AesNi => f.write_str("AES-NI"),
        }
    }
}
