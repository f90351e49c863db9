//! Resource limits applied while resolving meta-entries.

/// Limits that bound what a single entry's meta-entries may cost.
///
/// Long names, long links and PAX headers are read into memory before the
/// entry they decorate is returned, and chains of meta-entries are followed
/// until a real entry appears. These limits keep a hostile archive from
/// turning either into unbounded work.
///
/// ```
/// use tar_stream::stream::Limits;
///
/// let limits = Limits {
///     max_path_len: 1024,
///     ..Default::default()
/// };
/// assert_eq!(limits.max_pending_entries, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum length in bytes of a resolved name or link target.
    ///
    /// Default: 4096 (Linux `PATH_MAX`).
    pub max_path_len: usize,

    /// Maximum declared size of one PAX extended header payload.
    ///
    /// Default: 1 MiB.
    pub max_pax_size: u64,

    /// Maximum declared size of a GNU long name or long link payload.
    ///
    /// Default: 4096.
    pub max_gnu_long_size: u64,

    /// Maximum number of meta-entries read in a row before a real entry.
    ///
    /// Default: 16.
    pub max_pending_entries: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_path_len: 4096,
            max_pax_size: 1024 * 1024,
            max_gnu_long_size: 4096,
            max_pending_entries: 16,
        }
    }
}

impl Limits {
    /// Limits that effectively disable every check, for trusted input.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            max_path_len: usize::MAX,
            max_pax_size: u64::MAX,
            max_gnu_long_size: u64::MAX,
            max_pending_entries: usize::MAX,
        }
    }

    /// Conservative limits for untrusted input.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_path_len: 1024,
            max_pax_size: 64 * 1024,
            max_gnu_long_size: 1024,
            max_pending_entries: 4,
        }
    }
}
