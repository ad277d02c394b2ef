//! Packet descriptors.
//!
//! A [`Packet`] references its payload instead of owning a copy: either a
//! range of a shared in-memory buffer, or a range of an open file that the
//! worker hands to the kernel for zero-copy transfer. A [`PacketList`] is the
//! fixed, ordered unit of work posted to a sender.

use std::fs::File;
use std::sync::Arc;

use cadence_errors::PacketError;

/// Where a packet's bytes live.
#[derive(Debug, Clone)]
pub enum PacketSource {
    /// A range of a shared in-memory buffer
    Memory {
        /// Backing buffer
        buffer: Arc<[u8]>,
        /// Start of the range in the buffer
        offset: usize,
    },
    /// A range of an open file
    File {
        /// Open file handle
        file: Arc<File>,
        /// Start of the range in the file
        offset: u64,
    },
}

/// Kind of payload a packet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    /// In-memory bytes
    Memory,
    /// File region
    File,
}

/// One payload reference: a source plus a byte length.
#[derive(Debug, Clone)]
pub struct Packet {
    source: PacketSource,
    len: usize,
}

impl Packet {
    /// Packet covering the whole of `bytes`.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        let buffer = bytes.into();
        let len = buffer.len();
        Self {
            source: PacketSource::Memory { buffer, offset: 0 },
            len,
        }
    }

    /// Packet covering `len` bytes of `buffer` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::OutOfBounds`] if the range does not fit in the
    /// buffer.
    pub fn memory(buffer: Arc<[u8]>, offset: usize, len: usize) -> Result<Self, PacketError> {
        let fits = offset
            .checked_add(len)
            .is_some_and(|end| end <= buffer.len());
        if !fits {
            return Err(PacketError::OutOfBounds {
                offset,
                size: len,
                len: buffer.len(),
            });
        }
        Ok(Self {
            source: PacketSource::Memory { buffer, offset },
            len,
        })
    }

    /// Packet covering `len` bytes of `file` starting at `offset`.
    ///
    /// The range is checked by the kernel at transfer time: a file shorter
    /// than the range fails the send.
    #[must_use]
    pub fn file(file: Arc<File>, offset: u64, len: usize) -> Self {
        Self {
            source: PacketSource::File { file, offset },
            len,
        }
    }

    /// Where the bytes live.
    #[must_use]
    pub fn source(&self) -> &PacketSource {
        &self.source
    }

    /// Payload kind.
    #[must_use]
    pub fn kind(&self) -> PacketKind {
        match self.source {
            PacketSource::Memory { .. } => PacketKind::Memory,
            PacketSource::File { .. } => PacketKind::File,
        }
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The payload bytes of a memory packet, `None` for file packets.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.source {
            PacketSource::Memory { buffer, offset } => {
                buffer.get(*offset..offset.saturating_add(self.len))
            }
            PacketSource::File { .. } => None,
        }
    }
}

/// Ordered, fixed-size sequence of packets sent back-to-back.
#[derive(Debug, Clone, Default)]
pub struct PacketList {
    packets: Box<[Packet]>,
}

impl PacketList {
    /// Build a list from packets in send order.
    #[must_use]
    pub fn new(packets: Vec<Packet>) -> Self {
        Self {
            packets: packets.into_boxed_slice(),
        }
    }

    /// An empty list.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of packets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Whether the list has no packets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Packets in send order.
    pub fn iter(&self) -> std::slice::Iter<'_, Packet> {
        self.packets.iter()
    }

    /// Sum of all packet lengths.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.packets
            .iter()
            .fold(0usize, |acc, packet| acc.saturating_add(packet.len()))
    }
}

impl From<Vec<Packet>> for PacketList {
    fn from(packets: Vec<Packet>) -> Self {
        Self::new(packets)
    }
}

impl From<Packet> for PacketList {
    fn from(packet: Packet) -> Self {
        Self::new(vec![packet])
    }
}

impl FromIterator<Packet> for PacketList {
    fn from_iter<I: IntoIterator<Item = Packet>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PacketList {
    type Item = &'a Packet;
    type IntoIter = std::slice::Iter<'a, Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
