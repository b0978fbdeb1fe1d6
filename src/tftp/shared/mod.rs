use std::convert::TryFrom;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::io;
use std::io::{BufRead, Read, Write};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use log::trace;
use thiserror::Error;

use crate::tftp::shared::ack_packet::AckPacket;
use crate::tftp::shared::data_packet::DataPacket;
use crate::tftp::shared::err_packet::ErrorPacket;
use crate::tftp::shared::netascii::is_netascii_bytes;
use crate::tftp::shared::request_packet::*;

pub mod ack_packet;
pub mod async_codec;
pub mod data_packet;
pub mod err_packet;
pub mod netascii;
pub mod request_packet;

/// Stride size for reading / writing files.
pub const STRIDE_SIZE: usize = 512;
/// Mode for text transfers.
pub const MODE_NETASCII: &str = "netascii";
/// Mode for raw binary transfers.
pub const MODE_OCTET: &str = "octet";

/// The first two bytes of every packet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Opcode {
    /// Op code for Read Request
    RRQ = 0x001,
    /// Op code for Write Request
    WRQ = 0x002,
    /// Op code for Data packet
    DATA = 0x003,
    /// Op code for ACK packet
    ACK = 0x004,
    /// Op code for Error packet
    ERR = 0x005,
}

impl Opcode {
    pub fn name(self) -> &'static str {
        match self {
            Opcode::RRQ => "RRQ",
            Opcode::WRQ => "WRQ",
            Opcode::DATA => "DATA",
            Opcode::ACK => "ACK",
            Opcode::ERR => "ERR",
        }
    }
}

impl From<Opcode> for u16 {
    fn from(op: Opcode) -> Self {
        op as u16
    }
}

impl TryFrom<u16> for Opcode {
    type Error = PacketError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x001 => Ok(Opcode::RRQ),
            0x002 => Ok(Opcode::WRQ),
            0x003 => Ok(Opcode::DATA),
            0x004 => Ok(Opcode::ACK),
            0x005 => Ok(Opcode::ERR),
            val => Err(PacketError::InvalidOpcode(val)),
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TFTPPacket {
    RRQ(ReadRequestPacket),
    WRQ(WriteRequestPacket),
    ACK(AckPacket),
    ERR(ErrorPacket),
    DATA(DataPacket),
}

impl TFTPPacket {
    pub fn op(&self) -> Opcode {
        match self {
            TFTPPacket::RRQ(_) => Opcode::RRQ,
            TFTPPacket::WRQ(_) => Opcode::WRQ,
            TFTPPacket::ACK(_) => Opcode::ACK,
            TFTPPacket::ERR(_) => Opcode::ERR,
            TFTPPacket::DATA(_) => Opcode::DATA,
        }
    }
}

impl Display for TFTPPacket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let desc = match self {
            TFTPPacket::RRQ(p) => format!("RRQ [{}] [{}]", p.filename(), p.mode()),
            TFTPPacket::WRQ(p) => format!("WRQ [{}] [{}]", p.filename(), p.mode()),
            TFTPPacket::ACK(p) => format!("ACK [{}]", p.blk()),
            TFTPPacket::ERR(p) => format!("ERR [{}]: {}", u16::from(p.code()), p.err()),
            TFTPPacket::DATA(p) => format!("DATA [{}]", p.blk()),
        };

        write!(f, "{}", desc)
    }
}

impl Serializable for TFTPPacket {
    fn serialize_into<W: Write>(&self, sink: &mut W) -> Result<(), PacketError> {
        match self {
            TFTPPacket::RRQ(p) => p.serialize_into(sink),
            TFTPPacket::WRQ(p) => p.serialize_into(sink),
            TFTPPacket::ACK(p) => p.serialize_into(sink),
            TFTPPacket::ERR(p) => p.serialize_into(sink),
            TFTPPacket::DATA(p) => p.serialize_into(sink),
        }
    }
}

/// Packets that can be written to a byte sink.
///
/// Preconditions are checked before anything is written, so a packet
/// rejected for its content leaves the sink untouched.
pub trait Serializable {
    fn serialize_into<W: Write>(&self, sink: &mut W) -> Result<(), PacketError>;

    fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf)?;
        Ok(buf)
    }
}

/// Packets that can be parsed from a byte source.
pub trait Deserializable: Sized {
    /// Opcode this packet type expects at the head of its source.
    const OP: Opcode;

    /// Parses everything that follows the opcode.
    fn deserialize_body<R: BufRead>(source: &mut R) -> Result<Self, PacketError>;

    /// Reads the opcode, checks it against [`Self::OP`], then parses the body.
    fn deserialize_from<R: BufRead>(source: &mut R) -> Result<Self, PacketError> {
        expect_opcode(source, Self::OP)?;
        Self::deserialize_body(source)
    }

    fn deserialize(buf: &[u8]) -> Result<Self, PacketError> {
        let mut source = buf;
        Self::deserialize_from(&mut source)
    }
}

/// Decodes a whole datagram, picking the packet type from its opcode.
pub fn parse_udp_packet(buf: &[u8]) -> Result<TFTPPacket, PacketError> {
    let mut head = buf;
    let op = Opcode::try_from(read_op(&mut head)?)?;

    let p = match op {
        Opcode::RRQ => ReadRequestPacket::deserialize(buf).map(TFTPPacket::RRQ),
        Opcode::WRQ => WriteRequestPacket::deserialize(buf).map(TFTPPacket::WRQ),
        Opcode::ACK => AckPacket::deserialize(buf).map(TFTPPacket::ACK),
        Opcode::ERR => ErrorPacket::deserialize(buf).map(TFTPPacket::ERR),
        Opcode::DATA => DataPacket::deserialize(buf).map(TFTPPacket::DATA),
    }?;

    trace!("parsed {} ({} bytes)", p, buf.len());
    Ok(p)
}

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("input is not valid NETASCII")]
    NotNetascii,
    #[error("block number is not valid")]
    InvalidBlockNumber,
    #[error("data packet contains {len} bytes, more than 512")]
    PayloadTooLarge { len: usize },
    #[error("mismatching opcode: expected {expected}, found [{found}]")]
    OpcodeMismatch { expected: Opcode, found: u16 },
    #[error("Invalid opcode [{0}]")]
    InvalidOpcode(u16),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Wraps an I/O failure with a description of the field being processed.
pub(crate) fn io_err(context: &'static str) -> impl FnOnce(io::Error) -> PacketError {
    move |source| PacketError::Io { context, source }
}

pub(crate) fn write_op<W: Write>(sink: &mut W, op: Opcode) -> Result<(), PacketError> {
    sink.write_u16::<NetworkEndian>(op.into())
        .map_err(io_err("can't write opcode"))
}

fn read_op<R: Read>(source: &mut R) -> Result<u16, PacketError> {
    source
        .read_u16::<NetworkEndian>()
        .map_err(io_err("can't read opcode"))
}

/// Consumes exactly the opcode, nothing past it.
pub(crate) fn expect_opcode<R: Read>(source: &mut R, expected: Opcode) -> Result<(), PacketError> {
    let found = read_op(source)?;
    if found != u16::from(expected) {
        return Err(PacketError::OpcodeMismatch { expected, found });
    }

    Ok(())
}

/// Writes `value` followed by its NUL terminator. The caller validates
/// NETASCII before the first byte of the packet goes out.
pub(crate) fn write_netascii_field<W: Write>(
    sink: &mut W,
    value: &str,
    context: &'static str,
    terminator_context: &'static str,
) -> Result<(), PacketError> {
    sink.write_all(value.as_bytes()).map_err(io_err(context))?;
    sink.write_u8(0).map_err(io_err(terminator_context))
}

/// Reads a NUL terminated NETASCII string, stripping the terminator.
pub(crate) fn read_netascii_field<R: BufRead>(
    source: &mut R,
    context: &'static str,
) -> Result<String, PacketError> {
    let mut buf = Vec::new();
    source.read_until(0, &mut buf).map_err(io_err(context))?;

    if buf.pop() != Some(0) {
        return Err(PacketError::Io {
            context,
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "missing NUL terminator"),
        });
    }

    if !is_netascii_bytes(&buf) {
        return Err(PacketError::NotNetascii);
    }

    String::from_utf8(buf).map_err(|_| PacketError::NotNetascii)
}
