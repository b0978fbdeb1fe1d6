//! ERROR packet can be the acknowledgment of any other type of packet.
//! The error code is an integer indicating the nature of the error.  A
//! table of values and meanings is given in the appendix.  (Note that
//! several error codes have been added to this version of this
//! document.) The error message is intended for human consumption, and
//! should be in netascii.  Like all other strings, it is terminated with
//! a zero byte.

use std::io::{BufRead, Write};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};

use crate::tftp::shared::netascii::is_netascii;
use crate::tftp::shared::{
    io_err, read_netascii_field, write_netascii_field, write_op, Deserializable, Opcode,
    PacketError, Serializable,
};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ErrorCode {
    UndefinedError,
    FileNotFound,
    AccessViolation,
    DiskFull,
    IllegalOperation,
    UnknownTID,
    FileExists,
    NoSuchUser,
    /// Codes past 7 are kept as they came off the wire.
    Unknown(u16),
}

impl ErrorCode {
    /// Message from the RFC 1350 appendix, or a generic one for unknown codes.
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::UndefinedError => "Not defined, see error message (if any).",
            ErrorCode::FileNotFound => "File not found.",
            ErrorCode::AccessViolation => "Access violation.",
            ErrorCode::DiskFull => "Disk full or allocation exceeded.",
            ErrorCode::IllegalOperation => "Illegal TFTP operation.",
            ErrorCode::UnknownTID => "Unknown transfer ID.",
            ErrorCode::FileExists => "File already exists.",
            ErrorCode::NoSuchUser => "No such user.",
            ErrorCode::Unknown(_) => "Unknown error.",
        }
    }
}

impl From<u16> for ErrorCode {
    fn from(code: u16) -> Self {
        match code {
            0 => ErrorCode::UndefinedError,
            1 => ErrorCode::FileNotFound,
            2 => ErrorCode::AccessViolation,
            3 => ErrorCode::DiskFull,
            4 => ErrorCode::IllegalOperation,
            5 => ErrorCode::UnknownTID,
            6 => ErrorCode::FileExists,
            7 => ErrorCode::NoSuchUser,
            code => ErrorCode::Unknown(code),
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::UndefinedError => 0,
            ErrorCode::FileNotFound => 1,
            ErrorCode::AccessViolation => 2,
            ErrorCode::DiskFull => 3,
            ErrorCode::IllegalOperation => 4,
            ErrorCode::UnknownTID => 5,
            ErrorCode::FileExists => 6,
            ErrorCode::NoSuchUser => 7,
            ErrorCode::Unknown(code) => code,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ErrorPacket {
    code: ErrorCode,
    err: String,
}

impl ErrorPacket {
    pub fn new(code: ErrorCode, msg: &str) -> Self {
        ErrorPacket {
            code,
            err: msg.to_string(),
        }
    }

    /// Error packet carrying the standard message for `code`.
    pub fn from_code(code: ErrorCode) -> Self {
        ErrorPacket::new(code, code.default_message())
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn err(&self) -> &str {
        &self.err
    }
}

impl Serializable for ErrorPacket {
    fn serialize_into<W: Write>(&self, sink: &mut W) -> Result<(), PacketError> {
        if !is_netascii(&self.err) {
            return Err(PacketError::NotNetascii);
        }

        write_op(sink, Opcode::ERR)?;
        sink.write_u16::<NetworkEndian>(self.code.into())
            .map_err(io_err("can't write error code"))?;
        write_netascii_field(
            sink,
            &self.err,
            "can't write error message",
            "can't write error message NUL terminator",
        )
    }
}

impl Deserializable for ErrorPacket {
    const OP: Opcode = Opcode::ERR;

    fn deserialize_body<R: BufRead>(source: &mut R) -> Result<Self, PacketError> {
        let code = source
            .read_u16::<NetworkEndian>()
            .map_err(io_err("can't read error code"))?;
        let err = read_netascii_field(source, "can't read error message")?;

        Ok(ErrorPacket {
            code: ErrorCode::from(code),
            err,
        })
    }
}
