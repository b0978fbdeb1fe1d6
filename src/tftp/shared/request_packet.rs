use std::io::{BufRead, Write};

use crate::tftp::shared::netascii::is_netascii;
use crate::tftp::shared::{
    read_netascii_field, write_netascii_field, write_op, Deserializable, Opcode, PacketError,
    Serializable,
};

pub trait Request: Serializable + Deserializable {
    fn op(&self) -> Opcode;
    fn request(&self) -> &RequestPacket;

    fn filename(&self) -> &str {
        self.request().filename()
    }

    fn mode(&self) -> &str {
        self.request().mode()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReadRequestPacket {
    req: RequestPacket,
}

impl ReadRequestPacket {
    pub fn new(filename: &str, mode: &str) -> ReadRequestPacket {
        ReadRequestPacket {
            req: RequestPacket::new(filename, mode),
        }
    }
}

impl Request for ReadRequestPacket {
    fn op(&self) -> Opcode {
        Opcode::RRQ
    }

    fn request(&self) -> &RequestPacket {
        &self.req
    }
}

impl Serializable for ReadRequestPacket {
    fn serialize_into<W: Write>(&self, sink: &mut W) -> Result<(), PacketError> {
        self.req.serialize_with_op(Opcode::RRQ, sink)
    }
}

impl Deserializable for ReadRequestPacket {
    const OP: Opcode = Opcode::RRQ;

    fn deserialize_body<R: BufRead>(source: &mut R) -> Result<Self, PacketError> {
        let req = RequestPacket::deserialize_body(source)?;
        Ok(ReadRequestPacket { req })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WriteRequestPacket {
    req: RequestPacket,
}

impl WriteRequestPacket {
    pub fn new(filename: &str, mode: &str) -> WriteRequestPacket {
        WriteRequestPacket {
            req: RequestPacket::new(filename, mode),
        }
    }
}

impl Request for WriteRequestPacket {
    fn op(&self) -> Opcode {
        Opcode::WRQ
    }

    fn request(&self) -> &RequestPacket {
        &self.req
    }
}

impl Serializable for WriteRequestPacket {
    fn serialize_into<W: Write>(&self, sink: &mut W) -> Result<(), PacketError> {
        self.req.serialize_with_op(Opcode::WRQ, sink)
    }
}

impl Deserializable for WriteRequestPacket {
    const OP: Opcode = Opcode::WRQ;

    fn deserialize_body<R: BufRead>(source: &mut R) -> Result<Self, PacketError> {
        let req = RequestPacket::deserialize_body(source)?;
        Ok(WriteRequestPacket { req })
    }
}

/// Fields shared by RRQ and WRQ. The mode is carried as given; only its
/// encoding is checked.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RequestPacket {
    filename: String,
    mode: String,
}

impl RequestPacket {
    fn new(filename: &str, mode: &str) -> Self {
        RequestPacket {
            filename: String::from(filename),
            mode: String::from(mode),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    fn serialize_with_op<W: Write>(&self, op: Opcode, sink: &mut W) -> Result<(), PacketError> {
        if !is_netascii(&self.filename) || !is_netascii(&self.mode) {
            return Err(PacketError::NotNetascii);
        }

        write_op(sink, op)?;
        write_netascii_field(
            sink,
            &self.filename,
            "can't write filename",
            "can't write filename NUL terminator",
        )?;
        write_netascii_field(
            sink,
            &self.mode,
            "can't write mode",
            "can't write mode NUL terminator",
        )
    }

    fn deserialize_body<R: BufRead>(source: &mut R) -> Result<Self, PacketError> {
        let filename = read_netascii_field(source, "can't read filename")?;
        let mode = read_netascii_field(source, "can't read mode")?;

        Ok(RequestPacket { filename, mode })
    }
}
