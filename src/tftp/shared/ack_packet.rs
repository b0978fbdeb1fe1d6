//! ACK packets are acknowledged by  DATA  or ERROR packets.
//! the opcode is 4.
//!
//! The  block  number  in an  ACK echoes
//! the block number of the DATA packet being acknowledged.
//!
//! A WRQ is acknowledged with an ACK packet having a
//! block number of zero.

use std::io::{BufRead, Write};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};

use crate::tftp::shared::{io_err, write_op, Deserializable, Opcode, PacketError, Serializable};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AckPacket {
    blk: u16,
}

impl AckPacket {
    pub fn new(blk: u16) -> Self {
        AckPacket { blk }
    }

    pub fn blk(&self) -> u16 {
        self.blk
    }
}

impl Serializable for AckPacket {
    fn serialize_into<W: Write>(&self, sink: &mut W) -> Result<(), PacketError> {
        write_op(sink, Opcode::ACK)?;
        sink.write_u16::<NetworkEndian>(self.blk)
            .map_err(io_err("can't write block number"))
    }
}

impl Deserializable for AckPacket {
    const OP: Opcode = Opcode::ACK;

    fn deserialize_body<R: BufRead>(source: &mut R) -> Result<Self, PacketError> {
        // Zero is legal here, it acknowledges a WRQ.
        let blk = source
            .read_u16::<NetworkEndian>()
            .map_err(io_err("can't read block number"))?;

        Ok(AckPacket::new(blk))
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{NetworkEndian, WriteBytesExt};

    use crate::tftp::shared::ack_packet::AckPacket;
    use crate::tftp::shared::{Deserializable, Opcode, PacketError, Serializable};

    #[test]
    fn serialize_ack_packet() {
        let blk = 42;
        let p = AckPacket::new(blk);

        let mut buf: Vec<u8> = Vec::new();
        buf.write_u16::<NetworkEndian>(Opcode::ACK.into()).unwrap();
        buf.write_u16::<NetworkEndian>(blk).unwrap();

        assert_eq!(p.serialize().unwrap(), buf);
        assert_eq!(buf, vec![0x00, 0x04, 0x00, 0x2A]);
    }

    #[test]
    fn deserialize_ack_packet() {
        let p = AckPacket::deserialize(&[0x00, 0x04, 0x00, 0x3F]).unwrap();
        assert_eq!(p.blk(), 0x3F);
    }

    #[test]
    fn block_zero_is_legal() {
        let p = AckPacket::new(0);
        let bytes = p.serialize().unwrap();
        assert_eq!(bytes, vec![0x00, 0x04, 0x00, 0x00]);
        assert_eq!(AckPacket::deserialize(&bytes).unwrap(), p);
    }

    #[test]
    fn deserialize_error() {
        let blk = 42;
        let bad_op = u16::from(Opcode::ACK) + 1;
        let mut buf: Vec<u8> = Vec::new();
        buf.write_u16::<NetworkEndian>(bad_op).unwrap();
        buf.write_u16::<NetworkEndian>(blk).unwrap();

        let err = AckPacket::deserialize(&buf).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("mismatching opcode: expected ACK, found [{}]", bad_op)
        );
    }

    #[test]
    fn deserialize_truncated() {
        let err = AckPacket::deserialize(&[0x00, 0x04, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            PacketError::Io {
                context: "can't read block number",
                ..
            }
        ));
    }
}
