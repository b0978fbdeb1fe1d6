use std::io::{BufRead, Read, Write};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};

use crate::tftp::shared::{
    io_err, write_op, Deserializable, Opcode, PacketError, Serializable, STRIDE_SIZE,
};

const DATA_MAX_LEN: usize = STRIDE_SIZE;

/// DATA carries one block of a transfer. Block numbers start at 1, and a
/// block shorter than 512 bytes ends the transfer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DataPacket {
    blk: u16,
    data: Vec<u8>,
}

impl DataPacket {
    pub fn new(blk: u16, data: Vec<u8>) -> Self {
        DataPacket { blk, data }
    }

    pub fn blk(&self) -> u16 {
        self.blk
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// True for the final block of a transfer.
    pub fn is_last(&self) -> bool {
        self.data_length() < DATA_MAX_LEN
    }

    fn data_length(&self) -> usize {
        self.data.len()
    }
}

impl Serializable for DataPacket {
    fn serialize_into<W: Write>(&self, sink: &mut W) -> Result<(), PacketError> {
        if self.blk == 0 {
            return Err(PacketError::InvalidBlockNumber);
        }

        if self.data_length() > DATA_MAX_LEN {
            return Err(PacketError::PayloadTooLarge {
                len: self.data_length(),
            });
        }

        write_op(sink, Opcode::DATA)?;
        sink.write_u16::<NetworkEndian>(self.blk)
            .map_err(io_err("can't write block number"))?;
        sink.write_all(&self.data).map_err(io_err("can't write data"))
    }
}

impl Deserializable for DataPacket {
    const OP: Opcode = Opcode::DATA;

    fn deserialize_body<R: BufRead>(source: &mut R) -> Result<Self, PacketError> {
        let blk = source
            .read_u16::<NetworkEndian>()
            .map_err(io_err("can't read block number"))?;

        if blk == 0 {
            return Err(PacketError::InvalidBlockNumber);
        }

        // The datagram boundary ends the payload. Reading one byte past the
        // limit is enough to tell an oversized block apart.
        let mut data = Vec::with_capacity(DATA_MAX_LEN);
        source
            .take(DATA_MAX_LEN as u64 + 1)
            .read_to_end(&mut data)
            .map_err(io_err("can't read data"))?;

        if data.len() > DATA_MAX_LEN {
            return Err(PacketError::PayloadTooLarge { len: data.len() });
        }

        Ok(DataPacket::new(blk, data))
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{NetworkEndian, WriteBytesExt};

    use crate::tftp::shared::data_packet::{DataPacket, DATA_MAX_LEN};
    use crate::tftp::shared::{Deserializable, Opcode, PacketError, Serializable};

    #[test]
    fn serialize_empty_data_packet() {
        let p = DataPacket::new(1, Vec::new());
        assert_eq!(p.serialize().unwrap(), vec![0x00, 0x03, 0x00, 0x01]);
    }

    #[test]
    fn serialize_data_packet() {
        let payload = b"Hello, world!".to_vec();
        let p = DataPacket::new(1, payload.clone());

        let mut buf: Vec<u8> = Vec::new();
        buf.write_u16::<NetworkEndian>(Opcode::DATA.into()).unwrap();
        buf.write_u16::<NetworkEndian>(1).unwrap();
        buf.extend_from_slice(&payload);

        assert_eq!(p.serialize().unwrap(), buf);
    }

    #[test]
    fn serialize_full_block() {
        let p = DataPacket::new(0xFFFF, vec![0xAB; DATA_MAX_LEN]);
        let bytes = p.serialize().unwrap();
        assert_eq!(bytes.len(), 4 + DATA_MAX_LEN);
        assert_eq!(&bytes[..4], &[0x00, 0x03, 0xFF, 0xFF]);
    }

    #[test]
    fn serialize_block_zero() {
        let p = DataPacket::new(0, b"Bogus".to_vec());
        let mut buf = Vec::new();

        assert!(matches!(
            p.serialize_into(&mut buf),
            Err(PacketError::InvalidBlockNumber)
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn serialize_too_much_data() {
        let p = DataPacket::new(42, vec![b'X'; DATA_MAX_LEN + 1]);
        let mut buf = Vec::new();

        assert!(matches!(
            p.serialize_into(&mut buf),
            Err(PacketError::PayloadTooLarge { len: 513 })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn block_number_checked_before_length() {
        let p = DataPacket::new(0, vec![b'X'; DATA_MAX_LEN + 1]);
        assert!(matches!(p.serialize(), Err(PacketError::InvalidBlockNumber)));
    }

    #[test]
    fn deserialize_data_packet() {
        let p = DataPacket::deserialize(b"\x00\x03\x00\x01Hello, world!").unwrap();
        assert_eq!(p.blk(), 1);
        assert_eq!(p.data(), b"Hello, world!");
        assert!(p.is_last());
    }

    #[test]
    fn deserialize_empty_data_packet() {
        let p = DataPacket::deserialize(b"\x00\x03\x00\x02").unwrap();
        assert_eq!(p, DataPacket::new(2, Vec::new()));
    }

    #[test]
    fn deserialize_bad_op() {
        let err = DataPacket::deserialize(b"\x00\x04\x00\x01Hello, world!").unwrap_err();
        assert!(matches!(
            err,
            PacketError::OpcodeMismatch {
                expected: Opcode::DATA,
                found: 4
            }
        ));
    }

    #[test]
    fn deserialize_block_zero() {
        let err = DataPacket::deserialize(b"\x00\x03\x00\x00Hello, world!").unwrap_err();
        assert!(matches!(err, PacketError::InvalidBlockNumber));
    }

    #[test]
    fn deserialize_missing_block_number() {
        let err = DataPacket::deserialize(b"\x00\x03\x00").unwrap_err();
        assert!(matches!(
            err,
            PacketError::Io {
                context: "can't read block number",
                ..
            }
        ));
    }

    #[test]
    fn deserialize_too_much_data() {
        let mut buf = vec![0x00, 0x03, 0x00, 0x05];
        buf.extend(vec![b'X'; DATA_MAX_LEN + 10]);

        let err = DataPacket::deserialize(&buf).unwrap_err();
        assert!(matches!(err, PacketError::PayloadTooLarge { .. }));
    }

    #[test]
    fn full_block_is_not_last() {
        let p = DataPacket::new(3, vec![0; DATA_MAX_LEN]);
        assert!(!p.is_last());

        let bytes = p.clone().serialize().unwrap();
        let d = DataPacket::deserialize(&bytes).unwrap();
        assert_eq!(d, p);
        assert_eq!(d.into_data().len(), DATA_MAX_LEN);
    }
}
