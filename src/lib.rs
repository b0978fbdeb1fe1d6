//! RFC 1350 packet codec for the five base TFTP packets.
//!
//! Every packet can be written to any [`std::io::Write`] sink and read back
//! from any [`std::io::BufRead`] source:
//!
//! ```
//! use tftpeer_codec::tftp::shared::ack_packet::AckPacket;
//! use tftpeer_codec::tftp::shared::{Deserializable, Serializable};
//!
//! let bytes = AckPacket::new(42).serialize().unwrap();
//! assert_eq!(bytes, vec![0x00, 0x04, 0x00, 0x2A]);
//! assert_eq!(AckPacket::deserialize(&bytes).unwrap().blk(), 42);
//! ```

pub mod tftp;
