//! Packet I/O for async-std hosts.
//!
//! Each call handles one whole datagram: writes are encoded in memory first
//! and reach the sink in a single `write_all`, reads take the source to its
//! end.

use async_std::io::prelude::*;
use async_std::io::{Read, Write};

use crate::tftp::shared::{io_err, parse_udp_packet, PacketError, Serializable, TFTPPacket};

pub async fn write_packet<W>(packet: &TFTPPacket, sink: &mut W) -> Result<(), PacketError>
where
    W: Write + Unpin,
{
    let buf = packet.serialize()?;
    sink.write_all(&buf)
        .await
        .map_err(io_err("can't write packet"))?;
    sink.flush().await.map_err(io_err("can't flush packet"))
}

pub async fn read_packet<R>(source: &mut R) -> Result<TFTPPacket, PacketError>
where
    R: Read + Unpin,
{
    let mut buf = Vec::new();
    source
        .read_to_end(&mut buf)
        .await
        .map_err(io_err("can't read packet"))?;

    parse_udp_packet(&buf)
}
