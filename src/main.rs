use clap::{Args, Parser, Subcommand};
use log::debug;
use pretty_bytes::converter::convert;
use thiserror::Error;

use tftpeer_codec::tftp::shared::ack_packet::AckPacket;
use tftpeer_codec::tftp::shared::data_packet::DataPacket;
use tftpeer_codec::tftp::shared::err_packet::{ErrorCode, ErrorPacket};
use tftpeer_codec::tftp::shared::request_packet::{ReadRequestPacket, WriteRequestPacket};
use tftpeer_codec::tftp::shared::{
    parse_udp_packet, PacketError, Serializable, TFTPPacket, MODE_OCTET,
};

/// Encodes and decodes RFC 1350 TFTP packets.
#[derive(Parser, Debug)]
#[command(version = "1.0", author = "shakram02")]
struct Opts {
    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// encode a TFTP packet and print it as hex.
    #[command(subcommand)]
    Encode(EncodeCommand),
    /// decode a hex encoded TFTP packet.
    Decode(DecodeArgs),
}

#[derive(Subcommand, Debug)]
enum EncodeCommand {
    /// read request.
    Rrq(RequestArgs),
    /// write request.
    Wrq(RequestArgs),
    /// data block.
    Data {
        /// block number, starting from 1.
        block: u16,
        /// block payload, at most 512 bytes.
        #[arg(default_value = "")]
        payload: String,
    },
    /// acknowledgement.
    Ack {
        /// acknowledged block number.
        block: u16,
    },
    /// error.
    Error {
        /// error code, 0 through 7.
        code: u16,
        /// message, defaults to the standard one for the code.
        message: Option<String>,
    },
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// name of the requested file.
    filename: String,
    /// transfer mode.
    #[arg(short = 'm', long = "mode", default_value = MODE_OCTET)]
    mode: String,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// packet bytes as hex, whitespace is ignored.
    packet: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("packet is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Packet(#[from] PacketError),
}

fn build_packet(cmd: EncodeCommand) -> TFTPPacket {
    match cmd {
        EncodeCommand::Rrq(args) => {
            TFTPPacket::RRQ(ReadRequestPacket::new(&args.filename, &args.mode))
        }
        EncodeCommand::Wrq(args) => {
            TFTPPacket::WRQ(WriteRequestPacket::new(&args.filename, &args.mode))
        }
        EncodeCommand::Data { block, payload } => {
            TFTPPacket::DATA(DataPacket::new(block, payload.into_bytes()))
        }
        EncodeCommand::Ack { block } => TFTPPacket::ACK(AckPacket::new(block)),
        EncodeCommand::Error { code, message } => {
            let code = ErrorCode::from(code);
            let p = match message {
                Some(msg) => ErrorPacket::new(code, &msg),
                None => ErrorPacket::from_code(code),
            };
            TFTPPacket::ERR(p)
        }
    }
}

fn encode(cmd: EncodeCommand) -> Result<String, CliError> {
    let packet = build_packet(cmd);
    debug!("encoding {}", packet);

    let bytes = packet.serialize()?;
    Ok(hex::encode(bytes))
}

fn decode(args: DecodeArgs) -> Result<String, CliError> {
    let digits: String = args.packet.split_whitespace().collect();
    let bytes = hex::decode(digits)?;
    debug!("decoding {} bytes", bytes.len());

    let packet = parse_udp_packet(&bytes)?;
    Ok(format!("{} ({})", packet, convert(bytes.len() as f64)))
}

fn main() {
    env_logger::init();

    let opts: Opts = Opts::parse();
    let out = match opts.subcmd {
        SubCommand::Encode(cmd) => encode(cmd),
        SubCommand::Decode(args) => decode(args),
    };

    match out {
        Ok(line) => println!("{}", line),
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{decode, encode, CliError, DecodeArgs, EncodeCommand, Opts, SubCommand};

    fn parse(args: &[&str]) -> SubCommand {
        Opts::try_parse_from(args).unwrap().subcmd
    }

    #[test]
    fn encode_rrq_defaults_to_octet() {
        let cmd = match parse(&["tftpeer", "encode", "rrq", "/hello.txt"]) {
            SubCommand::Encode(cmd) => cmd,
            c => panic!("unexpected command {:?}", c),
        };

        assert_eq!(
            encode(cmd).unwrap(),
            "00012f68656c6c6f2e747874006f6374657400"
        );
    }

    #[test]
    fn encode_ack() {
        let out = encode(EncodeCommand::Ack { block: 42 }).unwrap();
        assert_eq!(out, "0004002a");
    }

    #[test]
    fn encode_rejects_block_zero() {
        let err = encode(EncodeCommand::Data {
            block: 0,
            payload: String::from("Bogus"),
        })
        .unwrap_err();
        assert!(matches!(err, CliError::Packet(_)));
    }

    #[test]
    fn decode_hex_with_spaces() {
        let out = decode(DecodeArgs {
            packet: String::from("00 04 00 2A"),
        })
        .unwrap();
        assert!(out.starts_with("ACK [42]"));
    }

    #[test]
    fn decode_rejects_bad_hex() {
        let err = decode(DecodeArgs {
            packet: String::from("zz"),
        })
        .unwrap_err();
        assert!(matches!(err, CliError::Hex(_)));
    }
}
