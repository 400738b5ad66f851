//! `grpcweb` command line tool.
//!
//! `encode` frames a serialized message the way a request body is framed;
//! `decode` lists the frames of a captured response body and the status its
//! trailer carries.

mod cli;

use std::{
    error::Error,
    fs,
    io::{self, Write},
};

use clap::Parser;
use cli::{Cli, Command};
use grpcweb::{
    codec::{Frame, TextDecoder, decode_all, encode_frame_into, encode_text},
    metadata::parse_header_block,
    status::Status,
};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::Encode { text, file } => {
            let payload = fs::read(&file)?;
            let mut framed = bytes::BytesMut::new();
            encode_frame_into(&payload, &mut framed)?;
            if text {
                writeln!(stdout, "{}", encode_text(&framed))?;
            } else {
                stdout.write_all(&framed)?;
            }
        }
        Command::Decode { text, file } => {
            let raw = fs::read(&file)?;
            let body = if text {
                let trimmed: Vec<u8> = raw.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
                let mut decoder = TextDecoder::new();
                let decoded = decoder.feed(&trimmed)?;
                if decoder.pending_len() != 0 {
                    tracing::warn!(
                        pending = decoder.pending_len(),
                        "ignoring incomplete base64 quantum at end of input"
                    );
                }
                decoded
            } else {
                raw
            };
            for (index, frame) in decode_all(&body)?.into_iter().enumerate() {
                describe(&mut stdout, index, &frame)?;
            }
        }
    }
    Ok(())
}

fn describe(out: &mut impl Write, index: usize, frame: &Frame) -> io::Result<()> {
    match frame {
        Frame::Data(payload) => writeln!(out, "#{index} data {} bytes", payload.len()),
        Frame::Trailer(payload) => {
            let status = Status::from_trailers(parse_header_block(payload));
            writeln!(out, "#{index} trailer {status}")
        }
    }
}
