//! png-inspect: print the chunk layout and metadata of PNG files
//!
//! Run: `cargo run --features cli --bin png-inspect -- -i image.png [--json]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{error, info, Level};
use png_chunk_meta::{ChunkDecoder, DecoderOptions, Metadata, TextValue, DEFAULT_PREVIEW_LEN};

#[rustfmt::skip]
fn create_cmd_args() -> Command {
    Command::new("png-inspect")
        .about("Inspect PNG chunks and metadata")
        .arg(Arg::new("in")
            .short('i')
            .long("input")
            .help("PNG file to inspect")
            .action(ArgAction::Append)
            .value_parser(value_parser!(PathBuf))
            .required(true))
        .arg(Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print metadata as pretty JSON"))
        .arg(Arg::new("preview-len")
            .long("preview-len")
            .help("Payload bytes shown in each chunk preview")
            .value_parser(value_parser!(usize))
            .default_value("32"))
        .arg(Arg::new("mmap")
            .long("mmap")
            .action(ArgAction::SetTrue)
            .help_heading("ADVANCED")
            .help("Memory-map input files instead of reading them"))
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display debug information and higher"))
        .arg(Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
        .arg(Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display a summary of each decode"))
}

fn setup_logger(args: &ArgMatches) {
    let log_level = if args.get_flag("trace") {
        Level::Trace
    } else if args.get_flag("debug") {
        Level::Debug
    } else if args.get_flag("info") {
        Level::Info
    } else {
        Level::Warn
    };

    if let Err(e) = simple_logger::init_with_level(log_level) {
        eprintln!("Could not initialize logger: {e}");
    }
    info!("Log level: {log_level}");
}

fn print_summary(meta: &Metadata) {
    println!("File: {} ({} bytes)", meta.file_name, meta.file_size);

    match &meta.image_info {
        Some(info) => println!(
            "  Image: {}x{}, {} bit, {}, compression {}, filter {}, interlace {}",
            info.width,
            info.height,
            info.bit_depth,
            info.color_type,
            info.compression_method,
            info.filter_method,
            info.interlace_method
        ),
        None => println!("  Image: no IHDR"),
    }

    match &meta.timestamp {
        Some(ts) => println!("  Modified: {ts}"),
        None => println!("  Modified: unknown"),
    }

    if !meta.text_metadata.is_empty() {
        println!("  Text:");
        for (keyword, value) in &meta.text_metadata {
            match value {
                TextValue::Plain(text) => println!("    {keyword}: {text}"),
                TextValue::International(itxt) => println!(
                    "    {keyword} [{}{}]: {}",
                    itxt.language,
                    if itxt.compressed { ", compressed" } else { "" },
                    itxt.text
                ),
            }
        }
    }

    println!("  Chunks:");
    for (i, chunk) in meta.chunks.iter().enumerate() {
        println!(
            "    [{:3}] {:4} {:10} {}  {}",
            i, chunk.chunk_type, chunk.length, chunk.crc, chunk.preview
        );
    }
}

fn main() -> ExitCode {
    let args = create_cmd_args().get_matches();
    setup_logger(&args);

    let preview_len = args
        .get_one::<usize>("preview-len")
        .copied()
        .unwrap_or(DEFAULT_PREVIEW_LEN);
    let decoder = ChunkDecoder::with_options(DecoderOptions::new().preview_len(preview_len));
    let use_mmap = args.get_flag("mmap");
    let as_json = args.get_flag("json");

    let mut failed = false;
    for path in args.get_many::<PathBuf>("in").into_iter().flatten() {
        let result = if use_mmap {
            decoder.decode_path_mmap(path)
        } else {
            decoder.decode_path(path)
        };

        match result {
            Ok(meta) if as_json => match serde_json::to_string_pretty(&meta) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    error!("{}: could not serialize metadata: {e}", path.display());
                    failed = true;
                }
            },
            Ok(meta) => print_summary(&meta),
            Err(e) => {
                error!("{}: {e}", path.display());
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
