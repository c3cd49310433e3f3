use clap::{ArgAction, Parser};
use mp4info::json_api::JsonValue;
use mp4info::{Field, Mp4Info, ParseOptions, report};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Print tags and stream info of an MP4/M4A file")]
struct Args {
    /// MP4/M4A file path
    path: String,

    /// Output as JSON instead of human-readable text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Log every atom while walking the file (filter with RUST_LOG)
    #[arg(long, action = ArgAction::SetTrue)]
    trace: bool,

    /// Only print these fields (e.g. --field NAM --field BITRATE)
    #[arg(long = "field")]
    fields: Vec<String>,

    /// Give up on files nested deeper than this
    #[arg(long, default_value_t = 64)]
    max_depth: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.trace {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "mp4info=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let path = PathBuf::from(&args.path);
    let options = ParseOptions::default()
        .with_trace(args.trace)
        .with_max_depth(args.max_depth);
    let mp4 = Mp4Info::from_reader_with(BufReader::new(File::open(&path)?), options)?;

    if !args.fields.is_empty() {
        print_fields(&mp4, &args.fields, args.json)?;
    } else if args.json {
        let rep = report(path.display().to_string(), &mp4);
        println!("{}", serde_json::to_string_pretty(&rep)?);
    } else {
        print_human(&path, &mp4);
    }

    Ok(())
}

fn print_fields(mp4: &Mp4Info, names: &[String], json: bool) -> anyhow::Result<()> {
    if json {
        let picked: serde_json::Map<String, serde_json::Value> = names
            .iter()
            .map(|n| {
                let value = lookup_json(mp4, n);
                (n.to_ascii_uppercase(), value)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&picked)?);
        return Ok(());
    }

    for name in names {
        match mp4.field(name) {
            Some(v) => println!("{}: {}", name.to_ascii_uppercase(), v),
            None => println!("{}: -", name.to_ascii_uppercase()),
        }
    }
    Ok(())
}

fn lookup_json(mp4: &Mp4Info, name: &str) -> serde_json::Value {
    let value = match name.parse::<Field>() {
        Ok(Field::Tag(k)) => mp4.tag(k).map(JsonValue::from),
        Ok(Field::Info(k)) => mp4.info(k).map(JsonValue::from),
        Err(()) => None,
    };
    value
        .and_then(|v| serde_json::to_value(v).ok())
        .unwrap_or(serde_json::Value::Null)
}

// ---- human-readable output -----------------------------------------

fn print_human(path: &std::path::Path, mp4: &Mp4Info) {
    println!("File: {}", path.display());

    let tags = mp4.tags();
    if tags.is_empty() {
        println!("Tags: (none)");
    } else {
        println!("Tags:");
        for (key, value) in tags.iter() {
            println!("  {:<24} {}", format!("{} ({}):", key.full_name(), key), value);
        }
    }

    let info = mp4.media_info();
    println!("Stream:");
    if let Some(enc) = &info.encoding {
        println!("  encoding: {}", enc);
    }
    if let Some(freq) = info.frequency {
        println!("  frequency: {} kHz", freq);
    }
    if let Some(time) = &info.time {
        println!("  duration: {}", time);
    }
    if let (Some(mm), Some(ss), Some(ms)) = (info.minutes, info.seconds, info.millis) {
        println!("  length: {}m {}s {}ms", mm, ss, ms);
    }
    if let Some(size) = info.size {
        println!("  media data: {} bytes", size);
    }
    if let Some(kbps) = info.bitrate {
        println!("  bitrate: {} kbps", kbps);
    }
    if info.encrypted {
        println!("  encrypted: yes");
    }
    if info.copyright {
        println!("  copyright: yes");
    }
    match mp4.cover() {
        Some(cover) => println!("  cover art: {} bytes", cover.len()),
        None => println!("  cover art: none"),
    }
}
