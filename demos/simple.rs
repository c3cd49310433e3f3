use std::env;

// Prints the common tags and the playing time of an M4A/MP4 file.
// Usage: cargo run --example simple -- <file>
fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file>", args[0]);
        std::process::exit(1);
    }

    let mp4 = mp4info::Mp4Info::open(&args[1])?;

    println!("title:  {}", mp4.title().unwrap_or_default());
    println!("artist: {}", mp4.artist().unwrap_or_default());
    println!("album:  {}", mp4.album().unwrap_or_default());
    if let Some((n, total)) = mp4.track() {
        println!("track:  {}/{}", n, total);
    }
    if let Some(time) = &mp4.media_info().time {
        println!("time:   {}", time);
    }

    Ok(())
}
