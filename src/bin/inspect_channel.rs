use anyhow::Result;
use gait_decoder::data_loading::read_channel_file;
use std::path::Path;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        println!("Usage: {} <channel_file>", args[0]);
        std::process::exit(1);
    }

    let matrix = read_channel_file(Path::new(&args[1]))?;

    println!("\nShape: {} rows x {} columns", matrix.nrows(), matrix.ncols());
    println!("\nFirst few rows:");
    for row in matrix.rows().into_iter().take(5) {
        println!("  {:?}", row.to_vec());
    }

    Ok(())
}
