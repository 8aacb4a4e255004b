// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::io;
use std::process::exit;

use clap::Parser;

use uatrie::binary::{DatasetFooter, DatasetHeader};
use uatrie::{detect, Dataset};

mod cli;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Inspect { file } => run_inspect(&file),
        Commands::Detect { file, ua, json } => run_detect(&file, &ua, json),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        exit(1);
    }
}

fn run_inspect(file: &str) -> io::Result<()> {
    let bytes = fs::read(file)?;
    let header = DatasetHeader::read(&mut bytes.as_slice())?;
    let offsets = header.section_offsets();

    println!("{}", file);
    println!("  version:             {}", header.version);
    println!("  nodes:               {}", header.node_count);
    println!("  max subject length:  {}", header.max_subject_length);
    println!();
    println!("  section      start      end       bytes");
    for (name, (start, end)) in [
        ("STRINGS", offsets.strings),
        ("ROOT_NODES", offsets.root_nodes),
        ("NODES", offsets.nodes),
        ("FOOTER", offsets.footer),
    ] {
        println!("  {:<12} {:<10} {:<9} {}", name, start, end, end - start);
    }

    if offsets.total_size() != bytes.len() {
        println!();
        println!(
            "  WARNING: header declares {} bytes, file has {}",
            offsets.total_size(),
            bytes.len()
        );
    } else {
        let footer = DatasetFooter::read(&bytes)?;
        let crc = DatasetFooter::compute_crc32(&bytes[..offsets.content_size()]);
        let status = if crc == footer.crc32 { "ok" } else { "MISMATCH" };
        println!();
        println!("  crc32: {:08x} ({})", footer.crc32, status);
    }
    Ok(())
}

fn run_detect(file: &str, ua: &str, json: bool) -> io::Result<()> {
    let dataset = Dataset::from_file(file)?;
    let detection = detect(&dataset, ua.as_bytes());

    if json {
        let rendered = serde_json::to_string_pretty(&detection)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("method:          {:?}", detection.method);
    println!("difference:      {}", detection.difference);
    println!("nodes evaluated: {}", detection.nodes_evaluated);
    println!("strings read:    {}", detection.strings_read);
    println!();
    println!("  {}", ua);
    println!("  {}", detection.matched.trim_end());
    println!();
    for &offset in &detection.node_offsets {
        let node = dataset.node_at(offset);
        println!(
            "  node {:<8} position {:<5} length {:<4} {:?}",
            offset.get(),
            node.position(),
            node.length(),
            String::from_utf8_lossy(node.characters()),
        );
    }
    Ok(())
}
