use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    process::exit,
    time::Duration,
};

use clap::{error::ErrorKind, Parser};
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};

mod args;
use args::*;

mod entry;
use entry::encode_entry;

mod error;
use error::FormatError;

mod format;
use format::{hash_kernel, probe_signature, verify_kernel, write_format};

mod layout;
use layout::Layout;

mod types;
use types::EntryFlags;

#[derive(Parser)]
#[command(about, version)]
pub struct Args {
    /// Path to the disk image to format
    #[arg(value_name = "disk")]
    disk:     PathBuf,
    /// Path to the kernel image embedded after the filesystem region
    #[arg(value_name = "kernel_image")]
    kernel:   PathBuf,
    /// 128-bit identifier stored in the directory entry
    #[arg(short = 'i', long, default_value_t = 1)]
    entry_id: u128,
    /// Read the written kernel payload back and verify its checksum
    #[arg(short = 'v', long)]
    verify:   bool,
}

// Exit codes:
//   0 success
//   1 invalid usage
//   2 failed to seek past the reserved area
//   3 already formatted and reformat declined
//   4 disk image does not exist
//   5 kernel image does not exist or is empty
//   6 failed to write the kernel payload
//   7 sector count does not fit the 41-bit entry fields
fn exit_code(error: &FormatError) -> i32 {
    match error {
        FormatError::ImageTooSmall { .. } | FormatError::Seek(_) => 2,
        FormatError::EmptyKernel => 5,
        FormatError::Write(_) | FormatError::VerifyMismatch => 6,
        FormatError::SectorOverflow { .. } => 7,
    }
}

fn fail(error: FormatError) -> ! {
    println!("{}: {}", style("formatting failed").red(), error);
    exit(exit_code(&error));
}

fn main() {
    color_backtrace::install();

    let args = Args::try_parse().unwrap_or_else(|error| {
        let _ = error.print();
        exit(match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        });
    });

    let disk_path = get_disk_path(&args.disk);
    let kernel_path = get_kernel_path(&args.kernel);

    println!(
        "{} {}checking {}…",
        style("[1/4]").bold().black(),
        Emoji("🔍 ", ""),
        style(disk_path.display()).blue()
    );
    let mut disk = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&disk_path)
        .unwrap_or_else(|error| {
            println!("{}: {}", style("couldn't open disk image").red(), error);
            exit(2);
        });
    let probe = probe_signature(&mut disk).unwrap_or_else(|error| fail(error));
    if probe.formatted && !confirm_reformat() {
        println!(
            "{}",
            style("keeping the existing filesystem, nothing written").yellow()
        );
        exit(3);
    }

    println!(
        "{} {}reading {}…",
        style("[2/4]").bold().black(),
        Emoji("📦 ", ""),
        style(kernel_path.display()).blue()
    );
    let kernel = fs::read(&kernel_path).unwrap_or_else(|error| {
        println!("{}: {}", style("couldn't read kernel image").red(), error);
        exit(5);
    });

    let layout =
        Layout::plan(probe.size_in_bytes, kernel.len() as u64).unwrap_or_else(|error| fail(error));
    let entry = encode_entry(
        EntryFlags::default(),
        args.entry_id,
        layout.sectors_for_fsystem,
        layout.sectors_combined,
    )
    .unwrap_or_else(|error| fail(error));

    println!(
        "{} {}writing filesystem header and kernel payload…",
        style("[3/4]").bold().black(),
        Emoji("📃 ", "")
    );
    let bar = ProgressBar::new(kernel.len() as u64).with_style(
        ProgressStyle::with_template(
            "{spinner:.green} {elapsed_precise} [{wide_bar:.green}] {bytes}/{total_bytes}",
        )
        .unwrap(),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    write_format(&mut disk, &layout, &entry, &kernel, |written| {
        bar.inc(written)
    })
    .unwrap_or_else(|error| {
        bar.finish_and_clear();
        fail(error)
    });
    bar.finish_and_clear();

    if args.verify {
        println!(
            "{} {}verifying kernel payload…",
            style("[4/4]").bold().black(),
            Emoji("🔎 ", "")
        );
        verify_kernel(&mut disk, &layout, hash_kernel(&kernel))
            .unwrap_or_else(|error| fail(error));
    } else {
        println!(
            "{} {}skipping payload verification",
            style("[4/4]").bold().black(),
            Emoji("🔎 ", "")
        );
    }

    println!(
        "      {}{} {} {}",
        Emoji("✨ ", ""),
        style("formatted").green(),
        style(disk_path.display()).blue(),
        style(format!(
            "({} kernel sectors, {} filesystem sectors, payload at byte {})",
            layout.sectors_for_kernel,
            layout.sectors_for_fsystem,
            layout.kernel_offset()
        ))
        .dim()
    );
}
