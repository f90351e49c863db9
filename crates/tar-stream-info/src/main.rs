//! tar-stream-info - Inspect tar archives.
//!
//! Lists entries, extracts single members to stdout and detects the tar
//! dialect of files, all through the streaming reader.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;

use tar_stream::stream::{OrphanPolicy, ReaderOptions, TarStreamReader};
use tar_stream::{
    detect, BlockReader, EntryType, NameEncoding, TarEntry, DEFAULT_BLOCK_SIZE,
    DEFAULT_RECORD_SIZE, HEADER_SIZE,
};

/// Inspect tar archives.
#[derive(Parser, Debug)]
#[command(name = "tar-stream-info", version, about)]
struct Cli {
    /// Bytes read from the archive at a time.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Size of one physical record.
    #[arg(long, default_value_t = DEFAULT_RECORD_SIZE)]
    record_size: usize,

    /// Character set of names stored in headers.
    #[arg(long, value_enum, default_value_t = Encoding::Utf8)]
    encoding: Encoding,

    /// Fail on metadata entries cut off by the end of the archive.
    #[arg(long)]
    strict: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List the entries of archives.
    List {
        /// Show type, mode, owner, size and modification time.
        #[arg(long, short)]
        long: bool,

        /// Archives to list.
        archives: Vec<PathBuf>,
    },

    /// Write the payload of one entry to stdout.
    Cat {
        /// Archive to read.
        archive: PathBuf,

        /// Name of the entry.
        name: String,
    },

    /// Print the tar dialect of files.
    Detect {
        /// Files to inspect.
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Command::List { long, archives } => cmd_list(&cli, archives, *long),
        Command::Cat { archive, name } => cmd_cat(&cli, archive, name),
        Command::Detect { files } => cmd_detect(files),
    }
}

impl Cli {
    fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            block_size: self.block_size,
            record_size: self.record_size,
            encoding: match self.encoding {
                Encoding::Utf8 => NameEncoding::Utf8,
                Encoding::Latin1 => NameEncoding::Latin1,
            },
            orphaned_metadata: if self.strict {
                OrphanPolicy::Error
            } else {
                OrphanPolicy::EndOfArchive
            },
            ..Default::default()
        }
    }

    fn open(&self, path: &Path) -> Result<TarStreamReader<BlockReader<File>>> {
        let file = File::open(path).with_context(|| format!("Opening {}", path.display()))?;
        debug!("reading {}", path.display());
        TarStreamReader::with_options(file, self.reader_options())
            .with_context(|| format!("Configuring reader for {}", path.display()))
    }
}

/// Single-character type marker, as in `ls -l`.
fn type_char(entry: &TarEntry) -> char {
    match entry.entry_type {
        _ if entry.is_dir() => 'd',
        EntryType::Symlink => 'l',
        EntryType::Link => 'h',
        EntryType::Char => 'c',
        EntryType::Block => 'b',
        EntryType::Fifo => 'p',
        EntryType::GnuSparse => 'S',
        _ => '-',
    }
}

fn mode_string(mode: u32) -> String {
    const BITS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    BITS.iter()
        .map(|&(bit, c)| if mode & bit != 0 { c } else { '-' })
        .collect()
}

fn owner(name: &str, id: u64) -> String {
    if name.is_empty() {
        id.to_string()
    } else {
        name.to_owned()
    }
}

fn write_entry<W: Write>(out: &mut W, entry: &TarEntry, long: bool) -> io::Result<()> {
    if long {
        write!(
            out,
            "{}{} {}/{} {:>10} {:>12} ",
            type_char(entry),
            mode_string(entry.mode),
            owner(&entry.user_name, entry.uid),
            owner(&entry.group_name, entry.gid),
            entry.size,
            entry.mtime_ms.div_euclid(1000),
        )?;
    }
    write!(out, "{}", entry.name)?;
    if entry.is_symlink() {
        write!(out, " -> {}", entry.link_name)?;
    } else if entry.is_hard_link() {
        write!(out, " link to {}", entry.link_name)?;
    }
    writeln!(out)
}

fn cmd_list(cli: &Cli, archives: &[PathBuf], long: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for path in archives {
        let mut reader = cli.open(path)?;
        while let Some(entry) = reader
            .next_entry()
            .with_context(|| format!("Reading {}", path.display()))?
        {
            write_entry(&mut out, &entry, long)?;
        }
    }
    Ok(())
}

fn cmd_cat(cli: &Cli, archive: &Path, name: &str) -> Result<()> {
    let mut reader = cli.open(archive)?;

    while let Some(entry) = reader
        .next_entry()
        .with_context(|| format!("Reading {}", archive.display()))?
    {
        if entry.name != name {
            continue;
        }
        if !reader.can_read_entry_data(&entry) {
            bail!("{name}: sparse entries are not supported");
        }
        let stdout = io::stdout();
        let mut out = stdout.lock();
        io::copy(&mut reader, &mut out).with_context(|| format!("Extracting {name}"))?;
        out.flush()?;
        return Ok(());
    }

    bail!("{name}: not found in {}", archive.display())
}

fn cmd_detect(files: &[PathBuf]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for path in files {
        let file = File::open(path).with_context(|| format!("Opening {}", path.display()))?;
        let mut record = Vec::with_capacity(HEADER_SIZE);
        file.take(HEADER_SIZE as u64)
            .read_to_end(&mut record)
            .with_context(|| format!("Reading {}", path.display()))?;

        match detect(&record) {
            Some(format) => writeln!(out, "{}: {}", path.display(), format.name())?,
            None => writeln!(out, "{}: not a tar archive", path.display())?,
        }
    }
    Ok(())
}
