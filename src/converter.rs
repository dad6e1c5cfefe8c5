use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use text_encoding::{convert, Encoding};
use tracing::{debug, info, warn};

use crate::files::{load_file_bytes, save_bytes_to_file};

/// Encodings in the order they're reported.
const REPORT_ORDER: [Encoding; 6] = [
    Encoding::Utf8Bom,
    Encoding::Utf16LE,
    Encoding::Utf16BE,
    Encoding::Utf32LE,
    Encoding::Utf32BE,
    Encoding::Unknown,
];

#[derive(Debug, Copy, Clone, Default)]
pub struct Options {
    /// Convert but never write anything back.
    pub dry_run: bool,
    /// Leave files alone if converting them would drop or mangle data.
    pub strict: bool,
}

/// What happened to a single file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Rewritten as utf8 (or would have been, in a dry run).
    Converted(Encoding),
    /// The utf8 output is identical to the file's contents.
    Unchanged,
    /// Left alone because the conversion was lossy and we're strict.
    SkippedLossy(Encoding),
}

/// Reads the file at `path`, converts it to utf8, and writes it back in
/// place according to `options`.
pub fn convert_file(path: &Path, options: &Options) -> Result<Outcome> {
    let data = load_file_bytes(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let conversion = convert(&data);
    debug!("{}: {}", path.display(), conversion.encoding);

    for warning in conversion.warnings.iter() {
        if warning.is_lossy() {
            warn!(offset = warning.offset(), "{}: {}", path.display(), warning);
        } else {
            info!(offset = warning.offset(), "{}: {}, copied as-is", path.display(), warning);
        }
    }

    if conversion.output == data {
        return Ok(Outcome::Unchanged);
    }

    if options.strict && !conversion.is_lossless() {
        warn!(
            "{}: not rewritten, conversion from {} is lossy",
            path.display(),
            conversion.encoding
        );
        return Ok(Outcome::SkippedLossy(conversion.encoding));
    }

    if !options.dry_run {
        save_bytes_to_file(&conversion.output, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(Outcome::Converted(conversion.encoding))
}

/// Running totals over a whole run.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Nothing was written, so conversions are reported as "would convert".
    pub dry_run: bool,
    pub converted: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    by_encoding: HashMap<Encoding, usize>,
}

impl Stats {
    pub fn new(options: &Options) -> Stats {
        Stats {
            dry_run: options.dry_run,
            ..Stats::default()
        }
    }

    /// False if any file failed to convert.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Converted(encoding) => {
                self.converted += 1;
                *self.by_encoding.entry(encoding).or_insert(0) += 1;
            }
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::SkippedLossy(_) => self.skipped += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Number of files converted from `encoding`.
    pub fn converted_from(&self, encoding: Encoding) -> usize {
        self.by_encoding.get(&encoding).copied().unwrap_or(0)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "=== Statistics ===")?;
        if self.dry_run {
            writeln!(f, "Would convert:     {}", self.converted)?;
        } else {
            writeln!(f, "Converted:         {}", self.converted)?;
        }
        for &encoding in REPORT_ORDER.iter() {
            let n = self.converted_from(encoding);
            if n > 0 {
                writeln!(f, "  {:<16} {}", format!("{}:", encoding), n)?;
            }
        }
        writeln!(f, "Unchanged:         {}", self.unchanged)?;
        writeln!(f, "Skipped (lossy):   {}", self.skipped)?;
        write!(f, "Failed:            {}", self.failed)
    }
}
