use std::io;

use clap::ValueEnum;
use idtranslate::core::Correspondence;

/// Width that [`Format::Python`] output tries to stay within.
const WIDTH: usize = 80;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// A list of tuples, laid out like Python's `pprint`.
    #[default]
    Python,
    /// A JSON array of `{"old": ..., "new": ...}` objects.
    Json,
    /// One tab-separated `old new` pair per line.
    Tsv,
}

pub fn write_correspondences(
    writer: &mut impl io::Write,
    pairs: &[Correspondence],
    format: Format,
) -> io::Result<()> {
    match format {
        Format::Python => writeln!(writer, "{}", pformat(pairs)),
        Format::Json => {
            serde_json::to_writer_pretty(&mut *writer, pairs)?;
            writeln!(writer)
        }
        Format::Tsv => {
            for Correspondence { old, new } in pairs {
                writeln!(writer, "{old}\t{new}")?;
            }
            Ok(())
        }
    }
}

/// Format the pairs on one line if that fits, and one pair per line otherwise.
fn pformat(pairs: &[Correspondence]) -> String {
    let tuples: Vec<_> = pairs
        .iter()
        .map(|Correspondence { old, new }| (py_repr(old), py_repr(new)))
        .collect();

    let flat = tuples
        .iter()
        .map(|(old, new)| format!("({old}, {new})"))
        .collect::<Vec<_>>()
        .join(", ");
    if flat.len() + 2 <= WIDTH {
        return format!("[{flat}]");
    }

    let lines: Vec<_> = tuples
        .iter()
        .map(|(old, new)| {
            // One column of indentation and the trailing comma or bracket.
            if old.len() + new.len() + 4 + 2 <= WIDTH {
                format!("({old}, {new})")
            } else {
                format!("({old},\n  {new})")
            }
        })
        .collect();
    format!("[{}]", lines.join(",\n "))
}

/// Quote a string the way Python's `repr` does for printable text.
fn py_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            ch if ch == quote => {
                out.push('\\');
                out.push(ch);
            }
            ch => out.push(ch),
        }
    }
    out.push(quote);
    out
}
