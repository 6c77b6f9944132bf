use std::io::Write;
use tempfile::NamedTempFile;

pub const HEADER: &str = "command, payment, order, user, amount, method, reference";

/// Writes a command script with the standard header to a temporary file.
pub fn script(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}
