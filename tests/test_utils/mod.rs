//! Helpers shared by the integration tests.

use std::io::{BufRead, BufReader, Read};

/// Read lines until `done` matches one, the peer closes, or a read times out.
///
/// Returns every complete line read, without trailing newlines.
pub fn read_lines_until<R: Read>(
    reader: &mut BufReader<R>,
    mut done: impl FnMut(&str) -> bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return lines,
            Ok(_) => {
                let line = line.trim_end_matches('\n').to_owned();
                let finished = done(&line);
                lines.push(line);
                if finished {
                    return lines;
                }
            }
        }
    }
}
