use std::io::{self, Read, Write};

use cmdtree_shell::lexer::tokenize;
use cmdtree_shell::serialize::serialize_groups;

fn main() -> io::Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let line = input.trim_end_matches(['\r', '\n']);
    let json = serialize_groups(&tokenize(line)).map_err(io::Error::other)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(json.as_bytes())?;
    stdout.write_all(b"\n")
}
