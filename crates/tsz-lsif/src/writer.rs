//! JSON-lines output: one element per line.

use std::io::Write;

use crate::error::Result;
use crate::protocol::Element;

pub fn write_json_lines<W: Write>(elements: &[Element], mut out: W) -> Result<()> {
    for element in elements {
        serde_json::to_writer(&mut out, element)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

pub fn to_json_lines(elements: &[Element]) -> Result<String> {
    let mut buffer = Vec::new();
    write_json_lines(elements, &mut buffer)?;
    // serde_json only produces UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
