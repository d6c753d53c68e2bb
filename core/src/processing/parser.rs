use crate::prelude::{ScanError, ScanResult};
use num_complex::Complex64;
use std::io::BufRead;

/// One raw raster row from a scan table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSample {
    pub x: f64,
    pub y: f64,
    pub transmission: Complex64,
    pub reference: Option<Complex64>,
}

/// Parse a comma-delimited scan table into raster rows.
///
/// Each row carries `x, y, re(trans), im(trans)` and optionally
/// `re(ref), im(ref)`. The reference columns are all-or-nothing across the
/// table. Blank lines are skipped; anything else that does not parse as the
/// declared numeric fields is a `MalformedInput` error carrying the line
/// number.
pub fn parse_table<R: BufRead>(reader: R) -> ScanResult<Vec<ScanSample>> {
    let mut samples = Vec::new();
    let mut has_reference: Option<bool> = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        let with_reference = match fields.len() {
            4 => false,
            6 => true,
            count => {
                return Err(ScanError::MalformedInput(format!(
                    "line {}: expected 4 or 6 numeric fields, got {}",
                    index + 1,
                    count
                )))
            }
        };

        match has_reference {
            None => has_reference = Some(with_reference),
            Some(expected) if expected != with_reference => {
                return Err(ScanError::MalformedInput(format!(
                    "line {}: inconsistent column count",
                    index + 1
                )))
            }
            _ => {}
        }

        let mut values = [0.0f64; 6];
        for (slot, field) in values.iter_mut().zip(fields.iter()) {
            *slot = field.parse().map_err(|_| {
                ScanError::MalformedInput(format!(
                    "line {}: invalid numeric field {:?}",
                    index + 1,
                    field
                ))
            })?;
        }

        samples.push(ScanSample {
            x: values[0],
            y: values[1],
            transmission: Complex64::new(values[2], values[3]),
            reference: with_reference.then(|| Complex64::new(values[4], values[5])),
        });
    }

    if samples.is_empty() {
        return Err(ScanError::MalformedInput("empty scan table".into()));
    }
    Ok(samples)
}
