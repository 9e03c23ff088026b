use std::path::Path;

use crate::adapters::Source;
use crate::error::Result;
use crate::models::RawRow;

/// Read a provider CSV export into staged rows. Each provider buries its
/// header under a different number of preamble lines; everything above the
/// header is dropped, everything below becomes a column-name -> text map.
/// Exports are expected in UTF-8 (a BOM on the header is tolerated).
pub fn stage_file(file_path: &Path, source: Source) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let Ok(record) = result else { continue };
        if idx < source.preamble_lines() {
            continue;
        }
        if idx == source.preamble_lines() {
            headers = Some(
                record
                    .iter()
                    .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
                    .collect(),
            );
            continue;
        }
        let Some(headers) = headers.as_ref() else { continue };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.trim().to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
