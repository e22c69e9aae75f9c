//! CSV storage for the harvested and mapped tables.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use tracing::warn;

use crate::error::{PipelineError, PipelineResult};
use crate::models::{HarvestRow, MappedRow};
use crate::utils::coerce_int;

/// Default harvested table filename inside the docs directory.
pub const HARVEST_FILENAME: &str = "cunli.csv";

/// Default mapped table filename inside the docs directory.
pub const MAPPED_FILENAME: &str = "taipower.csv";

/// Harvest table as read back by the reconciler.
#[derive(Debug, Clone, Default)]
pub struct HarvestTable {
    pub rows: Vec<HarvestRow>,
    /// Records with fewer than the seven expected columns.
    pub malformed: usize,
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

fn create_output(path: &Path) -> PipelineResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Serialize the harvested table, header first.
pub fn write_harvest<W: Write>(writer: W, rows: &[HarvestRow]) -> PipelineResult<()> {
    let mut wtr = csv_writer(writer);
    wtr.write_record(HarvestRow::HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Serialize the mapped table, header first.
pub fn write_mapped<W: Write>(writer: W, rows: &[MappedRow]) -> PipelineResult<()> {
    let mut wtr = csv_writer(writer);
    wtr.write_record(MappedRow::HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_harvest_file(path: &Path, rows: &[HarvestRow]) -> PipelineResult<()> {
    write_harvest(create_output(path)?, rows)
}

pub fn write_mapped_file(path: &Path, rows: &[MappedRow]) -> PipelineResult<()> {
    write_mapped(create_output(path)?, rows)
}

/// Read a harvested table. The header line is skipped, names are trimmed and
/// counters go through the same permissive coercion as the API decoder.
pub fn read_harvest<R: Read>(reader: R) -> PipelineResult<HarvestTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut table = HarvestTable::default();
    for (index, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                warn!("Skipping harvest record {}: {}", index + 1, e);
                table.malformed += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if record.len() < HarvestRow::HEADER.len() {
            warn!(
                "Skipping harvest record {} with {} columns",
                index + 1,
                record.len()
            );
            table.malformed += 1;
            continue;
        }

        table.rows.push(HarvestRow {
            county_name: record[0].trim().to_string(),
            town_name: record[1].trim().to_string(),
            cunli_name: record[2].trim().to_string(),
            c0: coerce_int(&record[3]),
            c1: coerce_int(&record[4]),
            fcid: record[5].to_string(),
            gid: record[6].to_string(),
        });
    }
    Ok(table)
}

/// Read a harvested table from disk. A missing file is a fatal input error.
pub fn read_harvest_file(path: &Path) -> PipelineResult<HarvestTable> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }
    read_harvest(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(cunli: &str, gid: &str) -> HarvestRow {
        HarvestRow {
            county_name: "嘉義縣".to_string(),
            town_name: "朴子市".to_string(),
            cunli_name: cunli.to_string(),
            c0: 3,
            c1: 0,
            fcid: "F1".to_string(),
            gid: gid.to_string(),
        }
    }

    #[test]
    fn test_harvest_csv_layout() {
        let mut buf = Vec::new();
        write_harvest(&mut buf, &[row("雙溪里", "G1"), row("a,b", "G2")]).unwrap();
        let expected = "\
county_name,town_name,cunli_name,c0,c1,fcid,gid
嘉義縣,朴子市,雙溪里,3,0,F1,G1
嘉義縣,朴子市,\"a,b\",3,0,F1,G2
";
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    #[test]
    fn test_empty_tables_still_have_headers() {
        let mut buf = Vec::new();
        write_mapped(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "VILLCODE,c0,c1\n");
    }

    #[test]
    fn test_read_harvest_skips_short_records() {
        let data = "\
county_name,town_name,cunli_name,c0,c1,fcid,gid
 嘉義縣 ,朴子市, 雙溪里,3,x,F1,G1
only,three,columns
";
        let table = read_harvest(data.as_bytes()).unwrap();
        assert_eq!(table.malformed, 1);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].county_name, "嘉義縣");
        assert_eq!(table.rows[0].cunli_name, "雙溪里");
        assert_eq!(table.rows[0].c1, 0);
    }

    #[test]
    fn test_read_harvest_skips_invalid_utf8_record() {
        let mut data = b"county_name,town_name,cunli_name,c0,c1,fcid,gid\n".to_vec();
        data.extend_from_slice(b"A,B,\xff\xfe,1,0,F1,G1\n");
        data.extend_from_slice(b"A,B,C,2,0,F2,G2\n");

        let table = read_harvest(data.as_slice()).unwrap();
        assert_eq!(table.malformed, 1);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cunli_name, "C");
        assert_eq!(table.rows[0].c0, 2);
    }

    #[test]
    fn test_file_round_trip_creates_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docs").join(HARVEST_FILENAME);
        write_harvest_file(&path, &[row("雙溪里", "G1")]).unwrap();
        let table = read_harvest_file(&path).unwrap();
        assert_eq!(table.rows, vec![row("雙溪里", "G1")]);
    }

    #[test]
    fn test_missing_harvest_file_is_fatal() {
        let dir = tempdir().unwrap();
        let err = read_harvest_file(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
    }
}
