use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result, anyhow, bail};
use csv::{ReaderBuilder, Trim};
use kmeans::Dataset;

use crate::validate::parse_integral;

/// Read one header-less delimited table: first column identifier, remaining
/// columns coordinates.
///
/// ```text
/// 1.0,0.53,-1.2
/// 2.0,1.07,0.4
/// ```
pub fn load_table(path: &Path, delimiter: u8) -> Result<BTreeMap<usize, Vec<f64>>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut table: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("{}: reading line {}", path.display(), line + 1))?;
        let mut fields = record.iter();

        let id_text = fields.next().unwrap_or_default();
        let id = parse_integral(id_text)
            .and_then(|id| usize::try_from(id).ok())
            .ok_or_else(|| anyhow!("{}: line {}: bad identifier {:?}", path.display(), line + 1, id_text))?;

        let coords = fields
            .map(|field| field.parse::<f64>()
                .with_context(|| format!("{}: line {}: bad coordinate {:?}", path.display(), line + 1, field)))
            .collect::<Result<Vec<f64>>>()?;

        if table.insert(id, coords).is_some() {
            bail!("{}: identifier {} appears twice", path.display(), id);
        }
    }
    Ok(table)
}

/// Inner join on the identifier: coordinates of `left` followed by those of
/// `right`, ascending identifier order. Rows present in only one table are dropped.
pub fn join_tables(
    left: &BTreeMap<usize, Vec<f64>>,
    right: &BTreeMap<usize, Vec<f64>>,
) -> Vec<(usize, Vec<f64>)> {
    left.iter()
        .filter_map(|(id, l)| right.get(id).map(|r| {
            let mut row = l.clone();
            row.extend_from_slice(r);
            (*id, row)
        }))
        .collect()
}

pub fn load_datapoints(path_1: &Path, path_2: &Path, delimiter: u8) -> Result<Dataset> {
    let left = load_table(path_1, delimiter)?;
    let right = load_table(path_2, delimiter)?;
    let rows = join_tables(&left, &right);
    log::info!("{:<32}{} x {} -> {}", "joined tables", left.len(), right.len(), rows.len());

    Dataset::new(rows).context("building dataset from joined tables")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn joins_on_identifier_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&first, "3.0,30.0\n1.0,10.0\n2.0,20.0\n7.0,70.0\n").unwrap();
        fs::write(&second, "2,0.2,0.25\n1,0.1,0.15\n3,0.3,0.35\n9,0.9,0.95\n").unwrap();

        let data = load_datapoints(&first, &second, b',').unwrap();
        assert_eq!(data.ids(), vec![1, 2, 3]);
        assert_eq!(data.dim(), 3);
        assert_eq!(data.get(2), Some(&vec![20.0, 0.2, 0.25]));
    }

    #[test]
    fn honours_delimiter_and_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.txt");
        fs::write(&path, "5; 1.5 ;2\n6;3;4\n").unwrap();

        let table = load_table(&path, b';').unwrap();
        assert_eq!(table.get(&5), Some(&vec![1.5, 2.0]));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn rejects_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("dup.txt");
        fs::write(&path, "1,0.0\n1,1.0\n").unwrap();
        assert!(load_table(&path, b',').is_err());

        let path = dir.path().join("id.txt");
        fs::write(&path, "1.5,0.0\n").unwrap();
        assert!(load_table(&path, b',').is_err());

        let path = dir.path().join("coord.txt");
        fs::write(&path, "1,zero\n").unwrap();
        assert!(load_table(&path, b',').is_err());

        assert!(load_table(&dir.path().join("missing.txt"), b',').is_err());
    }

    #[test]
    fn too_few_joined_rows_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&first, "1,0.0\n2,1.0\n").unwrap();
        fs::write(&second, "2,5.0\n3,6.0\n").unwrap();

        let err = load_datapoints(&first, &second, b',').unwrap_err();
        assert!(err.chain().any(|c| c.downcast_ref::<kmeans::KmeansError>()
            == Some(&kmeans::KmeansError::NotEnoughPoints(1))));
    }
}
