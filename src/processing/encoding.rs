use crate::data::{CellValue, Dataset};

/// The selected X and Y columns projected out of every row.
///
/// Both vectors have one slot per dataset row. A row missing the column
/// yields `None`; nothing is filtered or coerced here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedSeries {
    pub labels: Vec<Option<CellValue>>,
    pub values: Vec<Option<CellValue>>,
}

impl EncodedSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric reading of every value; non-numeric and missing cells are `None`.
    pub fn numeric_values(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|v| v.as_ref().and_then(CellValue::as_number))
            .collect()
    }

    /// Display text of every label; missing labels render as an empty string.
    pub fn label_texts(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|l| l.as_ref().map(CellValue::display).unwrap_or_default())
            .collect()
    }
}

/// Map the dataset and the chosen axes to a renderable series.
///
/// Returns `None` when there is no dataset or either axis is unset.
pub fn encode(dataset: Option<&Dataset>, x: Option<&str>, y: Option<&str>) -> Option<EncodedSeries> {
    let (dataset, x, y) = (dataset?, x?, y?);

    let (labels, values) = dataset
        .rows()
        .iter()
        .map(|row| (row.get(x).cloned(), row.get(y).cloned()))
        .unzip();

    Some(EncodedSeries { labels, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RowRecord;

    fn dataset(rows: &[&[(&str, CellValue)]]) -> Dataset {
        Dataset::from_rows(
            rows.iter()
                .map(|pairs| {
                    let mut r = RowRecord::new();
                    for (k, v) in pairs.iter() {
                        r.insert(*k, v.clone());
                    }
                    r
                })
                .collect(),
        )
    }

    #[test]
    fn projects_columns_in_row_order() {
        let ds = dataset(&[
            &[("A", CellValue::Number(1.0)), ("B", CellValue::Number(10.0))],
            &[("A", CellValue::Number(2.0)), ("B", CellValue::Number(20.0))],
        ]);
        let s = encode(Some(&ds), Some("A"), Some("B")).unwrap();
        assert_eq!(s.labels, vec![Some(CellValue::Number(1.0)), Some(CellValue::Number(2.0))]);
        assert_eq!(s.numeric_values(), vec![Some(10.0), Some(20.0)]);
    }

    #[test]
    fn absent_inputs_yield_nothing() {
        let ds = dataset(&[&[("A", CellValue::Number(1.0))]]);
        assert!(encode(None, Some("A"), Some("A")).is_none());
        assert!(encode(Some(&ds), None, Some("A")).is_none());
        assert!(encode(Some(&ds), Some("A"), None).is_none());
    }

    #[test]
    fn missing_and_text_cells_pass_through() {
        let ds = dataset(&[
            &[("A", CellValue::Text("north".into())), ("B", CellValue::Text("n/a".into()))],
            &[("A", CellValue::Text("south".into()))],
        ]);
        let s = encode(Some(&ds), Some("A"), Some("B")).unwrap();
        assert_eq!(s.labels.len(), ds.len());
        assert_eq!(s.values.len(), ds.len());
        assert_eq!(s.values[0], Some(CellValue::Text("n/a".into())));
        assert_eq!(s.values[1], None);
        assert_eq!(s.numeric_values(), vec![None, None]);
        assert_eq!(s.label_texts(), vec!["north".to_string(), "south".to_string()]);
    }

    #[test]
    fn same_inputs_same_output() {
        let ds = dataset(&[&[("A", CellValue::Number(3.0)), ("B", CellValue::Bool(true))]]);
        let a = encode(Some(&ds), Some("A"), Some("B"));
        let b = encode(Some(&ds), Some("A"), Some("B"));
        assert_eq!(a, b);
    }
}
