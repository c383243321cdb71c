use ahash::AHashMap;
use ndarray::{Array2, ArrayView1, Axis, ShapeBuilder};

/// Named numeric series stored as a dense (rows, series) matrix in column-major order,
/// so each series is a contiguous slice.
/// Rows are graph nodes for node weights, or districts for aggregated tallies.
#[derive(Clone, Debug, Default)]
pub struct WeightMatrix {
    names: Vec<String>,
    series: AHashMap<String, usize>, // series name -> column
    values: Array2<f64>,             // (rows, series), column-major
}

impl WeightMatrix {
    /// Build from named columns. Every column must have `num_rows` entries.
    pub(crate) fn from_columns(num_rows: usize, columns: Vec<(String, Vec<f64>)>) -> Self {
        let mut values = Array2::<f64>::zeros((num_rows, columns.len()).f());
        let mut names = Vec::with_capacity(columns.len());
        let mut series = AHashMap::with_capacity(columns.len());

        for (j, (name, column)) in columns.into_iter().enumerate() {
            assert!(column.len() == num_rows, "series '{name}' has {} values, expected {num_rows}", column.len());
            values.column_mut(j).iter_mut().zip(column).for_each(|(cell, v)| *cell = v);
            series.insert(name.clone(), j);
            names.push(name);
        }

        Self { names, series, values }
    }

    /// Empty matrix with the same series as `self` and `num_rows` zeroed rows.
    pub(crate) fn zeros_like(&self, num_rows: usize) -> Self {
        Self {
            names: self.names.clone(),
            series: self.series.clone(),
            values: Array2::<f64>::zeros((num_rows, self.names.len()).f()),
        }
    }

    #[inline] pub fn num_rows(&self) -> usize { self.values.nrows() }

    /// Series names in column order.
    #[inline] pub fn series(&self) -> &[String] { &self.names }

    #[inline] pub fn contains(&self, series: &str) -> bool { self.series.contains_key(series) }

    /// Value of `series` at `row`, or None if the series is missing.
    #[inline]
    pub fn get(&self, series: &str, row: usize) -> Option<f64> {
        let &j = self.series.get(series)?;
        Some(self.values[(row, j)])
    }

    /// Column view of `series`, or None if the series is missing.
    #[inline]
    pub fn column(&self, series: &str) -> Option<ArrayView1<'_, f64>> {
        let &j = self.series.get(series)?;
        Some(self.values.column(j))
    }

    /// Contiguous values of `series`, or None if the series is missing.
    #[inline]
    pub fn column_slice(&self, series: &str) -> Option<&[f64]> {
        let &j = self.series.get(series)?;
        self.values.column(j).to_slice()
    }

    /// Column sums for every series.
    pub fn totals(&self) -> Vec<f64> {
        self.values.sum_axis(Axis(0)).to_vec()
    }

    /// Zero one row.
    #[inline] pub(crate) fn clear_row(&mut self, row: usize) { self.values.row_mut(row).fill(0.0) }

    /// Add the sum of `other[rows]` into `self[row]`.
    pub(crate) fn add_rows_from(&mut self, row: usize, other: &WeightMatrix, rows: &[usize]) {
        let mut target = self.values.row_mut(row);
        for &r in rows { target.scaled_add(1.0, &other.values.row(r)) }
    }
}
