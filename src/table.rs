//! Table discrimination from PDF text-block geometry.
//!
//! A page is taken to contain a table when enough of its text blocks line up in at
//! least two columns. Only one table rectangle is produced per page, spanning every
//! block, so two separate tables on one page become a single exclusion area.

use tracing::debug;

use crate::core::config::OutlineConfig;
use crate::core::geometry::BBox;
use crate::core::model::TextBlockGeometry;

#[derive(Debug, Clone)]
pub struct TableDetector {
    alignment_tolerance: f32,
    min_blocks: usize,
    scale: f32,
}

impl TableDetector {
    pub fn new(alignment_tolerance: f32, min_blocks: usize, scale: f32) -> Self {
        Self {
            alignment_tolerance,
            min_blocks,
            scale,
        }
    }

    pub fn from_config(config: &OutlineConfig) -> Self {
        Self::new(
            config.alignment_tolerance,
            config.table_min_blocks,
            config.pixel_scale(),
        )
    }

    /// Groups blocks into columns keyed by the left edge of each column's first block.
    pub fn columns<'a>(&self, blocks: &'a [TextBlockGeometry]) -> Vec<Vec<&'a TextBlockGeometry>> {
        let mut columns: Vec<Vec<&TextBlockGeometry>> = Vec::new();
        for block in blocks {
            let column = columns
                .iter_mut()
                .find(|col| (col[0].x0 - block.x0).abs() < self.alignment_tolerance);
            match column {
                Some(col) => col.push(block),
                None => columns.push(vec![block]),
            }
        }
        columns
    }

    /// Table rectangle in image pixels, if the page's blocks look tabular.
    pub fn detect(&self, blocks: &[TextBlockGeometry]) -> Option<BBox> {
        if blocks.len() < self.min_blocks {
            return None;
        }

        let aligned_columns = self
            .columns(blocks)
            .iter()
            .filter(|col| col.len() >= 2)
            .count();
        if aligned_columns < 2 {
            return None;
        }

        let extent = blocks[1..]
            .iter()
            .fold(blocks[0], |acc, block| acc.union(block));
        let table = extent.scale(self.scale, self.scale);
        debug!(
            blocks = blocks.len(),
            aligned_columns,
            ?table,
            "page flagged as containing a table"
        );
        Some(table)
    }
}

/// True when more than `threshold` of `region`'s own area lies inside any table.
pub fn overlaps_table(region: &BBox, tables: &[BBox], threshold: f32) -> bool {
    tables
        .iter()
        .any(|table| region.overlap_ratio(table) > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detector() -> TableDetector {
        TableDetector::new(10.0, 6, 1.0)
    }

    #[test]
    fn two_aligned_columns_form_a_table() {
        let mut blocks = Vec::new();
        for row in 0..4 {
            let y = 100.0 + row as f32 * 20.0;
            blocks.push(BBox::new(50.0, y, 120.0, y + 12.0));
            blocks.push(BBox::new(300.0 + row as f32, y, 380.0, y + 12.0));
        }
        let table = detector().detect(&blocks);
        assert_eq!(table, Some(BBox::new(50.0, 100.0, 380.0, 172.0)));
    }

    #[test]
    fn five_unaligned_blocks_are_not_a_table() {
        let blocks: Vec<BBox> = (0..5)
            .map(|i| {
                let x = 40.0 + i as f32 * 60.0;
                BBox::new(x, 10.0 * i as f32, x + 30.0, 10.0 * i as f32 + 8.0)
            })
            .collect();
        assert_eq!(detector().detect(&blocks), None);
    }

    #[test]
    fn single_column_is_not_a_table() {
        let blocks: Vec<BBox> = (0..8)
            .map(|i| BBox::new(72.0, 20.0 * i as f32, 500.0, 20.0 * i as f32 + 14.0))
            .collect();
        assert_eq!(detector().detect(&blocks), None);
    }

    #[test]
    fn table_is_scaled_to_pixels() {
        let mut blocks = Vec::new();
        for row in 0..3 {
            let y = row as f32 * 10.0;
            blocks.push(BBox::new(0.0, y, 10.0, y + 5.0));
            blocks.push(BBox::new(36.0, y, 72.0, y + 5.0));
        }
        let table = TableDetector::new(10.0, 6, 2.0).detect(&blocks);
        assert_eq!(table, Some(BBox::new(0.0, 0.0, 144.0, 50.0)));
    }

    #[test]
    fn columns_compare_against_first_block() {
        let blocks = vec![
            BBox::new(100.0, 0.0, 110.0, 5.0),
            BBox::new(108.0, 10.0, 118.0, 15.0),
            BBox::new(116.0, 20.0, 126.0, 25.0),
        ];
        let columns = detector().columns(&blocks);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].len(), 2);
    }

    #[test]
    fn overlap_at_exactly_threshold_is_kept() {
        let region = BBox::new(0.0, 0.0, 100.0, 10.0);
        let table = BBox::new(70.0, 0.0, 200.0, 50.0);
        assert_eq!(region.overlap_ratio(&table), 0.3);
        assert!(!overlaps_table(&region, &[table], 0.3));
    }

    #[test]
    fn overlap_above_threshold_is_excluded() {
        let region = BBox::new(0.0, 0.0, 100.0, 10.0);
        let table = BBox::new(69.0, 0.0, 200.0, 50.0);
        assert!(overlaps_table(&region, &[table], 0.3));
    }

    #[test]
    fn no_tables_never_excludes() {
        assert!(!overlaps_table(&BBox::new(0.0, 0.0, 10.0, 10.0), &[], 0.3));
    }
}
