//! Haplotype matrix parsing (`.hap[s][.gz]`).
use std::io::{BufRead, Lines};

use anyhow::{bail, Context, Result};

/// Metadata fields preceding the genotype columns on each matrix row:
/// chromosome, marker id, bp position, allele 0, allele 1.
const META_FIELDS: usize = 5;

/// Iterator over the per-site allele rows of a haplotype matrix file. Each
/// item is the length-N allele vector of one site, in haplotype order;
/// blank lines are skipped.
pub struct SiteRows<R: BufRead> {
    lines: Lines<R>,
    num_haps: usize,
    line_no: usize,
}

pub fn site_rows<R: BufRead>(reader: R, num_haps: usize) -> SiteRows<R> {
    SiteRows {
        lines: reader.lines(),
        num_haps,
        line_no: 0,
    }
}

impl<R: BufRead> SiteRows<R> {
    fn parse_row(&self, line: &str) -> Result<Vec<bool>> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let expected = META_FIELDS + self.num_haps;
        if fields.len() != expected {
            bail!(
                "Expected {expected} columns on line {}, found {}",
                self.line_no,
                fields.len()
            );
        }

        fields[META_FIELDS..]
            .iter()
            .map(|&allele| match allele {
                "0" => Ok(false),
                "1" => Ok(true),
                other => bail!(
                    "Allele on line {} must be '0' or '1', found '{other}'",
                    self.line_no
                ),
            })
            .collect()
    }
}

impl<R: BufRead> Iterator for SiteRows<R> {
    type Item = Result<Vec<bool>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e).context("Could not read haplotype matrix line")),
            };
            self.line_no += 1;
            if line.split_whitespace().next().is_none() {
                continue;
            }
            return Some(self.parse_row(&line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alleles_follow_the_metadata_fields() {
        let matrix = "1 snp1 1000 A C 1 0 1\n1 snp2 2000 G T 0 0 1\n";
        let rows: Vec<Vec<bool>> = site_rows(matrix.as_bytes(), 3)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![vec![true, false, true], vec![false, false, true]]
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let matrix = "\n1 snp1 1000 A C 1 0\n\n";
        let rows: Vec<Vec<bool>> = site_rows(matrix.as_bytes(), 2)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn rejects_rows_with_the_wrong_width() {
        let matrix = "1 snp1 1000 A C 1 0 1\n";
        let result: Result<Vec<Vec<bool>>> = site_rows(matrix.as_bytes(), 2).collect();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_binary_alleles() {
        let matrix = "1 snp1 1000 A C 1 2\n";
        let result: Result<Vec<Vec<bool>>> = site_rows(matrix.as_bytes(), 2).collect();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("'0' or '1'"));
    }
}
