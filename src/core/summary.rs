//! Per-class summary of chaining output
//!
//! Counts how many records each class condensed into composites and how
//! often a composite joins parts with different repeat names (a discordant
//! composite).

use crate::core::Composite;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Counts for one repeat class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSummary {
    /// Parts merged into composites
    pub parts: usize,
    pub composites: usize,
    /// Composites whose parts have more than one repeat name
    pub discordant: usize,
}

impl ClassSummary {
    /// Mean parts per composite
    pub fn condensation(&self) -> f64 {
        self.parts as f64 / self.composites as f64
    }

    /// Fraction of composites that are discordant
    pub fn discord_freq(&self) -> f64 {
        self.discordant as f64 / self.composites as f64
    }
}

/// Whether a composite joins parts with different repeat names
pub fn is_discordant(composite: &Composite) -> bool {
    match composite.parts.split_first() {
        Some((first, rest)) => rest.iter().any(|p| p.name != first.name),
        None => false,
    }
}

/// Summary over a set of composites, classes in lexical order
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub classes: BTreeMap<String, ClassSummary>,
    pub composites: usize,
    pub parts: usize,
}

impl Summary {
    /// Count a composite, returning whether it is discordant
    pub fn add(&mut self, composite: &Composite) -> bool {
        let discordant = is_discordant(composite);
        let class = self.classes.entry(composite.class.clone()).or_default();
        class.composites += 1;
        class.parts += composite.parts.len();
        if discordant {
            class.discordant += 1;
        }
        self.composites += 1;
        self.parts += composite.parts.len();
        discordant
    }

    /// Write the per-class table followed by the totals line
    pub fn write_table<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        let width = self
            .classes
            .keys()
            .map(|c| c.len())
            .max()
            .unwrap_or(0)
            .max("class".len());

        writeln!(
            writer,
            "{:<width$} | parts merged | composites | condensation | discord count | discord freq",
            "class",
            width = width
        )?;
        for (name, class) in &self.classes {
            writeln!(
                writer,
                "{:<width$} | {:>12} | {:>10} | {:>12.2} | {:>13} | {:>12.3}",
                name,
                class.parts,
                class.composites,
                class.condensation(),
                class.discordant,
                class.discord_freq(),
                width = width
            )?;
        }
        writeln!(
            writer,
            "\ntotal composited: {} comprising: {}",
            self.composites, self.parts
        )
    }
}

impl<'a> FromIterator<&'a Composite> for Summary {
    fn from_iter<I: IntoIterator<Item = &'a Composite>>(iter: I) -> Self {
        let mut summary = Summary::default();
        for composite in iter {
            summary.add(composite);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Genomic, Part, Strand};

    fn composite(class: &str, names: &[&str]) -> Composite {
        Composite {
            class: class.to_string(),
            score: 1.0,
            parts: names
                .iter()
                .enumerate()
                .map(|(i, name)| Part {
                    name: name.to_string(),
                    consensus_left: None,
                    consensus_right: None,
                    genomic: Genomic::new("chr1", i as i64 * 10, i as i64 * 10 + 5, Strand::Plus),
                })
                .collect(),
        }
    }

    #[test]
    fn test_discordance() {
        assert!(!is_discordant(&composite("LINE/L1", &["L1PA2", "L1PA2"])));
        assert!(is_discordant(&composite("LINE/L1", &["L1PA2", "L1PA2", "L1PA3"])));
    }

    #[test]
    fn test_summary_counts() {
        let all = vec![
            composite("SINE/Alu", &["AluY", "AluY"]),
            composite("LINE/L1", &["L1PA2", "L1PA3", "L1PA3"]),
            composite("LINE/L1", &["L1PA2", "L1PA2", "L1PA2"]),
        ];
        let summary: Summary = all.iter().collect();

        assert_eq!(summary.composites, 3);
        assert_eq!(summary.parts, 8);
        let l1 = &summary.classes["LINE/L1"];
        assert_eq!(
            *l1,
            ClassSummary {
                parts: 6,
                composites: 2,
                discordant: 1
            }
        );
        assert_eq!(l1.condensation(), 3.0);
        assert_eq!(l1.discord_freq(), 0.5);
    }

    #[test]
    fn test_write_table() {
        let all = vec![composite("SINE/Alu", &["AluY", "AluSx"])];
        let summary: Summary = all.iter().collect();
        let mut out = Vec::new();
        summary.write_table(&mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("class    | parts merged"));
        assert_eq!(
            lines[1],
            "SINE/Alu |            2 |          1 |         2.00 |             1 |        1.000"
        );
        assert_eq!(lines[3], "total composited: 1 comprising: 2");
    }
}
