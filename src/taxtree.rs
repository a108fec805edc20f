//src/taxtree.rs

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use ahash::AHashMap;

use crate::error::AnnotError;
use crate::files::{create_writer, open_reader};

/// Taxonomic ranks a lineage can be cut at. A lineage at a rank has
/// `rank.depth()` dot-separated segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    pub fn depth(self) -> usize {
        match self {
            Rank::Kingdom => 1,
            Rank::Phylum => 2,
            Rank::Class => 3,
            Rank::Order => 4,
            Rank::Family => 5,
            Rank::Genus => 6,
            Rank::Species => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Rank::Kingdom => "kingdom",
            Rank::Phylum => "phylum",
            Rank::Class => "class",
            Rank::Order => "order",
            Rank::Family => "family",
            Rank::Genus => "genus",
            Rank::Species => "species",
        }
    }
}

impl FromStr for Rank {
    type Err = AnnotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // domain and kingdom share the top slot
            "domain" | "kingdom" => Ok(Rank::Kingdom),
            "phylum" => Ok(Rank::Phylum),
            "class" => Ok(Rank::Class),
            "order" => Ok(Rank::Order),
            "family" => Ok(Rank::Family),
            "genus" => Ok(Rank::Genus),
            "species" => Ok(Rank::Species),
            _ => Err(AnnotError::UnknownRank(s.to_string())),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered path of rank names, top rank first. Names are kept as read;
/// the dot-joined form written by `Display` swaps any `.` inside a name for
/// `_` so the depth survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lineage {
    ranks: Vec<String>,
}

impl Lineage {
    pub fn new<I, S>(ranks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ranks: ranks.into_iter().map(Into::into).collect(),
        }
    }

    pub fn depth(&self) -> usize {
        self.ranks.len()
    }

    pub fn ranks(&self) -> &[String] {
        &self.ranks
    }

    /// Name of the most specific rank, as read.
    pub fn name(&self) -> &str {
        self.ranks.last().map(String::as_str).unwrap_or("")
    }

    /// The ancestor of this lineage at `depth` (or the lineage itself if shallower).
    pub fn truncate(&self, depth: usize) -> Lineage {
        Lineage {
            ranks: self.ranks[..depth.min(self.ranks.len())].to_vec(),
        }
    }
}

impl fmt::Display for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rank) in self.ranks.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&rank.replace('.', "_"))?;
        }
        Ok(())
    }
}

/// Last dot-separated segment of a lineage string.
pub fn terminal_name(lineage: &str) -> &str {
    lineage.rsplit('.').next().unwrap_or(lineage)
}

/// Parses one lineage line.
///
/// Tab-separated lines are read column by column and may carry `.` inside a
/// name (`Lactobacillus sp.`). Anything else is
/// split on `.` (and `;`), collapsing runs of separators. Unfilled trailing
/// ranks are dropped. Returns `None` for blank lines and for tab-separated
/// lines with a gap before a filled rank.
pub fn parse_lineage_line(line: &str) -> Option<Lineage> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    let ranks: Vec<String> = if line.contains('\t') {
        let mut cols: Vec<&str> = line
            .split('\t')
            .map(|c| c.trim().trim_matches('"').trim())
            .collect();
        while cols.last().map(|c| c.is_empty()).unwrap_or(false) {
            cols.pop();
        }
        if cols.is_empty() || cols.iter().any(|c| c.is_empty()) {
            return None;
        }
        cols.into_iter().map(String::from).collect()
    } else {
        line.trim()
            .trim_matches('"')
            .split(['.', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    };

    if ranks.is_empty() {
        None
    } else {
        Some(Lineage::new(ranks))
    }
}

/// Reads a lineage file, optionally skipping its first (header) line.
pub fn read_lineages<P: AsRef<Path>>(path: P, has_header: bool) -> Result<Vec<Lineage>, AnnotError> {
    let reader = open_reader(path)?;
    parse_lineages(reader, has_header)
}

pub fn parse_lineages<R: BufRead>(reader: R, has_header: bool) -> Result<Vec<Lineage>, AnnotError> {
    let mut lineages = Vec::new();
    let mut skipped = 0usize;

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if idx == 0 && has_header {
            continue;
        }
        match parse_lineage_line(&line) {
            Some(lineage) => lineages.push(lineage),
            None => {
                if !line.trim().is_empty() {
                    log::debug!("skipping malformed lineage on line {}: {:?}", idx + 1, line);
                    skipped += 1;
                }
            }
        }
    }

    if skipped > 0 {
        log::warn!("skipped {} malformed lineage line(s)", skipped);
    }
    Ok(lineages)
}

/// A clade rooted at the chosen rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clade {
    /// Name of the clade's own rank, as read.
    pub name: String,
    /// Every lineage string at or below the clade rank, the clade itself included.
    pub members: BTreeSet<String>,
    /// Rank names of the members, as read.
    pub names: BTreeSet<String>,
    /// The full lineages, as read, that contributed to this clade.
    pub leaves: BTreeSet<String>,
}

/// Map from clade key (lineage truncated to the chosen rank) to its clade.
/// Keys are kept sorted, which fixes the colour order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CladeMap {
    rank: Rank,
    clades: BTreeMap<String, Clade>,
}

/// Groups lineages under their ancestor at `rank`.
///
/// Lineages shallower than `rank` are dropped. Every intermediate lineage
/// between the clade and the leaf is recorded as a member, so internal
/// nodes of the tree can be annotated as well.
pub fn build_clade_map(lineages: &[Lineage], rank: Rank) -> CladeMap {
    let depth = rank.depth();
    let mut clades: BTreeMap<String, Clade> = BTreeMap::new();
    let mut dropped = 0usize;

    for lineage in lineages {
        if lineage.depth() < depth {
            dropped += 1;
            continue;
        }
        let key = lineage.truncate(depth).to_string();
        let ranks = lineage.ranks();
        let clade = clades.entry(key).or_insert_with(|| Clade {
            name: ranks[depth - 1].clone(),
            ..Default::default()
        });
        for d in depth..=lineage.depth() {
            clade.members.insert(lineage.truncate(d).to_string());
            clade.names.insert(ranks[d - 1].clone());
        }
        clade.leaves.insert(lineage.to_string());
    }

    if dropped > 0 {
        log::debug!("{} lineage(s) shallower than {} dropped", dropped, rank);
    }
    log::info!("{} clades at rank {}", clades.len(), rank);

    CladeMap { rank, clades }
}

impl CladeMap {
    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn len(&self) -> usize {
        self.clades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clades.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Clade> {
        self.clades.get(key)
    }

    /// Clade keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.clades.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Clade)> {
        self.clades.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolves a taxon to a top-level clade key, by full key or by the
    /// clade's own name (as read or as written in the key).
    pub fn clade_key(&self, taxon: &str) -> Option<&str> {
        if let Some((key, _)) = self.clades.get_key_value(taxon) {
            return Some(key.as_str());
        }
        self.clades
            .iter()
            .find(|(key, clade)| clade.name == taxon || terminal_name(key) == taxon)
            .map(|(key, _)| key.as_str())
    }

    pub fn is_clade(&self, taxon: &str) -> bool {
        self.clade_key(taxon).is_some()
    }

    /// Keeps only the named clades. Names that match no clade are logged
    /// and ignored.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> CladeMap {
        let mut clades = BTreeMap::new();
        for name in names {
            let name = name.as_ref().trim();
            match self.clade_key(name) {
                Some(key) => {
                    if let Some(clade) = self.clades.get(key) {
                        clades.insert(key.to_string(), clade.clone());
                    }
                }
                None => log::warn!("clade {:?} not found at rank {}; skipping", name, self.rank),
            }
        }
        CladeMap {
            rank: self.rank,
            clades,
        }
    }

    /// Union of all clades and their members, each pointing back at its clade.
    pub fn keep_set(&self) -> TaxonIndex {
        let mut index = TaxonIndex::default();
        for (key, clade) in &self.clades {
            for member in &clade.members {
                index.insert(member, key);
            }
            for name in &clade.names {
                index.insert_name(name, key);
            }
        }
        index
    }

    /// Every retained full lineage, sorted.
    pub fn leaves(&self) -> BTreeSet<&str> {
        self.clades
            .values()
            .flat_map(|c| c.leaves.iter().map(String::as_str))
            .collect()
    }
}

/// Membership lookup over lineage strings that also accepts bare rank
/// names, since differential tables usually report a single rank name.
/// Every entry resolves to the key of the clade it falls under.
#[derive(Debug, Clone, Default)]
pub struct TaxonIndex {
    lineages: AHashMap<String, String>,
    /// name -> every clade key it occurs under
    names: AHashMap<String, BTreeSet<String>>,
}

impl TaxonIndex {
    pub fn insert(&mut self, lineage: &str, clade: &str) {
        self.lineages.insert(lineage.to_string(), clade.to_string());
        self.insert_name(terminal_name(lineage), clade);
    }

    pub fn insert_name(&mut self, name: &str, clade: &str) {
        self.names
            .entry(name.to_string())
            .or_default()
            .insert(clade.to_string());
    }

    pub fn contains(&self, taxon: &str) -> bool {
        self.clade_of(taxon).is_some()
    }

    /// Clade key for a lineage string or a name. A name found under several
    /// clades resolves to the first in key order.
    pub fn clade_of(&self, taxon: &str) -> Option<&str> {
        if let Some(key) = self.lineages.get(taxon) {
            return Some(key.as_str());
        }
        self.names
            .get(taxon)
            .and_then(|keys| keys.iter().next())
            .map(String::as_str)
    }

    /// True when `taxon` is only known by a name shared between clades.
    pub fn is_ambiguous(&self, taxon: &str) -> bool {
        !self.lineages.contains_key(taxon)
            && self.names.get(taxon).map(|keys| keys.len() > 1).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }
}

/// Renders the retained lineages, one per line.
pub fn input_tree_text(clades: &CladeMap) -> String {
    let mut text = String::new();
    for leaf in clades.leaves() {
        text.push_str(leaf);
        text.push('\n');
    }
    text
}

/// Writes the retained lineages to `path` (the tree GraPhlAn draws).
pub fn write_input_tree<P: AsRef<Path>>(path: P, clades: &CladeMap) -> Result<usize, AnnotError> {
    let mut writer = create_writer(path.as_ref())?;
    let leaves = clades.leaves();
    for leaf in &leaves {
        writeln!(writer, "{}", leaf)?;
    }
    writer.flush()?;
    log::info!("wrote {} lineages to {}", leaves.len(), path.as_ref().display());
    Ok(leaves.len())
}
