use shared::domain::{GroupId, StationId, StationKey};

/// The fixed set of (group, station) pairs the board can display.
///
/// Declaration order is display order: groups appear in the order they were
/// first declared, stations in the order they were listed within their
/// group. The catalog never changes at runtime.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    entries: Vec<StationKey>,
}

impl StationCatalog {
    /// Builds a catalog from `(group, stations)` pairs. Duplicate keys are
    /// ignored; the first declaration wins. Stations declared for an
    /// already-seen group are folded into that group's block so cells stay
    /// grouped by group declaration order.
    pub fn from_groups<G, S>(groups: impl IntoIterator<Item = (G, Vec<S>)>) -> Self
    where
        G: Into<String>,
        S: Into<String>,
    {
        let mut blocks: Vec<(GroupId, Vec<StationKey>)> = Vec::new();
        for (group, stations) in groups {
            let group = GroupId::new(group);
            let slot = match blocks.iter().position(|(g, _)| *g == group) {
                Some(slot) => slot,
                None => {
                    blocks.push((group.clone(), Vec::new()));
                    blocks.len() - 1
                }
            };
            let block = &mut blocks[slot].1;
            for station in stations {
                let key = StationKey {
                    group: group.clone(),
                    station: StationId::new(station),
                };
                if !block.contains(&key) {
                    block.push(key);
                }
            }
        }
        Self {
            entries: blocks.into_iter().flat_map(|(_, block)| block).collect(),
        }
    }

    pub fn entries(&self) -> &[StationKey] {
        &self.entries
    }

    pub fn contains(&self, key: &StationKey) -> bool {
        self.entries.contains(key)
    }

    /// Group ids in declaration order, without duplicates.
    pub fn groups(&self) -> Vec<&GroupId> {
        let mut groups: Vec<&GroupId> = Vec::new();
        for entry in &self.entries {
            if !groups.contains(&&entry.group) {
                groups.push(&entry.group);
            }
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
