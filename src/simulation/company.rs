//! Company ownership queries needed by the station simulation

use std::collections::HashSet;

use super::types::CompanyId;

/// Which company the local player controls and which companies are human
#[derive(Debug, Clone)]
pub struct Companies {
    controlling: CompanyId,
    humans: HashSet<CompanyId>,
}

impl Default for Companies {
    fn default() -> Self {
        Self::new(CompanyId(0))
    }
}

impl Companies {
    /// The controlling company is always human
    pub fn new(controlling: CompanyId) -> Self {
        Self {
            controlling,
            humans: HashSet::from([controlling]),
        }
    }

    pub fn controlling(&self) -> CompanyId {
        self.controlling
    }

    pub fn add_human(&mut self, company: CompanyId) {
        self.humans.insert(company);
    }

    pub fn is_human(&self, company: CompanyId) -> bool {
        self.humans.contains(&company)
    }
}
