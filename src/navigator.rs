use std::collections::BTreeSet;

use tracing::info;

pub trait SectionNavigator: Send {
    /// Scrolls the section into view. Returns false when the view has no such section.
    fn scroll_into_view(&mut self, section: &str) -> bool;
}

/// Navigator over a fixed set of section ids that logs each scroll.
#[derive(Debug, Default, Clone)]
pub struct LoggingNavigator {
    sections: BTreeSet<String>,
}

impl LoggingNavigator {
    pub fn new<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sections: sections.into_iter().map(Into::into).collect(),
        }
    }
}

impl SectionNavigator for LoggingNavigator {
    fn scroll_into_view(&mut self, section: &str) -> bool {
        if !self.sections.contains(section) {
            return false;
        }
        info!(section, "scrolling section into view");
        true
    }
}
