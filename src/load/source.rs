use std::fmt;

/// The data files a report directory may contain.
///
/// Each file assigns one JSON array to a script global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataFile {
    Nodes,
    Groups,
    LogMessages,
    PrerenderedSubnets,
}

impl DataFile {
    pub const ALL: [DataFile; 4] = [
        DataFile::Nodes,
        DataFile::Groups,
        DataFile::LogMessages,
        DataFile::PrerenderedSubnets,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            DataFile::Nodes => "nodes.js",
            DataFile::Groups => "groups.js",
            DataFile::LogMessages => "report.js",
            DataFile::PrerenderedSubnets => "prerenderedSubnets.js",
        }
    }

    pub fn global_name(self) -> &'static str {
        match self {
            DataFile::Nodes => "hierarchyNodeData",
            DataFile::Groups => "hierarchyGroupData",
            DataFile::LogMessages => "logMessages",
            DataFile::PrerenderedSubnets => "prerenderedSubnets",
        }
    }
}

impl fmt::Display for DataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
