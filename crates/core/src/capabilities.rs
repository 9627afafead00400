//! Native capability detection, resolved once at startup

use std::fmt;

/// A native picker the bridge may drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DirectoryPicker,
    FilePicker,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DirectoryPicker => "Opening local folders",
            Self::FilePicker => "Opening local files",
        };
        write!(f, "{s}")
    }
}

/// Which native pickers exist in this page
///
/// Built once by the platform layer and passed around by value; nothing else
/// probes for the APIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub directory_picker: bool,
    pub file_picker: bool,
}

impl Capabilities {
    pub const fn none() -> Self {
        Self {
            directory_picker: false,
            file_picker: false,
        }
    }

    pub const fn all() -> Self {
        Self {
            directory_picker: true,
            file_picker: true,
        }
    }

    pub const fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::DirectoryPicker => self.directory_picker,
            Capability::FilePicker => self.file_picker,
        }
    }

    pub const fn any(&self) -> bool {
        self.directory_picker || self.file_picker
    }
}
