//! The six required file roles
//!
//! A role is one cell of a 2×3 grid: recording condition (eyes open / eyes
//! closed) by BrainVision file part (header / marker / data).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recording condition, distinguished by a filename substring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    /// Resting state, eyes open (`restEO`)
    EyesOpen,
    /// Resting state, eyes closed (`restEC`)
    EyesClosed,
}

impl Condition {
    pub const ALL: [Condition; 2] = [Condition::EyesOpen, Condition::EyesClosed];

    /// Substring a file name must contain to belong to this condition
    pub fn marker(&self) -> &'static str {
        match self {
            Condition::EyesOpen => "restEO",
            Condition::EyesClosed => "restEC",
        }
    }
}

/// BrainVision file part, determined by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilePart {
    /// `.vhdr` header
    Header,
    /// `.vmrk` marker file
    Marker,
    /// `.eeg` binary data
    Data,
}

impl FilePart {
    pub const ALL: [FilePart; 3] = [FilePart::Header, FilePart::Marker, FilePart::Data];

    pub fn extension(&self) -> &'static str {
        match self {
            FilePart::Header => ".vhdr",
            FilePart::Marker => ".vmrk",
            FilePart::Data => ".eeg",
        }
    }
}

/// One of the six required upload slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Role {
    pub part: FilePart,
    pub condition: Condition,
}

impl Role {
    /// All roles in wire order: `vhdrEO, vmrkEO, eegEO, vhdrEC, vmrkEC, eegEC`
    pub const ALL: [Role; 6] = [
        Role::new(FilePart::Header, Condition::EyesOpen),
        Role::new(FilePart::Marker, Condition::EyesOpen),
        Role::new(FilePart::Data, Condition::EyesOpen),
        Role::new(FilePart::Header, Condition::EyesClosed),
        Role::new(FilePart::Marker, Condition::EyesClosed),
        Role::new(FilePart::Data, Condition::EyesClosed),
    ];

    pub const fn new(part: FilePart, condition: Condition) -> Self {
        Self { part, condition }
    }

    /// Position of this role in `Role::ALL`
    pub fn index(&self) -> usize {
        let row = match self.condition {
            Condition::EyesOpen => 0,
            Condition::EyesClosed => 3,
        };
        let col = match self.part {
            FilePart::Header => 0,
            FilePart::Marker => 1,
            FilePart::Data => 2,
        };
        row + col
    }

    /// Multipart field name and query parameter key, e.g. `vhdrEO`
    pub fn key(&self) -> &'static str {
        match (self.part, self.condition) {
            (FilePart::Header, Condition::EyesOpen) => "vhdrEO",
            (FilePart::Marker, Condition::EyesOpen) => "vmrkEO",
            (FilePart::Data, Condition::EyesOpen) => "eegEO",
            (FilePart::Header, Condition::EyesClosed) => "vhdrEC",
            (FilePart::Marker, Condition::EyesClosed) => "vmrkEC",
            (FilePart::Data, Condition::EyesClosed) => "eegEC",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
