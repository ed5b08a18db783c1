//! Metadata tokens for rows produced across emit generations.
//!
//! A token pairs a table identifier with a 1-based row index, exactly as the
//! table-based binary metadata format encodes references between rows. The
//! delta layer uses tokens as the stable identity of everything that has
//! already been emitted: the ledgers on [`crate::enc::EmitBaseline`] hand a
//! token back for every definition any generation has assigned a row.
//!
//! # Key Components
//!
//! - [`Token`] - 32-bit packed (table, row) handle
//! - [`TableId`] - the closed set of definition tables the delta ledgers track

use std::fmt;

use strum::{EnumCount, EnumIter};

/// Identifies a definition table tracked across delta generations.
///
/// Only the tables whose rows can be *added* by an Edit-and-Continue
/// generation appear here; reference tables are re-derived per generation and
/// need no ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
#[repr(u8)]
pub enum TableId {
    /// TypeDef table (0x02)
    TypeDef = 0x02,
    /// Field table (0x04)
    Field = 0x04,
    /// MethodDef table (0x06)
    MethodDef = 0x06,
    /// EventMap table (0x12)
    EventMap = 0x12,
    /// Event table (0x14)
    Event = 0x14,
    /// PropertyMap table (0x15)
    PropertyMap = 0x15,
    /// Property table (0x17)
    Property = 0x17,
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableId::TypeDef => write!(f, "TypeDef"),
            TableId::Field => write!(f, "Field"),
            TableId::MethodDef => write!(f, "MethodDef"),
            TableId::EventMap => write!(f, "EventMap"),
            TableId::Event => write!(f, "Event"),
            TableId::PropertyMap => write!(f, "PropertyMap"),
            TableId::Property => write!(f, "Property"),
        }
    }
}

/// A metadata token representing one row in a metadata table.
///
/// Tokens consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table
/// - The low 24 bits (bits 0-23) indicate the 1-based row index
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table id and a 1-based row index
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the raw table byte from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
